mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use hostkit::Error as HostError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(host_error) = e.downcast_ref::<HostError>() {
            eprintln!("Error: {}", host_error);
            if let Some(suggestion) = host_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let out = output::CliOutput;
    match &cli.command {
        Commands::Version(cmd) => commands::run_version(cmd, &out),
        Commands::Plan(cmd) => commands::run_plan(cmd, &out),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
