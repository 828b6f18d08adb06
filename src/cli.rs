use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostkit")]
#[command(about = "hostkit - Seeding plan and semantic version tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse, compare and bump semantic versions
    #[command(subcommand)]
    Version(VersionCommands),
    /// Inspect seeding plans
    #[command(subcommand)]
    Plan(PlanCommands),
}

#[derive(Subcommand)]
pub enum VersionCommands {
    /// Print the components of a version
    Parse {
        /// Version to parse, e.g. 1.2.3-beta
        version: String,
    },
    /// Print <, = or > for two versions
    Compare { left: String, right: String },
    /// Print the next version
    Bump {
        version: String,

        /// Which part to increment; lower parts reset to zero
        #[arg(long, value_enum, default_value_t = VersionPart::Patch)]
        part: VersionPart,

        /// Addendum to attach to the bumped version
        #[arg(long)]
        addendum: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Load and validate a seeding plan, then print its layout
    Check {
        /// Plan file path (defaults to seeding.yaml, searched upwards)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_defaults_to_patch() {
        let cli = Cli::try_parse_from(["hostkit", "version", "bump", "1.2.3"]).unwrap();
        match cli.command {
            Commands::Version(VersionCommands::Bump { part, addendum, .. }) => {
                assert_eq!(part, VersionPart::Patch);
                assert!(addendum.is_none());
            }
            _ => panic!("expected version bump"),
        }
    }

    #[test]
    fn test_plan_check_accepts_path() {
        let cli = Cli::try_parse_from(["hostkit", "plan", "check", "--plan", "x.yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Plan(PlanCommands::Check { plan: Some(ref p) }) if p == &PathBuf::from("x.yaml")
        ));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
