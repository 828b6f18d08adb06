use crate::cli::PlanCommands;
use crate::output::UserOutput;
use hostkit::Parser as PlanParser;
use std::path::PathBuf;

pub fn run_plan(cmd: &PlanCommands, out: &dyn UserOutput) -> anyhow::Result<()> {
    match cmd {
        PlanCommands::Check { plan } => run_plan_check(plan.clone(), out),
    }
}

fn run_plan_check(plan_path: Option<PathBuf>, out: &dyn UserOutput) -> anyhow::Result<()> {
    let parser = PlanParser::new();
    let plan_path = if let Some(path) = plan_path {
        path
    } else {
        match parser.find_plan_file() {
            Ok(path) => path,
            Err(_) => {
                out.error("Error: No seeding plan found");
                out.status("\nSearched for seeding.yaml in:");
                out.status(&format!(
                    "  - Current directory: {}",
                    std::env::current_dir()?.display()
                ));
                out.status("  - Parent directories up to root");
                return Err(anyhow::anyhow!("Seeding plan not found"));
            }
        }
    };

    out.status(&format!("Validating {}...", plan_path.display()));

    let plan = match parser.load_plan(&plan_path) {
        Ok(plan) => plan,
        Err(e) => {
            out.error("Seeding plan failed to load");
            return Err(e.into());
        }
    };

    plan.validate()?;

    out.success("Seeding plan is valid");
    out.blank();

    out.status(&format!(
        "Groups: {} ({} seeders)",
        plan.groups.len(),
        plan.seeder_count()
    ));
    for (step, group) in plan.groups.iter().enumerate() {
        if group.is_empty() {
            out.status(&format!("  {}: (empty, skipped)", step));
        } else {
            out.status(&format!("  {}: {}", step, group.join(", ")));
        }
    }
    out.status(&format!("Remainders: {}", plan.remainders));

    if plan.seeder_count() == 0 && plan.remainders == hostkit::RemainderMode::None {
        out.blank();
        out.warning("Plan registers no seeders; a run would do nothing");
    }

    Ok(())
}
