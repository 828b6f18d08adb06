use crate::error::{Error, Result};
use crate::orchestrator::Orchestrator;
use crate::provider::SeederModule;
use crate::seeder::{SeederGroup, TaskId};
use serde::{Deserialize, Serialize};

/// Declarative group layout for a seeding run.
///
/// ```yaml
/// groups:
///   - [schema, roles]
///   - [users]
/// remainders: per_task
/// ```
///
/// Each inner list is one concurrent group; groups run in order. Names match
/// a seeder's short type name (`UsersSeeder`) or its full path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedingPlan {
    #[serde(default)]
    pub groups: Vec<Vec<String>>,

    /// What to do with seeders the groups do not mention.
    #[serde(default)]
    pub remainders: RemainderMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderMode {
    /// Leave them out.
    #[default]
    None,
    /// One group per remaining seeder, in type-name order.
    PerTask,
    /// All remaining seeders in a single concurrent group.
    OneGroup,
}

impl std::fmt::Display for RemainderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RemainderMode::None => "none",
            RemainderMode::PerTask => "per_task",
            RemainderMode::OneGroup => "one_group",
        })
    }
}

impl SeedingPlan {
    /// Number of seeders named across all groups.
    pub fn seeder_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Map every named seeder onto a type from `module`.
    ///
    /// Nothing is registered; this only checks the plan against the module.
    pub fn resolve(&self, module: &dyn SeederModule) -> Result<Vec<SeederGroup>> {
        self.validate()?;
        let available = module.seeder_types();

        let mut groups = Vec::with_capacity(self.groups.len());
        for names in &self.groups {
            let mut group = SeederGroup::new();
            for name in names {
                group.add_type(lookup(&available, name)?)?;
            }
            groups.push(group);
        }
        Ok(groups)
    }

    /// Register the plan on `orchestrator`: every group in order, then the
    /// remainders as configured.
    pub fn apply(&self, orchestrator: &Orchestrator, module: &dyn SeederModule) -> Result<()> {
        for group in self.resolve(module)? {
            orchestrator.add_group(group)?;
        }

        match self.remainders {
            RemainderMode::None => Ok(()),
            RemainderMode::PerTask => orchestrator.collect_remaining(module),
            RemainderMode::OneGroup => orchestrator.collect_remaining_as_one_group(module),
        }
    }
}

fn lookup(available: &[TaskId], name: &str) -> Result<TaskId> {
    if let Some(id) = available.iter().find(|id| id.name() == name) {
        return Ok(*id);
    }

    let matches: Vec<&TaskId> = available
        .iter()
        .filter(|id| id.short_name() == name)
        .collect();
    match matches.as_slice() {
        [id] => Ok(**id),
        [] => Err(Error::Validation(format!("Unknown seeder '{}'", name))),
        many => Err(Error::Validation(format!(
            "Seeder name '{}' is ambiguous; use one of: {}",
            name,
            many.iter()
                .map(|id| id.name())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
