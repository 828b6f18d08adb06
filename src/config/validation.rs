use super::SeedingPlan;
use crate::error::{Error, Result};
use std::collections::HashSet;

impl SeedingPlan {
    /// Validate the plan's structure
    pub fn validate(&self) -> Result<()> {
        for (index, group) in self.groups.iter().enumerate() {
            let mut seen = HashSet::new();
            for name in group {
                if name.trim().is_empty() {
                    return Err(Error::Validation(format!(
                        "Group {} contains an empty seeder name",
                        index
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(Error::Validation(format!(
                        "Seeder '{}' appears more than once in group {}",
                        name, index
                    )));
                }
            }
        }

        Ok(())
    }
}
