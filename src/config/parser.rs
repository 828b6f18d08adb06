use super::SeedingPlan;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for, in order.
pub const PLAN_FILE_NAMES: [&str; 2] = ["seeding.yaml", "seeding.yml"];

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find a plan file starting from the current directory
    pub fn find_plan_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_plan_in_dir(&current_dir)
    }

    pub fn find_plan_in_dir(dir: &Path) -> Result<PathBuf> {
        for name in PLAN_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Ok(path);
            }
        }

        // Try parent directory
        if let Some(parent) = dir.parent() {
            return Self::find_plan_in_dir(parent);
        }

        Err(Error::Config(
            "Could not find seeding.yaml in current directory or any parent".to_string(),
        ))
    }

    /// Load a plan from a file path
    pub fn load_plan<P: AsRef<Path>>(&self, path: P) -> Result<SeedingPlan> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read seeding plan '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_plan(&content)
    }

    /// Parse a plan from a YAML string
    pub fn parse_plan(&self, content: &str) -> Result<SeedingPlan> {
        // An empty document is an empty plan
        if content.trim().is_empty() {
            return Ok(SeedingPlan::default());
        }
        let plan: SeedingPlan = serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse seeding plan: {}", e)))?;
        Ok(plan)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
