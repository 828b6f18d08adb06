//! Seeding plan configuration.
//!
//! - `plan` - The plan itself (`SeedingPlan`, `RemainderMode`)
//! - `parser` - YAML loading and plan file discovery
//! - `validation` - Structural checks

mod parser;
mod plan;
mod validation;

pub use parser::*;
pub use plan::*;
