mod builder;
mod core;
mod hooks;
mod lease;
mod registration;

pub use builder::OrchestratorBuilder;
pub use self::core::*;
pub use hooks::{DefaultHooks, SeedingHooks};
