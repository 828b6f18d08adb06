mod plan;
mod version;

pub use plan::run_plan;
pub use version::run_version;
