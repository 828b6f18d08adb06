use super::Orchestrator;
use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Extension points around a seeding run.
///
/// Both hooks have defaults, so an implementation only overrides what it needs.
#[async_trait]
pub trait SeedingHooks: Send + Sync {
    /// Register additional groups right before execution. Cancellation is
    /// checked only after this returns.
    async fn collect(&self, _orchestrator: &Orchestrator, _ct: &CancellationToken) -> Result<()> {
        Ok(())
    }

    /// Decide whether the run should execute at all. The default refuses to
    /// run when nothing was registered.
    fn validate(&self, orchestrator: &Orchestrator) -> bool {
        if orchestrator.pending_count() > 0 {
            return true;
        }
        tracing::warn!("No seeders were added prior to execution.");
        false
    }
}

/// Hooks with the default behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl SeedingHooks for DefaultHooks {}
