use super::{Seeder, TaskId};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a completed [`SeedTask::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The gate passed and the effect ran.
    Seeded,
    /// The gate returned `false`; the effect was not invoked.
    Skipped,
}

/// A seeder prepared for one run.
///
/// Wraps the seeder with the run contract every seeder shares and latches the
/// gate result so it can be inspected after the run.
pub struct SeedTask {
    seeder: Arc<dyn Seeder>,
    id: TaskId,
    should_seed: AtomicBool,
}

impl SeedTask {
    pub fn new(seeder: Arc<dyn Seeder>) -> Self {
        let id = seeder.task_id();
        Self {
            seeder,
            id,
            should_seed: AtomicBool::new(false),
        }
    }

    pub fn from_seeder<S: Seeder>(seeder: S) -> Self {
        Self::new(Arc::new(seeder))
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Result of the last gate evaluation. `false` until the task has run.
    pub fn should_seed(&self) -> bool {
        self.should_seed.load(Ordering::SeqCst)
    }

    /// Run the seeder.
    ///
    /// 1. Evaluate the gate and latch its result
    /// 2. If the gate is closed, log and return [`SeedOutcome::Skipped`]
    /// 3. If `ct` is already cancelled, fail with [`Error::Cancelled`] before the effect
    /// 4. Otherwise run the effect
    ///
    /// Gate and effect failures are returned unchanged.
    pub async fn run(&self, ct: &CancellationToken) -> Result<SeedOutcome> {
        let should_seed = self.seeder.should_seed(ct).await?;
        self.should_seed.store(should_seed, Ordering::SeqCst);

        if !should_seed {
            tracing::info!(seeder = %self.id, "Skipping seeding");
            return Ok(SeedOutcome::Skipped);
        }

        if ct.is_cancelled() {
            return Err(Error::Cancelled(self.id.to_string()));
        }

        self.seeder.seed(ct).await?;
        Ok(SeedOutcome::Seeded)
    }
}

impl std::fmt::Debug for SeedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedTask")
            .field("id", &self.id)
            .field("should_seed", &self.should_seed())
            .finish_non_exhaustive()
    }
}
