use super::lease::ScopeLease;
use super::{OrchestratorBuilder, SeedingHooks};
use crate::error::{Error, Result};
use crate::host::HostedService;
use crate::provider::ServiceProvider;
use crate::seeder::{SeedOutcome, SeedTask, SeederEntry, SeederGroup, TaskId};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Where a seeding run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedingPhase {
    /// Accepting registrations; no run in progress.
    #[default]
    Idle,
    Collecting,
    Validating,
    Executing,
    /// The queue was drained and state reset.
    Drained,
}

/// Summary of a completed seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedingReport {
    /// Dequeued groups, including empty ones.
    pub steps: usize,
    pub executed_groups: usize,
    pub skipped_groups: usize,
    /// Seeders whose effect ran.
    pub seeded: usize,
    /// Seeders whose gate returned `false`.
    pub skipped_tasks: usize,
    /// Execution stopped early because the token was cancelled.
    pub cancelled: bool,
}

/// Outcome of one seeder within a group, plus the scope it ran in.
struct TaskRun {
    id: TaskId,
    lease: Option<ScopeLease>,
    result: Result<SeedOutcome>,
}

/// Runs registered seeder groups once, in order.
///
/// Groups execute strictly in the order they were registered. All seeders of
/// a group run concurrently on the calling task; the next group starts only
/// after every seeder of the previous one has finished and its scope has
/// been released.
///
/// # Concurrency Model
///
/// - Registration methods take `&self`; state lives behind `parking_lot`
///   locks that are never held across an `.await`
/// - No tasks are spawned for execution; a group is one `join_all`
/// - A single `CancellationToken` is checked after collection, before each
///   group and between each seeder's gate and effect
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use hostkit::provider::Container;
/// use hostkit::seeder::Seeder;
/// use hostkit::Orchestrator;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Default)]
/// struct Schema;
/// #[derive(Default)]
/// struct Users;
///
/// #[async_trait]
/// impl Seeder for Schema {
///     async fn seed(&self, _ct: &CancellationToken) -> hostkit::Result<()> { Ok(()) }
/// }
/// #[async_trait]
/// impl Seeder for Users {
///     async fn seed(&self, _ct: &CancellationToken) -> hostkit::Result<()> { Ok(()) }
/// }
///
/// # async fn example() -> hostkit::Result<()> {
/// let container = Container::builder()
///     .seeder_default::<Schema>()
///     .seeder_default::<Users>()
///     .build();
///
/// let orchestrator = Orchestrator::new(container);
/// orchestrator.add_seeder::<Schema>()?.add_seeder::<Users>()?;
///
/// let report = orchestrator.run(&CancellationToken::new()).await?;
/// assert_eq!(report.seeded, 2);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    pub(super) provider: Arc<dyn ServiceProvider>,
    hooks: Arc<dyn SeedingHooks>,
    pub(super) pending: Mutex<VecDeque<SeederGroup>>,
    pub(super) registered: RwLock<HashSet<TaskId>>,
    pub(super) remainders_collected: AtomicBool,
    phase: Mutex<SeedingPhase>,
    running: AtomicBool,
}

/// Clears the running flag on every exit path, including a dropped run future.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Clears registrations and marks the run drained once execution has begun,
/// including when the run future is dropped mid-group.
struct ExecutionGuard<'a>(&'a Orchestrator);

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.0.reset();
        self.0.set_phase(SeedingPhase::Drained);
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Create an orchestrator with the default hooks.
    pub fn new(provider: impl ServiceProvider + 'static) -> Self {
        Self::with_hooks(Arc::new(provider), Arc::new(super::DefaultHooks))
    }

    pub fn with_hooks(provider: Arc<dyn ServiceProvider>, hooks: Arc<dyn SeedingHooks>) -> Self {
        Self {
            provider,
            hooks,
            pending: Mutex::new(VecDeque::new()),
            registered: RwLock::new(HashSet::new()),
            remainders_collected: AtomicBool::new(false),
            phase: Mutex::new(SeedingPhase::Idle),
            running: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> SeedingPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: SeedingPhase) {
        *self.phase.lock() = phase;
    }

    /// Number of groups waiting to run.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_registered(&self, id: TaskId) -> bool {
        self.registered.read().contains(&id)
    }

    pub fn remainders_collected(&self) -> bool {
        self.remainders_collected.load(Ordering::SeqCst)
    }

    fn next_group(&self) -> Option<SeederGroup> {
        self.pending.lock().pop_front()
    }

    /// Forget every registration so the instance can be used again.
    fn reset(&self) {
        self.pending.lock().clear();
        self.registered.write().clear();
        self.remainders_collected.store(false, Ordering::SeqCst);
    }

    /// Run every registered group.
    ///
    /// Fails with [`Error::Cancelled`] if `ct` is cancelled once collection
    /// has finished. Cancellation during execution stops before the next group
    /// and is reported through [`SeedingReport::cancelled`] instead.
    ///
    /// Once execution has begun, all registrations are cleared when this
    /// returns, whether it succeeded or not, and also when the returned
    /// future is dropped before completing.
    pub async fn run(&self, ct: &CancellationToken) -> Result<SeedingReport> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::Seed("A seeding run is already in progress".to_string()));
        }
        let _guard = RunGuard(&self.running);

        self.run_impl(ct)
            .instrument(tracing::info_span!("seeding"))
            .await
    }

    async fn run_impl(&self, ct: &CancellationToken) -> Result<SeedingReport> {
        tracing::info!("Data seeding starting...");

        self.set_phase(SeedingPhase::Collecting);
        if let Err(e) = self.hooks.collect(self, ct).await {
            self.set_phase(SeedingPhase::Idle);
            return Err(e);
        }

        if ct.is_cancelled() {
            self.set_phase(SeedingPhase::Idle);
            return Err(Error::Cancelled(
                "seeding was cancelled before execution".to_string(),
            ));
        }

        self.set_phase(SeedingPhase::Validating);
        if !self.hooks.validate(self) {
            self.set_phase(SeedingPhase::Idle);
            return Ok(SeedingReport::default());
        }

        self.set_phase(SeedingPhase::Executing);
        let _drain = ExecutionGuard(self);
        self.execute(ct).await
    }

    async fn execute(&self, ct: &CancellationToken) -> Result<SeedingReport> {
        let mut report = SeedingReport::default();

        while let Some(group) = self.next_group() {
            if ct.is_cancelled() {
                tracing::warn!("Seeding process cancelled during execution.");
                report.cancelled = true;
                break;
            }

            let step = report.steps;
            report.steps += 1;

            if group.is_empty() {
                tracing::debug!("ExecutionStep {} : Skipping empty seeder group", step);
                report.skipped_groups += 1;
                continue;
            }

            tracing::debug!(
                "ExecutionStep {} : {} seeder(s) found, executing...",
                step,
                group.len()
            );
            self.execute_group(group, ct, &mut report).await?;
            report.executed_groups += 1;
        }

        tracing::info!("All seeders completed in {} steps", report.steps);
        Ok(report)
    }

    /// Run one group to completion, then release its scopes.
    async fn execute_group(
        &self,
        group: SeederGroup,
        ct: &CancellationToken,
        report: &mut SeedingReport,
    ) -> Result<()> {
        // Every future exists before any is polled, so the seeders overlap.
        let runs = join_all(
            group
                .into_entries()
                .into_iter()
                .map(|entry| self.run_entry(entry, ct)),
        )
        .await;

        let mut errors = Vec::new();
        let mut leases = Vec::new();
        for run in runs {
            match run.result {
                Ok(SeedOutcome::Seeded) => report.seeded += 1,
                Ok(SeedOutcome::Skipped) => report.skipped_tasks += 1,
                Err(e) => {
                    tracing::error!("Seeder '{}' failed: {}", run.id, e);
                    errors.push(Error::SeederFailed {
                        seeder: run.id.to_string(),
                        source: Box::new(e),
                    });
                }
            }
            leases.extend(run.lease);
        }

        for lease in leases {
            if let Err(e) = lease.release().await {
                tracing::error!("{}", e);
                errors.push(e);
            }
        }

        match Error::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn run_entry(&self, entry: SeederEntry, ct: &CancellationToken) -> TaskRun {
        let id = entry.task_id();
        let span = tracing::info_span!("seeder", seeder = %id.short_name());

        async move {
            match entry {
                SeederEntry::Instance(seeder) => TaskRun {
                    id,
                    lease: None,
                    result: SeedTask::new(seeder).run(ct).await,
                },
                SeederEntry::Type(_) => {
                    let lease = match ScopeLease::acquire(self.provider.as_ref(), id).await {
                        Ok(lease) => lease,
                        Err(e) => {
                            return TaskRun {
                                id,
                                lease: None,
                                result: Err(e),
                            }
                        }
                    };
                    let result = match lease.resolve() {
                        Ok(seeder) => SeedTask::new(seeder).run(ct).await,
                        Err(e) => Err(e),
                    };
                    TaskRun {
                        id,
                        lease: Some(lease),
                        result,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl HostedService for Orchestrator {
    fn name(&self) -> &str {
        "data-seeder"
    }

    /// Run the seeders; the report is only logged.
    async fn start(&self, ct: &CancellationToken) -> Result<()> {
        let report = self.run(ct).await?;
        tracing::debug!(?report, "Seeding finished");
        Ok(())
    }

    async fn stop(&self, _ct: &CancellationToken) -> Result<()> {
        tracing::info!("Stopping data seeder...");
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("pending", &self.pending_count())
            .field("phase", &self.phase())
            .field("remainders_collected", &self.remainders_collected())
            .finish_non_exhaustive()
    }
}
