//! Registration of seeder groups before a run.

use super::Orchestrator;
use crate::error::{Error, Result};
use crate::provider::SeederModule;
use crate::seeder::{Seeder, SeederGroup, TaskId};
use std::sync::atomic::Ordering;
use std::sync::Arc;

impl Orchestrator {
    /// Register `T` as a group of its own.
    pub fn add_seeder<T: Seeder>(&self) -> Result<&Self> {
        self.add_group_with(|group| group.add_seeder::<T>().map(|_| ()))
    }

    /// Build a group in `build` and register it. Nothing is registered if
    /// `build` fails.
    pub fn add_group_with<F>(&self, build: F) -> Result<&Self>
    where
        F: FnOnce(&mut SeederGroup) -> Result<()>,
    {
        let mut group = SeederGroup::new();
        build(&mut group)?;
        self.add_group(group)
    }

    /// Register a group of prebuilt seeder instances.
    pub fn add_instances<I>(&self, seeders: I) -> Result<&Self>
    where
        I: IntoIterator<Item = Arc<dyn Seeder>>,
    {
        self.add_group(SeederGroup::from_instances(seeders)?)
    }

    /// Append `group` to the run queue.
    ///
    /// Fails with [`Error::RemaindersCollected`] once remainder collection
    /// has closed registration.
    pub fn add_group(&self, group: SeederGroup) -> Result<&Self> {
        self.ensure_open()?;

        self.registered.write().extend(group.task_ids());
        self.pending.lock().push_back(group);
        Ok(self)
    }

    /// Register every seeder in `module` that is not registered yet, each as a
    /// group of its own, in type-name order.
    ///
    /// A candidate that cannot be registered is logged and skipped; the rest
    /// are still registered. Registration is closed afterwards even if some
    /// candidates failed. Any failure is reported as [`Error::Multiple`],
    /// even a single one.
    pub fn collect_remaining(&self, module: &dyn SeederModule) -> Result<()> {
        let mut errors = Vec::new();

        for id in candidates(module) {
            if self.is_registered(id) {
                tracing::debug!("Skipping {} as it was already assigned", id);
                continue;
            }
            if let Err(e) = self.register_candidate(id) {
                tracing::error!("Failed to register {}: {}. Skipping...", id, e);
                errors.push(e);
            }
        }

        self.remainders_collected.store(true, Ordering::SeqCst);
        scan_result(errors)
    }

    /// Register every seeder in `module` that is not registered yet as one
    /// concurrent group.
    ///
    /// If any candidate fails, nothing is registered and registration stays open.
    pub fn collect_remaining_as_one_group(&self, module: &dyn SeederModule) -> Result<()> {
        let mut group = SeederGroup::new();
        let mut errors = Vec::new();

        for id in candidates(module) {
            if self.is_registered(id) {
                tracing::debug!("Skipping {} as it was already assigned", id);
                continue;
            }
            let added = self
                .ensure_resolvable(id)
                .and_then(|()| group.add_type(id).map(|_| ()));
            if let Err(e) = added {
                tracing::error!("Failed to register {}: {}. Skipping...", id, e);
                errors.push(e);
            }
        }

        scan_result(errors)?;

        self.add_group(group)?;
        self.remainders_collected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn register_candidate(&self, id: TaskId) -> Result<()> {
        self.ensure_resolvable(id)?;
        let mut group = SeederGroup::new();
        group.add_type(id)?;
        self.add_group(group).map(|_| ())
    }

    fn ensure_resolvable(&self, id: TaskId) -> Result<()> {
        if self.provider.can_resolve(id) {
            Ok(())
        } else {
            Err(Error::Unresolvable(id.to_string()))
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if !self.remainders_collected() {
            return Ok(());
        }
        tracing::error!("Remainder seeders have already been collected");
        Err(Error::RemaindersCollected)
    }
}

/// Scan failures are always reported as one bundle, however many there are.
fn scan_result(errors: Vec<Error>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Multiple(errors))
    }
}

/// Candidate types in deterministic order, without repeats.
fn candidates(module: &dyn SeederModule) -> Vec<TaskId> {
    let mut ids = module.seeder_types();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Container, SeederList};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    macro_rules! seeders {
        ($($name:ident),*) => {$(
            #[derive(Default)]
            struct $name;

            #[async_trait]
            impl Seeder for $name {
                async fn seed(&self, _ct: &CancellationToken) -> Result<()> {
                    Ok(())
                }
            }
        )*};
    }

    seeders!(Alpha, Beta, Gamma);

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Container::builder()
                .seeder_default::<Alpha>()
                .seeder_default::<Beta>()
                .seeder_default::<Gamma>()
                .build(),
        )
    }

    #[test]
    fn test_add_seeder_enqueues_single_group() {
        let orch = orchestrator();
        orch.add_seeder::<Alpha>().unwrap().add_seeder::<Beta>().unwrap();

        assert_eq!(orch.pending_count(), 2);
        assert!(orch.is_registered(TaskId::of::<Alpha>()));
        assert!(orch.is_registered(TaskId::of::<Beta>()));
    }

    #[test]
    fn test_failed_group_builder_registers_nothing() {
        let orch = orchestrator();
        let result = orch.add_group_with(|group| {
            group.add_seeder::<Alpha>()?.add_seeder::<Alpha>()?;
            Ok(())
        });

        assert!(matches!(result, Err(Error::DuplicateSeeder(_))));
        assert_eq!(orch.pending_count(), 0);
        assert!(!orch.is_registered(TaskId::of::<Alpha>()));
    }

    #[test]
    fn test_collect_remaining_skips_registered() {
        let orch = orchestrator();
        orch.add_seeder::<Beta>().unwrap();

        let module = SeederList::new().with::<Alpha>().with::<Beta>().with::<Gamma>();
        orch.collect_remaining(&module).unwrap();

        assert_eq!(orch.pending_count(), 3);
        assert!(orch.remainders_collected());
    }

    #[test]
    fn test_collect_as_one_group_failure_keeps_registration_open() {
        let orch = Orchestrator::new(Container::builder().seeder_default::<Alpha>().build());
        let module = SeederList::new().with::<Alpha>().with::<Beta>();

        let err = orch.collect_remaining_as_one_group(&module).unwrap_err();

        match err {
            Error::Multiple(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], Error::Unresolvable(ref name) if name.ends_with("Beta")));
            }
            other => panic!("expected Multiple, got {other:?}"),
        }
        assert_eq!(orch.pending_count(), 0);
        assert!(!orch.remainders_collected());
        assert!(orch.add_seeder::<Alpha>().is_ok());
    }

    #[test]
    fn test_collect_as_one_group_enqueues_one_group() {
        let orch = orchestrator();
        orch.add_seeder::<Alpha>().unwrap();

        orch.collect_remaining_as_one_group(&SeederList::new().with::<Gamma>().with::<Beta>().with::<Alpha>())
            .unwrap();

        assert_eq!(orch.pending_count(), 2);
        assert!(orch.remainders_collected());
        assert!(matches!(orch.add_seeder::<Gamma>(), Err(Error::RemaindersCollected)));
    }

    #[test]
    fn test_collect_after_latch_reports_each_candidate() {
        let orch = orchestrator();
        orch.collect_remaining(&SeederList::new().with::<Alpha>()).unwrap();

        let err = orch
            .collect_remaining(&SeederList::new().with::<Beta>().with::<Gamma>())
            .unwrap_err();

        match err {
            Error::Multiple(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|e| matches!(e, Error::RemaindersCollected)));
            }
            other => panic!("expected Multiple, got {:?}", other),
        }
    }
}
