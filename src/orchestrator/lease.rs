use crate::error::{Error, Result};
use crate::provider::{ServiceProvider, ServiceScope};
use crate::seeder::{Seeder, TaskId};
use std::sync::Arc;

/// RAII guard over the scope a single seeder runs in.
///
/// The orchestrator releases every lease explicitly once the seeder's group
/// has settled. If the lease is dropped without being released (the run
/// future was dropped, or a panic unwound through it), Drop spawns the
/// disposal on the current runtime instead.
///
/// # Drop behavior
///
/// Best-effort: without a runtime the disposal is skipped with a warning.
pub(super) struct ScopeLease {
    scope: Arc<dyn ServiceScope>,
    seeder: TaskId,
    released: bool,
}

impl ScopeLease {
    /// Open a fresh scope for `seeder`.
    pub async fn acquire(provider: &dyn ServiceProvider, seeder: TaskId) -> Result<Self> {
        let scope: Arc<dyn ServiceScope> = Arc::from(provider.create_scope().await?);
        Ok(Self {
            scope,
            seeder,
            released: false,
        })
    }

    /// Resolve the leased seeder inside the scope.
    pub fn resolve(&self) -> Result<Arc<dyn Seeder>> {
        self.scope.resolve(self.seeder)
    }

    /// Dispose the scope. Consumes the lease so it can only happen once.
    pub async fn release(mut self) -> Result<()> {
        let result = self.scope.dispose().await;
        self.released = true;
        result.map_err(|source| Error::ScopeRelease {
            seeder: self.seeder.to_string(),
            source: Box::new(source),
        })
    }
}

impl Drop for ScopeLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let scope = Arc::clone(&self.scope);
        let seeder = self.seeder;
        tracing::debug!(
            "Scope lease for '{}' dropped without release, spawning disposal",
            seeder
        );
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = scope.dispose().await {
                        tracing::warn!(
                            "Failed to dispose scope for '{}' during guard cleanup: {}",
                            seeder,
                            e
                        );
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    "No runtime available to dispose scope for '{}'",
                    seeder
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Container;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Noop;

    #[async_trait]
    impl Seeder for Noop {
        async fn seed(&self, _ct: &CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    fn counting_container(disposals: Arc<AtomicUsize>) -> Container {
        Container::builder()
            .seeder_default::<Noop>()
            .on_scope_dispose(move |_scope| {
                let disposals = Arc::clone(&disposals);
                async move {
                    disposals.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .build()
    }

    #[tokio::test]
    async fn test_release_disposes_once() {
        let disposals = Arc::new(AtomicUsize::new(0));
        let container = counting_container(Arc::clone(&disposals));

        let lease = ScopeLease::acquire(&container, TaskId::of::<Noop>())
            .await
            .unwrap();
        assert!(lease.resolve().is_ok());
        lease.release().await.unwrap();

        // Give any hypothetical spawn a chance to run
        tokio::task::yield_now().await;

        assert_eq!(disposals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_without_release_disposes() {
        let disposals = Arc::new(AtomicUsize::new(0));
        let container = counting_container(Arc::clone(&disposals));

        let lease = ScopeLease::acquire(&container, TaskId::of::<Noop>())
            .await
            .unwrap();
        drop(lease);

        // Let the spawned cleanup task run
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(
            disposals.load(Ordering::SeqCst),
            1,
            "Scope should be disposed after the lease is dropped unreleased"
        );
    }

    #[tokio::test]
    async fn test_release_failure_names_seeder() {
        let container = Container::builder()
            .seeder_default::<Noop>()
            .on_scope_dispose(|_scope| async { Err(Error::Seed("disk full".into())) })
            .build();

        let lease = ScopeLease::acquire(&container, TaskId::of::<Noop>())
            .await
            .unwrap();
        let err = lease.release().await.unwrap_err();

        assert!(matches!(err, Error::ScopeRelease { ref seeder, .. } if seeder.ends_with("Noop")));
    }
}
