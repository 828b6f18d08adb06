use super::{DefaultHooks, Orchestrator, SeedingHooks};
use crate::error::{Error, Result};
use crate::provider::ServiceProvider;
use std::sync::Arc;

/// Builder for constructing an [`Orchestrator`] with a fluent API.
///
/// # Example
///
/// ```
/// use hostkit::provider::Container;
/// use hostkit::Orchestrator;
///
/// # fn example() -> hostkit::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .provider(Container::builder().build())
///     .build()?;
/// assert_eq!(orchestrator.pending_count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    provider: Option<Arc<dyn ServiceProvider>>,
    hooks: Option<Arc<dyn SeedingHooks>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service provider seeders are resolved from.
    ///
    /// This is required to build the orchestrator.
    pub fn provider(mut self, provider: impl ServiceProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Like [`provider`](Self::provider), for a provider that is already shared.
    pub fn shared_provider(mut self, provider: Arc<dyn ServiceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the collection and validation hooks.
    ///
    /// If not set, [`DefaultHooks`] are used.
    pub fn hooks(mut self, hooks: impl SeedingHooks + 'static) -> Self {
        self.hooks = Some(Arc::new(hooks));
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let provider = self.provider.ok_or_else(|| {
            Error::Config("Orchestrator requires a service provider".to_string())
        })?;
        let hooks = self.hooks.unwrap_or_else(|| Arc::new(DefaultHooks));
        Ok(Orchestrator::with_hooks(provider, hooks))
    }
}
