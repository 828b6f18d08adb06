//! Minimal hosted-service lifecycle.
//!
//! A [`Host`] starts its services in registration order and stops them in
//! reverse. The seeding [`Orchestrator`] is registered like any other
//! service through [`HostBuilder::add_one_time_seeder`].

use crate::error::{Error, Result};
use crate::orchestrator::Orchestrator;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// A service with a start/stop lifecycle driven by a [`Host`].
#[async_trait]
pub trait HostedService: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self, ct: &CancellationToken) -> Result<()>;

    async fn stop(&self, ct: &CancellationToken) -> Result<()>;
}

/// Builder for [`Host`].
#[derive(Default)]
pub struct HostBuilder {
    services: Vec<Arc<dyn HostedService>>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hosted_service(mut self, service: impl HostedService + 'static) -> Self {
        self.services.push(Arc::new(service));
        self
    }

    pub fn shared_hosted_service(mut self, service: Arc<dyn HostedService>) -> Self {
        self.services.push(service);
        self
    }

    /// Register a seeding orchestrator so it runs once when the host starts.
    pub fn add_one_time_seeder(self, orchestrator: Arc<Orchestrator>) -> Self {
        self.shared_hosted_service(orchestrator)
    }

    pub fn build(self) -> Host {
        Host {
            services: self.services,
        }
    }
}

/// Owns a set of hosted services.
pub struct Host {
    services: Vec<Arc<dyn HostedService>>,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn services(&self) -> &[Arc<dyn HostedService>] {
        &self.services
    }

    /// Start every service in order, stopping at the first failure.
    ///
    /// Services that already started are left running; call [`stop`](Self::stop)
    /// to shut them down.
    pub async fn start(&self, ct: &CancellationToken) -> Result<()> {
        for service in &self.services {
            let name = service.name().to_string();
            tracing::debug!("Starting hosted service '{}'", name);
            service
                .start(ct)
                .instrument(tracing::info_span!("hosted_service", service.name = %name))
                .await
                .inspect_err(|e| tracing::error!("Hosted service '{}' failed to start: {}", name, e))?;
        }
        Ok(())
    }

    /// Stop every service in reverse order. Every service is asked to stop
    /// even if an earlier one fails; the failures are returned together.
    pub async fn stop(&self, ct: &CancellationToken) -> Result<()> {
        let mut errors = Vec::new();
        for service in self.services.iter().rev() {
            if let Err(e) = service.stop(ct).await {
                tracing::warn!("Hosted service '{}' failed to stop: {}", service.name(), e);
                errors.push(e);
            }
        }

        match Error::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
