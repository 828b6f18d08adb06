//! Service resolution boundary.
//!
//! The orchestrator never constructs seeders itself. It asks a
//! [`ServiceProvider`] for them, either directly or through a short-lived
//! [`ServiceScope`] that is disposed once the seeder's group has finished.
//! [`Container`] is the in-crate implementation: a registry of seeder
//! factories plus shared and per-scope resources.

mod container;

pub use container::{
    Container, ContainerBuilder, ContainerScope, DisposedScope, ResolveContext, SCOPE_ID_KEY,
};

use crate::error::Result;
use crate::seeder::{Seeder, TaskId};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves seeders by type and opens isolated scopes.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    /// Open a new scope. Each scope owns its own scoped resources.
    async fn create_scope(&self) -> Result<Box<dyn ServiceScope>>;

    /// Resolve a seeder from the root, outside of any scope.
    fn resolve(&self, id: TaskId) -> Result<Arc<dyn Seeder>>;

    /// Whether [`resolve`](ServiceProvider::resolve) can construct `id` at all.
    fn can_resolve(&self, id: TaskId) -> bool;
}

/// A disposable resolution scope.
#[async_trait]
pub trait ServiceScope: Send + Sync {
    fn id(&self) -> u64;

    /// Resolve a seeder against this scope's resources.
    fn resolve(&self, id: TaskId) -> Result<Arc<dyn Seeder>>;

    /// Release the scope's resources. Calling it again is a no-op.
    async fn dispose(&self) -> Result<()>;
}

/// A source of candidate seeder types for remainder collection.
pub trait SeederModule {
    fn seeder_types(&self) -> Vec<TaskId>;
}

/// An explicit list of seeder types.
#[derive(Debug, Clone, Default)]
pub struct SeederList {
    types: Vec<TaskId>,
}

impl SeederList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Seeder>(mut self) -> Self {
        self.types.push(TaskId::of::<T>());
        self
    }

    pub fn push(&mut self, id: TaskId) {
        self.types.push(id);
    }
}

impl SeederModule for SeederList {
    fn seeder_types(&self) -> Vec<TaskId> {
        self.types.clone()
    }
}

impl FromIterator<TaskId> for SeederList {
    fn from_iter<I: IntoIterator<Item = TaskId>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
