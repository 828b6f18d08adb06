//! The seeding contract.
//!
//! A [`Seeder`] is one unit of idempotent setup work: a gate
//! ([`Seeder::should_seed`]) and an effect ([`Seeder::seed`]). Seeders are
//! collected into [`SeederGroup`]s, which the
//! [`Orchestrator`](crate::orchestrator::Orchestrator) runs one after another,
//! with every seeder inside a group running concurrently.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use hostkit::seeder::{SeedTask, SeedOutcome, Seeder};
//! use tokio_util::sync::CancellationToken;
//!
//! struct RolesSeeder;
//!
//! #[async_trait]
//! impl Seeder for RolesSeeder {
//!     async fn seed(&self, _ct: &CancellationToken) -> hostkit::Result<()> {
//!         // insert the default roles
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> hostkit::Result<()> {
//! let task = SeedTask::from_seeder(RolesSeeder);
//! assert_eq!(task.run(&CancellationToken::new()).await?, SeedOutcome::Seeded);
//! assert!(task.should_seed());
//! # Ok(())
//! # }
//! ```

mod group;
mod task;

pub use group::*;
pub use task::*;

use crate::error::Result;
use async_trait::async_trait;
use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tokio_util::sync::CancellationToken;

/// Identity of a seeder type.
///
/// Equality and hashing use the [`TypeId`]; ordering and display use the
/// fully qualified type name, which is the deterministic sort key for
/// remainder collection.
#[derive(Clone, Copy)]
pub struct TaskId {
    type_id: TypeId,
    name: &'static str,
}

impl TaskId {
    /// Identity of the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name, e.g. `my_app::seeders::RolesSeeder`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `RolesSeeder`.
    pub fn short_name(&self) -> &'static str {
        // Generic arguments may contain `::` themselves, so only look at the
        // path before the first `<`.
        let path_end = self.name.find('<').unwrap_or(self.name.len());
        let start = self.name[..path_end].rfind("::").map(|i| i + 2).unwrap_or(0);
        &self.name[start..]
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskId").field(&self.name).finish()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A unit of idempotent seeding work.
///
/// Implementors provide the effect in [`seed`](Seeder::seed) and may override
/// the gate in [`should_seed`](Seeder::should_seed), e.g. "only seed if the
/// table is empty". Both receive the run's cancellation token and are expected
/// to observe it cooperatively; nothing aborts an effect that is already running.
#[async_trait]
pub trait Seeder: Send + Sync + 'static {
    /// Decide whether the effect should run. Defaults to `true`.
    async fn should_seed(&self, _ct: &CancellationToken) -> Result<bool> {
        Ok(true)
    }

    /// Perform the seeding. Must be safe to skip entirely.
    async fn seed(&self, ct: &CancellationToken) -> Result<()>;

    /// Identity of the concrete seeder type.
    fn task_id(&self) -> TaskId {
        TaskId::of::<Self>()
    }
}
