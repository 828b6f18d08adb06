#![allow(unused_assignments)]

//! # hostkit
//!
//! Building blocks for dependency-injected host applications.
//!
//! ## Features
//!
//! - **One-time data seeding**: Register idempotent [`Seeder`]s in ordered groups and run
//!   them once at startup, each in its own disposable scope
//! - **Typed value stores**: Heterogeneous key/value maps with typed retrieval, in
//!   mutable, immutable and frozen variants
//! - **Async lazy values**: [`AsyncLazy`] memoises an async factory with cancellation
//! - **Semantic versions**: [`SemanticVersion`] parsing, ordering and bumping
//! - **Seeding plans**: Describe group layout in `seeding.yaml` instead of code
//!
//! ## Quick Start
//!
//! ```no_run
//! use async_trait::async_trait;
//! use hostkit::provider::{Container, SeederList};
//! use hostkit::{Host, Orchestrator, Seeder};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Default)]
//! struct RolesSeeder;
//!
//! #[async_trait]
//! impl Seeder for RolesSeeder {
//!     async fn seed(&self, _ct: &CancellationToken) -> hostkit::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> hostkit::Result<()> {
//! let container = Container::builder().seeder_default::<RolesSeeder>().build();
//! let orchestrator = Arc::new(Orchestrator::new(container.clone()));
//!
//! // Anything not placed in a group explicitly runs afterwards, one group each
//! orchestrator.collect_remaining(&container)?;
//!
//! let host = Host::builder().add_one_time_seeder(orchestrator).build();
//! let ct = CancellationToken::new();
//! host.start(&ct).await?;
//! host.stop(&ct).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! - Groups run strictly one after another; seeders within a group run concurrently
//! - Nothing is spawned: a group is a single `join_all` on the caller's task
//! - Cancellation is cooperative through one `CancellationToken`

pub mod config;
pub mod error;
pub mod host;
pub mod lazy;
pub mod orchestrator;
pub mod provider;
pub mod regex_lib;
pub mod seeder;
pub mod store;
pub mod version;

// Re-export commonly used types
pub use config::{Parser, RemainderMode, SeedingPlan};
pub use error::{Error, Result};
pub use host::{Host, HostedService};
pub use lazy::AsyncLazy;
pub use orchestrator::{Orchestrator, SeedingHooks, SeedingReport};
pub use seeder::{SeedTask, Seeder, SeederGroup, TaskId};
pub use store::{FrozenTypedValueStore, ImmutableTypedValueStore, ReadStore, TypedValueStore};
pub use version::SemanticVersion;
