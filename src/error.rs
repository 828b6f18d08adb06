// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Seeder '{0}' has already been added to this group")]
    #[diagnostic(
        code(hostkit::seeder::duplicate),
        help("A group runs its seeders concurrently, so each seeder may appear in it only once")
    )]
    DuplicateSeeder(String),

    #[error("Remainder seeders have already been collected")]
    #[diagnostic(
        code(hostkit::seeder::remainders_collected),
        help("Register explicit groups before calling collect_remaining or collect_remaining_as_one_group")
    )]
    RemaindersCollected,

    #[error("Seeder '{0}' cannot be constructed by the service provider")]
    #[diagnostic(
        code(hostkit::provider::unresolvable),
        help("Register a factory for the seeder on the container before collecting it")
    )]
    Unresolvable(String),

    #[error("Seeder '{seeder}' failed: {source}")]
    #[diagnostic(code(hostkit::seeder::failed))]
    SeederFailed {
        seeder: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to release scope for seeder '{seeder}': {source}")]
    #[diagnostic(code(hostkit::provider::scope_release))]
    ScopeRelease {
        seeder: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<Error>),

    #[error("Seeding error: {0}")]
    Seed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid seeding plan: {0}")]
    #[diagnostic(
        code(hostkit::config::validation),
        help("Run `hostkit plan check` for the resolved group layout")
    )]
    Validation(String),

    #[error("Invalid semantic version '{0}'")]
    #[diagnostic(
        code(hostkit::version::invalid),
        help("Versions look like 1.2.3 or 1.2.3-beta")
    )]
    InvalidVersion(String),

    #[error("Value for key '{key}' is a {actual}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Collapse a list of errors: `None` when empty, the error itself when
    /// there is exactly one, `Multiple` otherwise.
    pub fn aggregate(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Multiple(errors)),
        }
    }

    /// Whether this error (or any error it aggregates) is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled(_) => true,
            Error::SeederFailed { source, .. } | Error::ScopeRelease { source, .. } => {
                source.is_cancelled()
            }
            Error::Multiple(errors) => errors.iter().any(Error::is_cancelled),
            _ => false,
        }
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::DuplicateSeeder(name) => Some(format!(
                "Remove the second registration of '{}' or move it into a separate group.",
                name
            )),
            Error::RemaindersCollected => Some(
                "Remainder collection closes registration. Add explicit groups first, then collect remainders last."
                    .to_string(),
            ),
            Error::Unresolvable(name) => Some(format!(
                "Register '{}' on the container with ContainerBuilder::seeder before starting.",
                name
            )),
            Error::Config(msg) if msg.contains("Could not find") => None,
            Error::Config(_) | Error::Validation(_) => {
                Some("Validate your plan with: hostkit plan check".to_string())
            }
            Error::InvalidVersion(_) => {
                Some("Use MAJOR.MINOR.PATCH with an optional -addendum, e.g. 2.1.0-rc1".to_string())
            }
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
