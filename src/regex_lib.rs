//! Process-wide compiled regular expressions.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

static SEMANTIC_VERSION_REGEX: OnceLock<Regex> = OnceLock::new();
static ADDENDUM_REGEX: OnceLock<Regex> = OnceLock::new();

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static regex pattern is valid")
}

/// `MAJOR.MINOR.PATCH` with an optional `-addendum` of word characters.
///
/// Captures: 1 = major, 2 = minor, 3 = patch, 4 = addendum (if present).
pub fn semantic_version() -> &'static Regex {
    SEMANTIC_VERSION_REGEX
        .get_or_init(|| case_insensitive(r"^(\d+)\.(\d+)\.(\d+)(?:-(\w*))?$"))
}

/// A bare version addendum (word characters only, may be empty).
pub fn version_addendum() -> &'static Regex {
    ADDENDUM_REGEX.get_or_init(|| case_insensitive(r"^\w*$"))
}
