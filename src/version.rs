//! Semantic version value type.

use crate::error::{Error, Result};
use crate::regex_lib;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `MAJOR.MINOR.PATCH[-addendum]`.
///
/// Ordering compares the numeric parts first. For equal numbers a version
/// with an addendum sorts after the same version without one, and addenda
/// compare ordinally:
///
/// ```
/// use hostkit::SemanticVersion;
///
/// let plain: SemanticVersion = "1.2.3".parse().unwrap();
/// let tagged: SemanticVersion = "1.2.3-alpha".parse().unwrap();
/// assert!(tagged > plain);
/// assert!(plain > SemanticVersion::try_parse("1.2.2-zzz").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticVersion {
    // Field order drives the derived ordering.
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub addendum: Option<String>,
}

impl SemanticVersion {
    pub const ZERO: SemanticVersion = SemanticVersion::new(0, 0, 0);
    pub const MAX: SemanticVersion = SemanticVersion::new(u32::MAX, u32::MAX, u32::MAX);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            addendum: None,
        }
    }

    /// Parse, returning `None` instead of an error.
    pub fn try_parse(input: &str) -> Option<Self> {
        input.parse().ok()
    }

    /// Replace the addendum. It must consist of word characters only.
    pub fn with_addendum(mut self, addendum: impl Into<String>) -> Result<Self> {
        let addendum = addendum.into();
        if !regex_lib::version_addendum().is_match(&addendum) {
            return Err(Error::InvalidVersion(format!("{}-{}", self, addendum)));
        }
        self.addendum = Some(addendum);
        Ok(self)
    }

    pub fn without_addendum(mut self) -> Self {
        self.addendum = None;
        self
    }

    pub fn bump_major(&self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }

    pub fn bump_minor(&self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }

    pub fn bump_patch(&self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }
}

impl Default for SemanticVersion {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(input.to_string());
        let caps = regex_lib::semantic_version()
            .captures(input)
            .ok_or_else(invalid)?;

        // Digits only, so the one failure mode is overflow
        let number = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            addendum: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

impl TryFrom<&str> for SemanticVersion {
    type Error = Error;

    fn try_from(input: &str) -> Result<Self> {
        input.parse()
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(addendum) = &self.addendum {
            write!(f, "-{}", addendum)?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(input: &str) -> SemanticVersion {
        input.parse().unwrap()
    }

    #[test]
    fn test_parse_components() {
        let version = v("10.20.30-beta_gamma");
        assert_eq!((version.major, version.minor, version.patch), (10, 20, 30));
        assert_eq!(version.addendum.as_deref(), Some("beta_gamma"));
        assert_eq!(version.to_string(), "10.20.30-beta_gamma");
    }

    #[test]
    fn test_leading_zeroes_are_accepted() {
        assert_eq!(v("01.002.0003"), SemanticVersion::new(1, 2, 3));
    }

    #[test]
    fn test_invalid_inputs() {
        for input in ["1.2.3.4", "1.2", "abcd", "1.2.3-alpha-", "10.20.30-beta-a", "99999999999.0.0"] {
            let err = SemanticVersion::from_str(input).unwrap_err();
            assert!(matches!(err, Error::InvalidVersion(ref s) if s == input));
            assert!(SemanticVersion::try_parse(input).is_none());
        }
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("2.1.0") < v("2.2.0"));
        assert!(v("2.2.1") < v("2.2.2"));
        assert!(v("2.2.2") > v("2.2.1"));
        assert_eq!(v("1.1.1"), SemanticVersion::new(1, 1, 1));
        assert_ne!(v("1.1.1"), SemanticVersion::new(0, 1, 0));
    }

    #[test]
    fn test_addendum_sorts_after_plain() {
        assert!(v("1.2.3-alpha") > v("1.2.3"));
        assert!(v("1.2.3-alpha") < v("1.2.3-beta"));
        assert!(v("1.2.3-alpha") < v("1.2.4"));
    }

    #[test]
    fn test_bumps_reset_lower_parts() {
        let version = v("1.4.7-rc1");
        assert_eq!(version.bump_major(), SemanticVersion::new(2, 0, 0));
        assert_eq!(version.bump_minor(), SemanticVersion::new(1, 5, 0));
        assert_eq!(version.bump_patch(), SemanticVersion::new(1, 4, 8));
        assert_eq!(SemanticVersion::MAX.bump_patch(), SemanticVersion::MAX);
    }

    #[test]
    fn test_with_addendum_validates() {
        let tagged = SemanticVersion::new(1, 0, 0).with_addendum("rc2").unwrap();
        assert_eq!(tagged.to_string(), "1.0.0-rc2");
        assert!(SemanticVersion::ZERO.with_addendum("rc-2").is_err());
        assert_eq!(tagged.without_addendum(), SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn test_serde_as_string() {
        let yaml = serde_yaml::to_string(&v("3.1.4-pi")).unwrap();
        assert_eq!(yaml.trim(), "3.1.4-pi");

        let parsed: SemanticVersion = serde_yaml::from_str("\"0.9.0\"").unwrap();
        assert_eq!(parsed, SemanticVersion::new(0, 9, 0));
        assert!(serde_yaml::from_str::<SemanticVersion>("\"nope\"").is_err());
    }
}
