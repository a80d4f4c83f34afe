//! Entity version numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` entity version.
///
/// Minor bumps record attribute edits and additions; major bumps record a
/// structural removal. The two counters are independent integers, so
/// `0.9` is followed by `0.10`, not `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityVersion {
    pub major: u32,
    pub minor: u32,
}

impl EntityVersion {
    /// Version assigned on creation.
    pub const INITIAL: Self = Self { major: 0, minor: 1 };

    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    #[must_use]
    pub const fn next_minor(self) -> Self {
        Self::new(self.major, self.minor + 1)
    }

    #[must_use]
    pub const fn next_major(self) -> Self {
        Self::new(self.major + 1, 0)
    }

    /// Next version for an update, given the major/minor decision.
    #[must_use]
    pub const fn next(self, major_change: bool) -> Self {
        if major_change {
            self.next_major()
        } else {
            self.next_minor()
        }
    }
}

impl Default for EntityVersion {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for EntityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for EntityVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidVersion(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for EntityVersion {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityVersion> for String {
    fn from(version: EntityVersion) -> Self {
        version.to_string()
    }
}
