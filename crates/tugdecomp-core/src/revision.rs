//! Dialect revisions of the bytecode instruction set.
//!
//! Call and argument encodings changed between interpreter releases, so every
//! decompilation session is parameterized by the [`Revision`] the bytecode was
//! produced by. Revisions are totally ordered: `3.10` sorts after `3.9`, which a
//! floating-point representation would get wrong.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dialect revision such as `3.6`.
///
/// Ordering is lexicographic on `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision {
    major: u8,
    minor: u8,
}

impl Revision {
    /// Last 2.x revision; gets the revision-independent table only.
    pub const V2_7: Self = Self::new(2, 7);
    pub const V3_0: Self = Self::new(3, 0);
    pub const V3_1: Self = Self::new(3, 1);
    /// First revision with the 3.x variadic call handler.
    pub const V3_2: Self = Self::new(3, 2);
    /// `yield from` appears.
    pub const V3_3: Self = Self::new(3, 3);
    pub const V3_4: Self = Self::new(3, 4);
    /// Coroutines, `await`, and the swapped variadic-call stack layout.
    pub const V3_5: Self = Self::new(3, 5);
    /// `CALL_FUNCTION_EX`, keyword-name tuples, formatted strings.
    pub const V3_6: Self = Self::new(3, 6);
    pub const V3_7: Self = Self::new(3, 7);
    pub const V3_8: Self = Self::new(3, 8);

    /// Create a revision from its major and minor numbers.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Major version number.
    #[must_use]
    pub fn major(self) -> u8 {
        self.major
    }

    /// Minor version number.
    #[must_use]
    pub fn minor(self) -> u8 {
        self.minor
    }

    /// Returns whether this revision is `other` or later.
    #[must_use]
    pub fn at_least(self, other: Revision) -> bool {
        self >= other
    }

    /// Returns whether this revision lies in the inclusive range `[low, high]`.
    #[must_use]
    pub fn within(self, low: Revision, high: Revision) -> bool {
        low <= self && self <= high
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a revision string is not of the form `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid revision '{input}', expected <major>.<minor> (e.g. 3.6)")]
pub struct ParseRevisionError {
    input: String,
}

impl FromStr for Revision {
    type Err = ParseRevisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRevisionError {
            input: s.to_string(),
        };
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        let major = major.parse::<u8>().map_err(|_| err())?;
        let minor = minor.parse::<u8>().map_err(|_| err())?;
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for Revision {
    type Error = ParseRevisionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Revision> for String {
    fn from(revision: Revision) -> Self {
        revision.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let r: Revision = "3.6".parse().unwrap();
        assert_eq!(r, Revision::V3_6);
        assert_eq!(r.to_string(), "3.6");
        assert_eq!(r.major(), 3);
        assert_eq!(r.minor(), 6);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("3".parse::<Revision>().is_err());
        assert!("three.six".parse::<Revision>().is_err());
        assert!("3.6.1".parse::<Revision>().is_err());
        assert!("".parse::<Revision>().is_err());
    }

    #[test]
    fn test_ordering_is_not_decimal() {
        let r310: Revision = "3.10".parse().unwrap();
        assert!(r310 > Revision::V3_8);
        assert!(Revision::V2_7 < Revision::V3_0);
        assert!(Revision::V3_5.at_least(Revision::V3_5));
        assert!(!Revision::V3_4.at_least(Revision::V3_5));
    }

    #[test]
    fn test_within_is_inclusive() {
        assert!(Revision::V3_2.within(Revision::V3_2, Revision::V3_4));
        assert!(Revision::V3_4.within(Revision::V3_2, Revision::V3_4));
        assert!(!Revision::V3_5.within(Revision::V3_2, Revision::V3_4));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Revision::V3_5).unwrap();
        assert_eq!(json, "\"3.5\"");
        let back: Revision = serde_json::from_str("\"3.7\"").unwrap();
        assert_eq!(back, Revision::V3_7);
        assert!(serde_json::from_str::<Revision>("\"x\"").is_err());
    }
}
