//! Dependency expressions (`name`, `name >= evr`)

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::evr::{Evr, EvrError};
use crate::operator::Operator;

lazy_static! {
    static ref VERSIONED_DEP_RE: Regex =
        Regex::new(r"^\s*(\S+?)\s*(<=|>=|=<|=>|==|=|<|>)\s*(\S+)\s*$").unwrap();
}

/// A requires/provides/conflicts/obsoletes entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    pub constraint: Option<(Operator, Evr)>,
}

impl Dependency {
    /// An unversioned dependency on `name`
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    /// A versioned dependency
    pub fn versioned(name: impl Into<String>, op: Operator, evr: Evr) -> Self {
        Self {
            name: name.into(),
            constraint: Some((op, evr)),
        }
    }

    /// Parse `name [op evr]`
    pub fn parse(input: &str) -> Result<Self, EvrError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EvrError::InvalidDependency(input.to_string()));
        }

        if let Some(caps) = VERSIONED_DEP_RE.captures(trimmed) {
            let op = Operator::parse(&caps[2])
                .map_err(|_| EvrError::InvalidDependency(input.to_string()))?;
            let evr = Evr::parse(&caps[3])?;
            return Ok(Self::versioned(&caps[1], op, evr));
        }

        if trimmed.contains(char::is_whitespace) && !trimmed.starts_with('(') {
            return Err(EvrError::InvalidDependency(input.to_string()));
        }
        Ok(Self::name(trimmed))
    }

    pub fn is_versioned(&self) -> bool {
        self.constraint.is_some()
    }

    /// File dependencies start with `/`
    pub fn is_file(&self) -> bool {
        self.name.starts_with('/')
    }

    /// `rpmlib(...)` features are provided by rpm itself
    pub fn is_rpmlib(&self) -> bool {
        self.name.starts_with("rpmlib(")
    }

    pub fn evr(&self) -> Option<&Evr> {
        self.constraint.as_ref().map(|(_, evr)| evr)
    }

    /// Whether `provide` satisfies this dependency: same name and
    /// overlapping ranges. An unversioned side overlaps everything.
    pub fn matches(&self, provide: &Dependency) -> bool {
        self.name == provide.name && self.overlaps(provide)
    }

    /// Whether a package at `evr` satisfies the version range of this dependency.
    pub fn matches_evr(&self, evr: &Evr) -> bool {
        match self.constraint {
            None => true,
            Some((op, ref wanted)) => match evr.compare_loose(wanted) {
                Ordering::Less => op.has_less(),
                Ordering::Equal => op.has_equal(),
                Ordering::Greater => op.has_greater(),
            },
        }
    }

    /// Whether the version ranges intersect, ignoring names.
    pub fn overlaps(&self, other: &Dependency) -> bool {
        let (Some((op_a, evr_a)), Some((op_b, evr_b))) = (&self.constraint, &other.constraint) else {
            return true;
        };

        match evr_a.compare_loose(evr_b) {
            Ordering::Less => op_a.has_greater() || op_b.has_less(),
            Ordering::Greater => op_a.has_less() || op_b.has_greater(),
            Ordering::Equal => {
                (op_a.has_equal() && op_b.has_equal())
                    || (op_a.has_less() && op_b.has_less())
                    || (op_a.has_greater() && op_b.has_greater())
            }
        }
    }
}

impl FromStr for Dependency {
    type Err = EvrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dependency::parse(s)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Some((op, ref evr)) => write!(f, "{} {} {}", self.name, op, evr),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(s: &str) -> Dependency {
        Dependency::parse(s).unwrap()
    }

    #[test]
    fn test_parse() {
        let d = dep("glibc >= 2.28-1");
        assert_eq!(d.name, "glibc");
        assert_eq!(d.constraint, Some((Operator::GreaterEqual, Evr::parse("2.28-1").unwrap())));
        assert_eq!(d.to_string(), "glibc >= 2.28-1");

        let d = dep("libfoo.so.1()(64bit)");
        assert_eq!(d.name, "libfoo.so.1()(64bit)");
        assert!(!d.is_versioned());

        let d = dep("perl(Carp)>=1.2");
        assert_eq!(d.name, "perl(Carp)");
        assert_eq!(d.evr().unwrap().version, "1.2");

        assert!(dep("/usr/bin/sh").is_file());
        assert!(dep("rpmlib(CompressedFileNames) <= 3.0.4-1").is_rpmlib());
        assert!(Dependency::parse("two words").is_err());
    }

    #[test]
    fn test_matches_unversioned() {
        assert!(dep("a").matches(&dep("a = 1.0-1")));
        assert!(dep("a >= 2.0").matches(&dep("a")));
        assert!(!dep("a").matches(&dep("b")));
    }

    #[test]
    fn test_matches_ranges() {
        assert!(dep("a >= 2.0").matches(&dep("a = 2.0-1")));
        assert!(!dep("a >= 2.0").matches(&dep("a = 1.0-1")));
        assert!(dep("a < 2.0").matches(&dep("a = 1.9")));
        assert!(!dep("a < 2.0").matches(&dep("a = 2.0")));
        assert!(dep("a > 1.0").matches(&dep("a >= 0.5")));
        assert!(!dep("a > 1.0").matches(&dep("a <= 1.0")));
        assert!(dep("a = 1.0").matches(&dep("a = 1.0-3")));
    }

    #[test]
    fn test_matches_evr() {
        let d = dep("a >= 2.0");
        assert!(d.matches_evr(&Evr::parse("2.0-1").unwrap()));
        assert!(d.matches_evr(&Evr::parse("2.1-1").unwrap()));
        assert!(!d.matches_evr(&Evr::parse("1.0-1").unwrap()));
        assert!(dep("a").matches_evr(&Evr::parse("0.1").unwrap()));
    }
}
