//! Epoch, version and release triple

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::comparator::rpmvercmp;

/// Error type for EVR parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvrError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid epoch \"{epoch}\" in \"{evr}\"")]
    InvalidEpoch { evr: String, epoch: String },
    #[error("Invalid dependency \"{0}\"")]
    InvalidDependency(String),
}

/// An RPM `[epoch:]version[-release]`.
///
/// The total order compares epoch, version and release in that order, a
/// missing release sorting before any release. Dependency matching uses
/// [`Evr::compare_loose`] instead, which ignores the release when either
/// side lacks one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Evr {
    pub epoch: u32,
    pub version: String,
    pub release: Option<String>,
}

impl Evr {
    pub fn new(epoch: u32, version: impl Into<String>, release: Option<String>) -> Self {
        Self {
            epoch,
            version: version.into(),
            release,
        }
    }

    /// Parse `[epoch:]version[-release]`
    pub fn parse(input: &str) -> Result<Self, EvrError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EvrError::InvalidVersion(input.to_string()));
        }

        let (epoch, rest) = match trimmed.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = if epoch.is_empty() {
                    0
                } else {
                    epoch.parse::<u32>().map_err(|_| EvrError::InvalidEpoch {
                        evr: input.to_string(),
                        epoch: epoch.to_string(),
                    })?
                };
                (epoch, rest)
            }
            None => (0, trimmed),
        };

        let (version, release) = match rest.rsplit_once('-') {
            Some((version, release)) if !release.is_empty() => (version, Some(release.to_string())),
            Some((version, _)) => (version, None),
            None => (rest, None),
        };

        if version.is_empty() || version.contains(char::is_whitespace) {
            return Err(EvrError::InvalidVersion(input.to_string()));
        }

        Ok(Self::new(epoch, version, release))
    }

    /// Compare ignoring the release when either side has none.
    pub fn compare_loose(&self, other: &Evr) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => rpmvercmp(a, b),
                _ => Ordering::Equal,
            })
    }
}

impl Ord for Evr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => rpmvercmp(a, b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for Evr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Evr {
    type Err = EvrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Evr::parse(s)
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}
