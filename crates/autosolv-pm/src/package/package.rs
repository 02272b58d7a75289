use autosolv_evr::{Dependency, Evr, Operator};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Advisory;

/// Kind of solvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Regular binary package
    #[default]
    Rpm,
    /// Update advisory (errata) carrying a package collection
    Advisory,
}

/// A solvable: a binary package or an advisory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub evr: Evr,
    pub arch: String,
    pub kind: PackageKind,
    pub summary: Option<String>,

    pub requires: Vec<Dependency>,
    pub provides: Vec<Dependency>,
    pub conflicts: Vec<Dependency>,
    pub obsoletes: Vec<Dependency>,
    pub files: Vec<String>,

    /// Build time in seconds since the epoch
    pub buildtime: i64,
    /// Installed size in bytes
    pub install_size: u64,

    /// Set for [`PackageKind::Advisory`] solvables
    pub advisory: Option<Advisory>,
}

impl Package {
    pub fn new(name: impl Into<String>, evr: Evr, arch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evr,
            arch: arch.into(),
            kind: PackageKind::Rpm,
            summary: None,
            requires: Vec::new(),
            provides: Vec::new(),
            conflicts: Vec::new(),
            obsoletes: Vec::new(),
            files: Vec::new(),
            buildtime: 0,
            install_size: 0,
            advisory: None,
        }
    }

    /// Advisories are named after their id and carry the `noarch` arch
    pub fn new_advisory(id: impl Into<String>, evr: Evr, advisory: Advisory) -> Self {
        let mut package = Self::new(id, evr, "noarch");
        package.kind = PackageKind::Advisory;
        package.advisory = Some(advisory);
        package
    }

    pub fn is_advisory(&self) -> bool {
        self.kind == PackageKind::Advisory
    }

    /// `name-evr.arch`
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.evr, self.arch)
    }

    /// `name-evr`
    pub fn nevr(&self) -> String {
        format!("{}-{}", self.name, self.evr)
    }

    /// `name.arch`
    pub fn name_arch(&self) -> String {
        format!("{}.{}", self.name, self.arch)
    }

    /// The implicit `name = evr` provide
    pub fn self_provide(&self) -> Dependency {
        Dependency::versioned(&self.name, Operator::Equal, self.evr.clone())
    }

    /// Whether this package satisfies `dep`, through its own name or an
    /// explicit provide. File dependencies are matched against the file list.
    pub fn provides_dep(&self, dep: &Dependency) -> bool {
        if dep.name == self.name && dep.matches_evr(&self.evr) {
            return true;
        }
        if self.provides.iter().any(|p| dep.matches(p)) {
            return true;
        }
        dep.is_file() && self.files.iter().any(|f| *f == dep.name)
    }

    /// First conflicts entry that `other` satisfies
    pub fn conflict_against(&self, other: &Package) -> Option<&Dependency> {
        if other.name == self.name {
            return None;
        }
        self.conflicts.iter().find(|c| other.provides_dep(c))
    }

    /// First obsoletes entry matching `other` by name and version
    pub fn obsoletes_against(&self, other: &Package) -> Option<&Dependency> {
        if other.name == self.name {
            return None;
        }
        self.obsoletes
            .iter()
            .find(|o| o.name == other.name && o.matches_evr(&other.evr))
    }

    /// Drop requirement entries equal to `dep`, returns whether any was removed
    pub fn remove_requires(&mut self, dep: &Dependency) -> bool {
        let before = self.requires.len();
        self.requires.retain(|r| r != dep);
        self.requires.len() != before
    }

    /// Drop obsoletes entries equal to `dep`, returns whether any was removed
    pub fn remove_obsoletes(&mut self, dep: &Dependency) -> bool {
        let before = self.obsoletes.len();
        self.obsoletes.retain(|o| o != dep);
        self.obsoletes.len() != before
    }

    pub fn clear_conflicts(&mut self) -> usize {
        let count = self.conflicts.len();
        self.conflicts.clear();
        count
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nevra())
    }
}
