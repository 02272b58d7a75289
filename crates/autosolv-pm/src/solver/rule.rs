use std::fmt;

use autosolv_evr::Dependency;

use super::pool::{PackageId, Pool};

/// Which part of the problem space a rule comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Package dependency metadata
    Package,
    /// A job of the request
    Job,
    /// Architecture preference
    InferiorArch,
    Update,
    Best,
    /// Learned during search
    Learnt,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Package => "package",
            RuleKind::Job => "job",
            RuleKind::InferiorArch => "infarch",
            RuleKind::Update => "update",
            RuleKind::Best => "best",
            RuleKind::Learnt => "learnt",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a rule exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleInfoKind {
    /// Two versions of one name on the same architecture
    SameName,
    NothingProvides,
    /// Providers exist but none can be installed
    Requires,
    Conflicts,
    Obsoletes,
    NotInstallable,
    InferiorArch,
    /// A job contradicts another job
    JobConflict,
    JobNothingProvides,
    JobUnsupported,
}

impl RuleInfoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleInfoKind::SameName => "same-name",
            RuleInfoKind::NothingProvides => "nothing-provides",
            RuleInfoKind::Requires => "requires",
            RuleInfoKind::Conflicts => "conflicts",
            RuleInfoKind::Obsoletes => "obsoletes",
            RuleInfoKind::NotInstallable => "not-installable",
            RuleInfoKind::InferiorArch => "inferior-arch",
            RuleInfoKind::JobConflict => "job-conflict",
            RuleInfoKind::JobNothingProvides => "job-nothing-provides",
            RuleInfoKind::JobUnsupported => "job-unsupported",
        }
    }
}

impl fmt::Display for RuleInfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a rule: the implicated packages, dependency and job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleInfo {
    pub kind: RuleInfoKind,
    pub dependency: Option<Dependency>,
    pub package: Option<PackageId>,
    pub other_package: Option<PackageId>,
    /// Job position for job rules
    pub job: Option<usize>,
}

impl RuleInfo {
    pub fn new(kind: RuleInfoKind) -> Self {
        Self {
            kind,
            dependency: None,
            package: None,
            other_package: None,
            job: None,
        }
    }

    pub fn with_dependency(mut self, dep: Dependency) -> Self {
        self.dependency = Some(dep);
        self
    }

    pub fn with_package(mut self, id: PackageId) -> Self {
        self.package = Some(id);
        self
    }

    pub fn with_other_package(mut self, id: PackageId) -> Self {
        self.other_package = Some(id);
        self
    }

    pub fn with_job(mut self, position: usize) -> Self {
        self.job = Some(position);
        self
    }

    /// Implicated packages, `package` first
    pub fn packages(&self) -> Vec<PackageId> {
        self.package.into_iter().chain(self.other_package).collect()
    }

    /// Human-readable description
    pub fn describe(&self, pool: &Pool) -> String {
        let package = self.package.map(|id| pool.nevra(id)).unwrap_or_else(|| "unknown".to_string());
        let other = self.other_package.map(|id| pool.nevra(id)).unwrap_or_else(|| "unknown".to_string());
        let dep = self.dependency.as_ref().map(|d| d.to_string()).unwrap_or_else(|| "unknown".to_string());

        match self.kind {
            RuleInfoKind::SameName => format!("cannot install both {} and {}", package, other),
            RuleInfoKind::NothingProvides => format!("nothing provides {} needed by {}", dep, package),
            RuleInfoKind::Requires => match self.other_package {
                Some(_) => format!(
                    "package {} requires {}, but none of the providers can be installed alongside {}",
                    package, dep, other
                ),
                None => format!("package {} requires {}, but none of the providers can be installed", package, dep),
            },
            RuleInfoKind::Conflicts => format!("package {} conflicts with {} provided by {}", package, dep, other),
            RuleInfoKind::Obsoletes => format!("package {} obsoletes {} provided by {}", package, dep, other),
            RuleInfoKind::NotInstallable => format!("package {} is not installable", package),
            RuleInfoKind::InferiorArch => format!("package {} has inferior architecture", package),
            RuleInfoKind::JobConflict => format!("conflicting requests for {}", package),
            RuleInfoKind::JobNothingProvides => format!("nothing provides requested {}", dep),
            RuleInfoKind::JobUnsupported => "unsupported request".to_string(),
        }
    }
}

/// A classified reason for a problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    kind: RuleKind,
    infos: Vec<RuleInfo>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            infos: Vec::new(),
        }
    }

    pub fn with_info(mut self, info: RuleInfo) -> Self {
        self.infos.push(info);
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn infos(&self) -> &[RuleInfo] {
        &self.infos
    }

    pub fn describe(&self, pool: &Pool) -> String {
        self.infos
            .iter()
            .map(|info| info.describe(pool))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
