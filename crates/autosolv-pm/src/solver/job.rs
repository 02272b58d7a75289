use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use autosolv_evr::Dependency;

use super::pool::{PackageId, Pool};
use crate::error::{Result, SolvError};

/// What a job asks the engine to do with its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    /// Neutralized slot, ignored by the engine
    Noop,
    Install,
    Update,
    Erase,
    Lock,
    /// Allow several versions of the target name side by side
    Multiversion,
}

impl JobAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "noop" => Some(JobAction::Noop),
            "install" => Some(JobAction::Install),
            "update" => Some(JobAction::Update),
            "erase" => Some(JobAction::Erase),
            "lock" => Some(JobAction::Lock),
            "multiversion" => Some(JobAction::Multiversion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Noop => "noop",
            JobAction::Install => "install",
            JobAction::Update => "update",
            JobAction::Erase => "erase",
            JobAction::Lock => "lock",
            JobAction::Multiversion => "multiversion",
        }
    }

    /// Install and update jobs put packages on the system
    pub fn is_install_like(&self) -> bool {
        matches!(self, JobAction::Install | JobAction::Update)
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier flags of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JobFlags(u8);

impl JobFlags {
    /// Problems caused by the job are ignored
    pub const WEAK: JobFlags = JobFlags(1);
    pub const ESSENTIAL: JobFlags = JobFlags(1 << 1);
    /// Also remove dependencies no longer needed
    pub const CLEANDEPS: JobFlags = JobFlags(1 << 2);
    /// Only the best candidate may satisfy the job
    pub const FORCEBEST: JobFlags = JobFlags(1 << 3);
    /// The job names exact solvables
    pub const TARGETED: JobFlags = JobFlags(1 << 4);

    const NAMES: [(&'static str, JobFlags); 5] = [
        ("weak", JobFlags::WEAK),
        ("essential", JobFlags::ESSENTIAL),
        ("cleandeps", JobFlags::CLEANDEPS),
        ("forcebest", JobFlags::FORCEBEST),
        ("targeted", JobFlags::TARGETED),
    ];

    pub const fn empty() -> Self {
        JobFlags(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: JobFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: JobFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: JobFlags) {
        self.0 &= !other.0;
    }

    /// Look up a modifier by name
    pub fn parse(name: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// Names of the set modifiers
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, f)| self.contains(*f))
            .map(|(n, _)| *n)
            .collect()
    }
}

impl BitOr for JobFlags {
    type Output = JobFlags;

    fn bitor(self, rhs: JobFlags) -> JobFlags {
        JobFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for JobFlags {
    fn bitor_assign(&mut self, rhs: JobFlags) {
        self.insert(rhs);
    }
}

/// The packages a job refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobTarget {
    Solvable(PackageId),
    /// Any one of the listed solvables
    OneOf(Vec<PackageId>),
    /// Every package of a name
    Name(String),
    /// Every provider of a dependency
    Provides(Dependency),
}

/// A resolver work item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub action: JobAction,
    pub flags: JobFlags,
    pub target: JobTarget,
}

impl Job {
    pub fn new(action: JobAction, target: JobTarget) -> Self {
        Self {
            action,
            flags: JobFlags::empty(),
            target,
        }
    }

    /// Targeted install of one solvable
    pub fn install(id: PackageId) -> Self {
        Self::new(JobAction::Install, JobTarget::Solvable(id)).with_flags(JobFlags::TARGETED)
    }

    pub fn multiversion(name: impl Into<String>) -> Self {
        Self::new(JobAction::Multiversion, JobTarget::Name(name.into()))
    }

    pub fn with_flags(mut self, flags: JobFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The same target with the action cleared
    pub fn to_noop(&self) -> Self {
        Self {
            action: JobAction::Noop,
            flags: JobFlags::empty(),
            target: self.target.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.action != JobAction::Noop
    }

    pub fn is_weak(&self) -> bool {
        self.flags.contains(JobFlags::WEAK)
    }

    /// Candidate packages of the target, in a stable order
    pub fn solvables(&self, pool: &Pool) -> Vec<PackageId> {
        match &self.target {
            JobTarget::Solvable(id) => pool.package(*id).map(|_| vec![*id]).unwrap_or_default(),
            JobTarget::OneOf(ids) => ids.iter().copied().filter(|&id| pool.package(id).is_some()).collect(),
            JobTarget::Name(name) => pool.packages_by_name(name).to_vec(),
            JobTarget::Provides(dep) => pool.what_provides(dep),
        }
    }

    /// The candidate when the target resolves to exactly one package
    pub fn single_solvable(&self, pool: &Pool) -> Option<PackageId> {
        match self.solvables(pool).as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// Human readable form, e.g. `install bash-5.0.2-1.fc30.x86_64`
    pub fn describe(&self, pool: &Pool) -> String {
        let target = match &self.target {
            JobTarget::Solvable(id) => pool.nevra(*id),
            JobTarget::OneOf(ids) => {
                let names: Vec<String> = ids.iter().map(|&id| pool.nevra(id)).collect();
                format!("one of {}", names.join(", "))
            }
            JobTarget::Name(name) => format!("name {}", name),
            JobTarget::Provides(dep) => format!("a package providing {}", dep),
        };
        format!("{} {}", self.action, target)
    }
}

/// Ordered job list.
///
/// Positions stay valid for the whole remediation of a round: jobs are
/// neutralized or replaced in place and new jobs are appended. Only
/// [`JobList::compact`] renumbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobList {
    jobs: Vec<Job>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job, returns its position
    pub fn push(&mut self, job: Job) -> usize {
        self.jobs.push(job);
        self.jobs.len() - 1
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Job> {
        self.jobs.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().enumerate()
    }

    /// Non-neutralized jobs with their positions
    pub fn active(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.iter().filter(|(_, job)| job.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn is_active(&self, position: usize) -> bool {
        self.get(position).map(|j| j.is_active()).unwrap_or(false)
    }

    pub fn contains(&self, job: &Job) -> bool {
        self.jobs.contains(job)
    }

    /// Turn the job at `position` into a no-op
    pub fn neutralize(&mut self, position: usize) -> Result<()> {
        let job = self
            .jobs
            .get_mut(position)
            .ok_or(SolvError::InvalidJobPosition(position))?;
        job.action = JobAction::Noop;
        job.flags = JobFlags::empty();
        Ok(())
    }

    /// Replace the job at `position`, returns the previous one
    pub fn replace(&mut self, position: usize, job: Job) -> Result<Job> {
        let slot = self
            .jobs
            .get_mut(position)
            .ok_or(SolvError::InvalidJobPosition(position))?;
        Ok(std::mem::replace(slot, job))
    }

    /// Drop neutralized slots, returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.is_active());
        before - self.jobs.len()
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.jobs
    }

    /// Render every job, one per line, for logging
    pub fn describe(&self, pool: &Pool) -> String {
        self.iter()
            .map(|(pos, job)| format!("{:>4}: {}", pos, job.describe(pool)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<Job>> for JobList {
    fn from(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }
}

impl FromIterator<Job> for JobList {
    fn from_iter<I: IntoIterator<Item = Job>>(iter: I) -> Self {
        Self {
            jobs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use autosolv_evr::Evr;

    fn pool() -> Pool {
        Pool::builder()
            .add_package(Package::new("a", Evr::parse("1.0-1").unwrap(), "x86_64"))
            .add_package(Package::new("a", Evr::parse("2.0-1").unwrap(), "x86_64"))
            .add_package(Package::new("b", Evr::parse("1.0-1").unwrap(), "noarch"))
            .build()
    }

    #[test]
    fn test_flags() {
        let mut flags = JobFlags::WEAK | JobFlags::CLEANDEPS;
        assert!(flags.contains(JobFlags::WEAK));
        assert!(!flags.contains(JobFlags::TARGETED));
        flags |= JobFlags::TARGETED;
        assert_eq!(flags.names(), vec!["weak", "cleandeps", "targeted"]);
        flags.remove(JobFlags::WEAK);
        assert!(!flags.contains(JobFlags::WEAK));

        assert_eq!(JobFlags::parse("forcebest"), Some(JobFlags::FORCEBEST));
        assert_eq!(JobFlags::parse("install"), None);
        assert!(JobFlags::empty().is_empty());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(JobAction::parse("erase"), Some(JobAction::Erase));
        assert_eq!(JobAction::parse("weak"), None);
        assert!(JobAction::Update.is_install_like());
        assert!(!JobAction::Lock.is_install_like());
    }

    #[test]
    fn test_solvables() {
        let pool = pool();
        assert_eq!(Job::install(1).solvables(&pool), vec![1]);
        assert!(Job::install(9).solvables(&pool).is_empty());
        assert_eq!(Job::multiversion("a").solvables(&pool), vec![0, 1]);

        let job = Job::new(JobAction::Install, JobTarget::OneOf(vec![0, 2, 9]));
        assert_eq!(job.solvables(&pool), vec![0, 2]);
        assert_eq!(job.single_solvable(&pool), None);

        let job = Job::new(
            JobAction::Install,
            JobTarget::Provides(Dependency::parse("a > 1.0-1").unwrap()),
        );
        assert_eq!(job.single_solvable(&pool), Some(1));
    }

    #[test]
    fn test_describe() {
        let pool = pool();
        assert_eq!(Job::install(0).describe(&pool), "install a-1.0-1.x86_64");
        assert_eq!(Job::multiversion("a").describe(&pool), "multiversion name a");
        assert_eq!(Job::install(2).to_noop().describe(&pool), "noop b-1.0-1.noarch");
    }

    #[test]
    fn test_neutralize_keeps_positions() {
        let mut jobs: JobList = vec![Job::install(0), Job::install(1), Job::install(2)].into();
        jobs.neutralize(1).unwrap();

        assert_eq!(jobs.len(), 3);
        assert!(!jobs.is_active(1));
        assert_eq!(jobs.active_count(), 2);
        assert_eq!(jobs.get(2), Some(&Job::install(2)));
        assert!(matches!(jobs.neutralize(5), Err(SolvError::InvalidJobPosition(5))));
    }

    #[test]
    fn test_replace_and_compact() {
        let mut jobs: JobList = vec![Job::install(0), Job::install(2)].into();
        let old = jobs.replace(0, Job::install(1)).unwrap();
        assert_eq!(old, Job::install(0));
        assert!(jobs.contains(&Job::install(1)));

        jobs.neutralize(0).unwrap();
        assert_eq!(jobs.compact(), 1);
        assert_eq!(jobs.as_slice(), &[Job::install(2)]);
        assert!(jobs.replace(3, Job::install(0)).is_err());
    }
}
