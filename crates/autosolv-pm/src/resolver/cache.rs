use autosolv_evr::Evr;
use indexmap::IndexMap;

use crate::solver::{Job, JobAction, JobList, PackageId, Pool};

/// A job holding a package, at the position it had when the cache was built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCacheEntry {
    pub position: usize,
    pub job: Job,
    pub package: PackageId,
}

impl JobCacheEntry {
    /// Whether the job at `position` is still the one that was cached
    pub fn is_live(&self, jobs: &JobList) -> bool {
        jobs.get(self.position) == Some(&self.job)
    }
}

/// Package name to the jobs holding a package of that name.
///
/// Rebuilt at the start of every remediation round. Neutralized and
/// `multiversion` jobs are not remediation targets and are left out.
#[derive(Debug, Clone, Default)]
pub struct JobCache {
    entries: IndexMap<String, Vec<JobCacheEntry>>,
}

impl JobCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, jobs: &JobList, pool: &Pool) {
        self.entries.clear();

        for (position, job) in jobs.active() {
            if job.action == JobAction::Multiversion {
                continue;
            }
            for id in job.solvables(pool) {
                let Some(pkg) = pool.package(id) else { continue };
                self.entries
                    .entry(pkg.name.clone())
                    .or_default()
                    .push(JobCacheEntry {
                        position,
                        job: job.clone(),
                        package: id,
                    });
            }
        }

        log::debug!("Job cache holds {} entries for {} names", self.len(), self.entries.len());
    }

    /// All entries for packages named `name`
    pub fn entries(&self, name: &str) -> &[JobCacheEntry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries whose package has exactly this name, EVR and architecture
    pub fn lookup(&self, pool: &Pool, name: &str, evr: &Evr, arch: &str) -> Vec<&JobCacheEntry> {
        self.entries(name)
            .iter()
            .filter(|entry| {
                pool.package(entry.package)
                    .map(|p| p.evr == *evr && p.arch == arch)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Entries holding the package `id`
    pub fn holding(&self, pool: &Pool, id: PackageId) -> Vec<&JobCacheEntry> {
        let Some(pkg) = pool.package(id) else {
            return Vec::new();
        };
        self.entries(&pkg.name)
            .iter()
            .filter(|entry| entry.package == id)
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
