use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::pool::{PackageId, Pool};

/// Policy for selecting between candidate packages.
///
/// When multiple packages can satisfy a job or requirement, the policy
/// determines which one to try first.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Prefer lowest versions
    pub prefer_lowest: bool,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Candidates sorted by preference, best first.
    ///
    /// Within a name: best architecture, then highest version (lowest when
    /// `prefer_lowest`), then repository priority. Across names: repository
    /// priority, then name. Pool order breaks remaining ties.
    pub fn select_preferred(&self, pool: &Pool, candidates: &[PackageId]) -> Vec<PackageId> {
        if candidates.is_empty() {
            return Vec::new();
        }

        // BTreeMap keeps the name order deterministic
        let mut by_name: BTreeMap<&str, Vec<PackageId>> = BTreeMap::new();
        for &id in candidates {
            if let Some(pkg) = pool.package(id) {
                let group = by_name.entry(pkg.name.as_str()).or_default();
                if !group.contains(&id) {
                    group.push(id);
                }
            }
        }

        let mut groups: Vec<Vec<PackageId>> = by_name
            .into_values()
            .map(|mut group| {
                group.sort_by(|&a, &b| self.compare_versions(pool, a, b));
                group
            })
            .collect();

        // Stable sort keeps the name order among equal priorities
        groups.sort_by_key(|group| pool.repo_priority(group[0]));
        groups.into_iter().flatten().collect()
    }

    /// Best candidate, if any
    pub fn best(&self, pool: &Pool, candidates: &[PackageId]) -> Option<PackageId> {
        self.select_preferred(pool, candidates).into_iter().next()
    }

    fn compare_versions(&self, pool: &Pool, a: PackageId, b: PackageId) -> Ordering {
        let (Some(pa), Some(pb)) = (pool.package(a), pool.package(b)) else {
            return a.cmp(&b);
        };

        let arch = pool.arch();
        let worst = usize::MAX;
        let arch_order = arch
            .score(&pa.arch)
            .unwrap_or(worst)
            .cmp(&arch.score(&pb.arch).unwrap_or(worst));

        let version_order = if self.prefer_lowest {
            pa.evr.cmp(&pb.evr)
        } else {
            pb.evr.cmp(&pa.evr)
        };

        arch_order
            .then(version_order)
            .then_with(|| pool.repo_priority(a).cmp(&pool.repo_priority(b)))
            .then(a.cmp(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use crate::repository::Repository;
    use autosolv_evr::Evr;

    fn pkg(name: &str, evr: &str, arch: &str) -> Package {
        Package::new(name, Evr::parse(evr).unwrap(), arch)
    }

    #[test]
    fn test_prefers_highest_version() {
        let pool = Pool::builder()
            .add_package(pkg("a", "1.0-1", "x86_64"))
            .add_package(pkg("a", "2.0-1", "x86_64"))
            .add_package(pkg("a", "1.5-1", "x86_64"))
            .build();

        let policy = Policy::new();
        assert_eq!(policy.select_preferred(&pool, &[0, 1, 2]), vec![1, 2, 0]);
        assert_eq!(policy.best(&pool, &[0, 2]), Some(2));

        let lowest = Policy::new().prefer_lowest(true);
        assert_eq!(lowest.select_preferred(&pool, &[0, 1, 2]), vec![0, 2, 1]);
    }

    #[test]
    fn test_prefers_best_arch() {
        let pool = Pool::builder()
            .add_package(pkg("glibc", "2.30-1", "i686"))
            .add_package(pkg("glibc", "2.29-1", "x86_64"))
            .build();

        assert_eq!(Policy::new().select_preferred(&pool, &[0, 1]), vec![1, 0]);
    }

    #[test]
    fn test_repository_priority() {
        let mut fedora = Repository::new("fedora");
        fedora.add_package(pkg("a", "1.0-1", "noarch"));
        fedora.add_package(pkg("b", "1.0-1", "noarch"));
        let mut local = Repository::new("local").with_priority(1);
        local.add_package(pkg("a", "1.0-1", "noarch"));
        local.add_package(pkg("c", "1.0-1", "noarch"));

        let pool = Pool::builder().add_repository(fedora).add_repository(local).build();
        let policy = Policy::new();

        assert_eq!(policy.select_preferred(&pool, &[0, 2]), vec![2, 0]);
        assert_eq!(policy.select_preferred(&pool, &[1, 3]), vec![3, 1]);
        assert!(policy.select_preferred(&pool, &[]).is_empty());
    }
}
