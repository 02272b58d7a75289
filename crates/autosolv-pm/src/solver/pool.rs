use std::cmp::Ordering;
use std::collections::HashMap;

use autosolv_evr::Dependency;

use super::ArchPolicy;
use crate::package::Package;
use crate::repository::Repository;

/// Index of a package in the pool (0-based, stable for the pool's lifetime)
pub type PackageId = usize;

/// Repository origin of pool packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    /// Lower values win
    pub priority: i32,
}

/// Pool of all available packages for dependency resolution.
///
/// Packages are indexed by name, by provided capability (their implicit
/// `name = evr` provide included) and by file path. Dependency arrays can be
/// edited in place through the pool; provides and files cannot, which keeps
/// the indexes valid.
#[derive(Debug, Default)]
pub struct Pool {
    packages: Vec<Package>,

    /// Repository index of each package
    package_repos: Vec<Option<usize>>,

    repos: Vec<RepoInfo>,

    packages_by_name: HashMap<String, Vec<PackageId>>,

    /// Packages indexed by provided capability name
    providers: HashMap<String, Vec<PackageId>>,

    /// Packages indexed by owned file path
    file_providers: HashMap<String, Vec<PackageId>>,

    arch: ArchPolicy,
}

impl Pool {
    pub fn new(arch: ArchPolicy) -> Self {
        Self {
            arch,
            ..Default::default()
        }
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    pub fn arch(&self) -> &ArchPolicy {
        &self.arch
    }

    /// Register a repository without packages, returns its index
    pub fn add_repo_info(&mut self, name: &str, priority: i32) -> usize {
        self.repos.push(RepoInfo {
            name: name.to_string(),
            priority,
        });
        self.repos.len() - 1
    }

    /// Add a repository and all of its packages, returns its index
    pub fn add_repository(&mut self, repo: Repository) -> usize {
        let index = self.add_repo_info(&repo.name, repo.priority);
        let count = repo.packages.len();
        for package in repo.packages {
            self.insert(package, Some(index));
        }
        log::debug!("Added {} packages from repository {}", count, self.repos[index].name);
        index
    }

    /// Add a package that belongs to no repository
    pub fn add_package(&mut self, package: Package) -> PackageId {
        self.insert(package, None)
    }

    /// Add a package to a repository registered with [`Pool::add_repo_info`]
    pub fn add_package_to_repo(&mut self, package: Package, repo: usize) -> PackageId {
        let repo = if repo < self.repos.len() { Some(repo) } else { None };
        self.insert(package, repo)
    }

    fn insert(&mut self, package: Package, repo: Option<usize>) -> PackageId {
        let id = self.packages.len();

        self.packages_by_name
            .entry(package.name.clone())
            .or_default()
            .push(id);

        let mut names = vec![package.name.clone()];
        for provide in &package.provides {
            if !names.contains(&provide.name) {
                names.push(provide.name.clone());
            }
        }
        for name in names {
            self.providers.entry(name).or_default().push(id);
        }

        for file in &package.files {
            self.file_providers.entry(file.clone()).or_default().push(id);
        }

        self.packages.push(package);
        self.package_repos.push(repo);
        id
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id)
    }

    /// All packages with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages.iter().enumerate()
    }

    pub fn repositories(&self) -> &[RepoInfo] {
        &self.repos
    }

    pub fn repo_index(&self, id: PackageId) -> Option<usize> {
        self.package_repos.get(id).copied().flatten()
    }

    pub fn repo_name(&self, id: PackageId) -> Option<&str> {
        self.repo_index(id).map(|r| self.repos[r].name.as_str())
    }

    /// Priority of the package's repository, packages without one rank last
    pub fn repo_priority(&self, id: PackageId) -> i32 {
        self.repo_index(id)
            .map(|r| self.repos[r].priority)
            .unwrap_or(i32::MAX)
    }

    pub fn packages_by_name(&self, name: &str) -> &[PackageId] {
        self.packages_by_name
            .get(name)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Every distinct package name
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages_by_name.keys().map(|n| n.as_str())
    }

    /// Every distinct capability name
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|n| n.as_str())
    }

    /// Every file path owned by a package
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.file_providers.keys().map(|n| n.as_str())
    }

    pub fn providers_of(&self, capability: &str) -> &[PackageId] {
        self.providers
            .get(capability)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn owners_of(&self, file: &str) -> &[PackageId] {
        self.file_providers
            .get(file)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Packages satisfying `dep`, in id order
    pub fn what_provides(&self, dep: &Dependency) -> Vec<PackageId> {
        let mut result: Vec<PackageId> = self
            .providers_of(&dep.name)
            .iter()
            .copied()
            .filter(|&id| self.packages[id].provides_dep(dep))
            .collect();

        if dep.is_file() {
            for &id in self.owners_of(&dep.name) {
                if !result.contains(&id) {
                    result.push(id);
                }
            }
            result.sort_unstable();
        }

        result
    }

    /// Packages with a requirement on `dep`'s name whose range overlaps it
    pub fn who_requires(&self, dep: &Dependency) -> Vec<PackageId> {
        self.iter()
            .filter(|(_, pkg)| pkg.requires.iter().any(|r| r.matches(dep)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Newer versions of the same name and architecture, oldest first
    pub fn newer_versions(&self, id: PackageId) -> Vec<PackageId> {
        let Some(base) = self.package(id) else {
            return Vec::new();
        };

        let mut newer: Vec<PackageId> = self
            .packages_by_name(&base.name)
            .iter()
            .copied()
            .filter(|&other| {
                let pkg = &self.packages[other];
                pkg.arch == base.arch && pkg.evr > base.evr
            })
            .collect();
        newer.sort_by(|&a, &b| self.evrcmp(a, b).then(a.cmp(&b)));
        newer
    }

    /// Closest newer version of the same name and architecture
    pub fn next_higher_version(&self, id: PackageId) -> Option<PackageId> {
        self.newer_versions(id).into_iter().next()
    }

    /// Same name and EVR on a better architecture
    pub fn better_arch_sibling(&self, id: PackageId) -> Option<PackageId> {
        let base = self.package(id)?;
        self.packages_by_name(&base.name)
            .iter()
            .copied()
            .filter(|&other| {
                let pkg = &self.packages[other];
                pkg.evr == base.evr && self.arch.is_better(&pkg.arch, &base.arch)
            })
            .min_by_key(|&other| self.arch.score(&self.packages[other].arch))
    }

    /// Compare two packages by EVR
    pub fn evrcmp(&self, a: PackageId, b: PackageId) -> Ordering {
        match (self.package(a), self.package(b)) {
            (Some(x), Some(y)) => x.evr.cmp(&y.evr),
            (x, y) => x.is_some().cmp(&y.is_some()),
        }
    }

    pub fn nevra(&self, id: PackageId) -> String {
        self.package(id)
            .map(|p| p.nevra())
            .unwrap_or_else(|| format!("<unknown package {}>", id))
    }

    /// Drop a requirement from a package, returns whether it was present
    pub fn remove_requires(&mut self, id: PackageId, dep: &Dependency) -> bool {
        self.packages
            .get_mut(id)
            .map(|p| p.remove_requires(dep))
            .unwrap_or(false)
    }

    /// Clear every conflicts entry of a package, returns how many were dropped
    pub fn clear_conflicts(&mut self, id: PackageId) -> usize {
        self.packages
            .get_mut(id)
            .map(|p| p.clear_conflicts())
            .unwrap_or(0)
    }

    /// Drop an obsoletes entry from a package, returns whether it was present
    pub fn remove_obsoletes(&mut self, id: PackageId, dep: &Dependency) -> bool {
        self.packages
            .get_mut(id)
            .map(|p| p.remove_obsoletes(dep))
            .unwrap_or(false)
    }

    /// Strip every conflicts and obsoletes declaration from the pool
    pub fn strip_conflicts_and_obsoletes(&mut self) -> usize {
        let mut stripped = 0;
        for package in &mut self.packages {
            stripped += package.conflicts.len() + package.obsoletes.len();
            package.conflicts.clear();
            package.obsoletes.clear();
        }
        stripped
    }
}

/// Builder for constructing a Pool from packages and repositories
#[derive(Debug, Default)]
pub struct PoolBuilder {
    pool: Pool,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arch(mut self, arch: ArchPolicy) -> Self {
        self.pool.arch = arch;
        self
    }

    pub fn add_package(mut self, package: Package) -> Self {
        self.pool.add_package(package);
        self
    }

    pub fn add_packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        for package in packages {
            self.pool.add_package(package);
        }
        self
    }

    pub fn add_repository(mut self, repo: Repository) -> Self {
        self.pool.add_repository(repo);
        self
    }

    pub fn build(self) -> Pool {
        self.pool
    }
}
