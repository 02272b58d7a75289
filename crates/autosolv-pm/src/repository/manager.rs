use std::path::Path;

use super::Repository;
use crate::error::{Result, SolvError};
use crate::solver::{ArchPolicy, Pool};

/// Manages the configured repositories in load order
#[derive(Debug, Default)]
pub struct RepositoryManager {
    repositories: Vec<Repository>,
}

impl RepositoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repository(&mut self, repo: Repository) {
        self.repositories.push(repo);
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Load every `*.json` file of `dir`, in file name order
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let pattern = dir.join("*.json");
        let mut paths: Vec<_> = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| {
                SolvError::Config(format!("invalid repository directory {}: {}", dir.display(), e))
            })?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();

        for path in &paths {
            self.add_repository(Repository::load(path)?);
        }
        Ok(paths.len())
    }

    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    /// Build the package pool from every enabled repository
    pub fn into_pool(self, arch: ArchPolicy) -> Pool {
        let mut pool = Pool::new(arch);
        for repo in self.repositories {
            if !repo.enabled {
                log::info!("Skipping disabled repository {}", repo.name);
                continue;
            }
            pool.add_repository(repo);
        }
        pool
    }
}
