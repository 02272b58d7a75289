//! Repository - a named set of packages loaded from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolvError};
use crate::package::{AdvisoryData, Package, PackageData};

/// Priority given to repositories that do not set one (lower wins)
pub const DEFAULT_PRIORITY: i32 = 99;

/// On-disk layout of a repository file
///
/// ```json
/// {
///     "name": "updates",
///     "priority": 10,
///     "packages": [
///         { "name": "bash", "evr": "5.0.7-1.fc30", "arch": "x86_64", "requires": ["glibc"] }
///     ],
///     "advisories": [
///         { "id": "FEDORA-2019-0001", "type": "security",
///           "collection": [{ "name": "bash", "evr": "5.0.7-1.fc30", "arch": "x86_64" }] }
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepositoryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default)]
    pub packages: Vec<PackageData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<AdvisoryData>,
}

/// A loaded repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub priority: i32,
    pub enabled: bool,
    pub packages: Vec<Package>,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PRIORITY,
            enabled: true,
            packages: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn add_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    /// Build a repository from parsed file contents, `fallback_name` is used
    /// when the file does not name itself.
    pub fn from_file(fallback_name: &str, file: &RepositoryFile) -> Result<Self> {
        let name = file.name.clone().unwrap_or_else(|| fallback_name.to_string());
        let mut repo = Repository::new(&name).with_priority(file.priority.unwrap_or(DEFAULT_PRIORITY));

        for (index, data) in file.packages.iter().enumerate() {
            let package = Package::try_from(data).map_err(|e| SolvError::InvalidRepository {
                name: name.clone(),
                message: format!("package {} ({}): {}", index, data.name, e),
            })?;
            repo.add_package(package);
        }
        for data in &file.advisories {
            let advisory = Package::try_from(data).map_err(|e| SolvError::InvalidRepository {
                name: name.clone(),
                message: format!("advisory {}: {}", data.id, e),
            })?;
            repo.add_package(advisory);
        }

        Ok(repo)
    }

    pub fn from_json_str(fallback_name: &str, json: &str) -> Result<Self> {
        let file: RepositoryFile = serde_json::from_str(json)?;
        Self::from_file(fallback_name, &file)
    }

    /// Load a repository file. Unnamed repositories take the file stem as
    /// their name.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let repo = Self::from_json_str(&stem, &content)?;
        log::debug!(
            "Loaded repository {} from {} ({} packages)",
            repo.name,
            path.display(),
            repo.packages.len()
        );
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str() {
        let repo = Repository::from_json_str(
            "fallback",
            r#"{
                "name": "fedora",
                "packages": [
                    {"name": "bash", "evr": "5.0.2-1.fc30", "arch": "x86_64"},
                    {"name": "glibc", "evr": "2.29-9.fc30", "arch": "x86_64"}
                ],
                "advisories": [
                    {"id": "FEDORA-2019-1", "collection": [{"name": "bash", "evr": "5.0.2-1.fc30", "arch": "x86_64"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(repo.name, "fedora");
        assert_eq!(repo.priority, DEFAULT_PRIORITY);
        assert_eq!(repo.len(), 3);
        assert!(repo.packages[2].is_advisory());
    }

    #[test]
    fn test_fallback_name_and_priority() {
        let repo = Repository::from_json_str("updates", r#"{"priority": 5, "packages": []}"#).unwrap();
        assert_eq!(repo.name, "updates");
        assert_eq!(repo.priority, 5);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_invalid_package_names_repository() {
        let err = Repository::from_json_str(
            "broken",
            r#"{"packages": [{"name": "a", "evr": "x:1"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("package 0 (a)"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Repository::from_json_str("x", "{not json"),
            Err(SolvError::JsonParse(_))
        ));
    }
}
