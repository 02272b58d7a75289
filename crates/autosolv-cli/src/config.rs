use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file searched for
pub const CONFIG_FILE: &str = "autosolv.toml";

fn default_priority() -> i32 {
    autosolv_pm::repository::DEFAULT_PRIORITY
}

fn default_enabled() -> bool {
    true
}

/// The autosolv configuration file structure (autosolv.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AutosolvConfig {
    /// Base architecture of the target system
    pub basearch: Option<String>,

    /// Release version substituted for `$releasever`
    pub releasever: Option<String>,

    /// Directory of repository JSON files
    pub repodir: Option<PathBuf>,

    /// Directory receiving data.json
    pub exportdir: Option<PathBuf>,

    /// Make every job weak
    pub weak: Option<bool>,

    /// Round cap of the conflict resolver
    pub max_rounds: Option<usize>,

    /// Report requests for packages with a better-arch build
    pub infarch_check: Option<bool>,

    /// Explicitly configured repositories
    #[serde(rename = "repo")]
    pub repos: Vec<RepoConfig>,

    /// Directory holding the configuration file, relative paths start here
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// A `[[repo]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    pub name: String,

    /// Path of the repository JSON file, may contain `$releasever` and `$basearch`
    pub path: String,

    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RepoConfig {
    /// Substitute `$releasever`/`$basearch` and anchor relative paths at `base_dir`
    pub fn resolve_path(&self, releasever: &str, basearch: &str, base_dir: &Path) -> PathBuf {
        let path = PathBuf::from(
            self.path
                .replace("$releasever", releasever)
                .replace("$basearch", basearch),
        );
        if path.is_relative() {
            base_dir.join(path)
        } else {
            path
        }
    }
}

impl AutosolvConfig {
    /// Load a specific configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: AutosolvConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Load configuration from autosolv.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load_file(&config_path).map(Some);
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Load configuration by searching upward from the current working directory
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: AutosolvConfig = toml::from_str("").unwrap();
        assert!(config.basearch.is_none());
        assert!(config.repos.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
basearch = "aarch64"
releasever = "31"
repodir = "repos"
weak = true
max_rounds = 50
infarch_check = true

[[repo]]
name = "fedora"
path = "mirror/$releasever/$basearch/fedora.json"

[[repo]]
name = "testing"
path = "/srv/testing.json"
priority = 10
enabled = false
"#;
        let config: AutosolvConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.basearch.as_deref(), Some("aarch64"));
        assert_eq!(config.max_rounds, Some(50));
        assert_eq!(config.weak, Some(true));
        assert_eq!(config.repos.len(), 2);
        assert_eq!(config.repos[0].priority, 99);
        assert!(config.repos[0].enabled);
        assert_eq!(config.repos[1].priority, 10);
        assert!(!config.repos[1].enabled);
    }

    #[test]
    fn test_repo_path_substitution() {
        let repo = RepoConfig {
            name: "fedora".to_string(),
            path: "mirror/$releasever/$basearch/fedora.json".to_string(),
            priority: 99,
            enabled: true,
        };
        assert_eq!(
            repo.resolve_path("30", "x86_64", Path::new("/etc/autosolv")),
            PathBuf::from("/etc/autosolv/mirror/30/x86_64/fedora.json")
        );

        let absolute = RepoConfig {
            path: "/srv/$basearch.json".to_string(),
            ..repo
        };
        assert_eq!(
            absolute.resolve_path("30", "i686", Path::new("/etc/autosolv")),
            PathBuf::from("/srv/i686.json")
        );
    }

    #[test]
    fn test_load_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "releasever = \"31\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = AutosolvConfig::load(&nested).unwrap().unwrap();
        assert_eq!(config.releasever.as_deref(), Some("31"));
        assert_eq!(config.base_dir, dir.path());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_rounds = \"many\"\n").unwrap();

        let err = AutosolvConfig::load_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
