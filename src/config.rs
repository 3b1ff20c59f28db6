// Configuration loading for docview.
// TOML file with per-section defaults; CLI flags are applied on top in main.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::paths;
use crate::docs::links::RepoLayout;
use crate::error::{DocsError, Result};

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub docs: DocsConfig,
    pub log: LogConfig,
}

/// Where the guides are hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Documentation directory inside the repository.
    pub docs_path: String,
    /// Directory that `../` in a document points at. Defaults to the parent of `docs_path`.
    pub parent_path: Option<String>,
    pub api_base: String,
    pub raw_base: String,
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            owner: "clovalink".to_string(),
            repo: "clovalink".to_string(),
            branch: "main".to_string(),
            docs_path: "docs".to_string(),
            parent_path: None,
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Prefix for every cache key.
    pub namespace: String,
    /// Overrides the per-user cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 5 * 60,
            namespace: "docview".to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Guide opened when no slug is requested (matched case-insensitively).
    pub default_slug: String,
    /// Route under which documents are addressed.
    pub route_prefix: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            default_slug: "Home".to_string(),
            route_prefix: "/docs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; an explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match paths::config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Self::from_toml(&contents)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => Ok(Self::default()),
            Err(e) => Err(DocsError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| DocsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every request or cache read fail.
    pub fn validate(&self) -> Result<()> {
        let source = &self.source;
        if source.owner.trim().is_empty() || source.repo.trim().is_empty() {
            return Err(DocsError::Config(
                "source.owner and source.repo must be set".to_string(),
            ));
        }
        if source.branch.trim().is_empty() {
            return Err(DocsError::Config("source.branch must be set".to_string()));
        }
        for (name, base) in [("api_base", &source.api_base), ("raw_base", &source.raw_base)] {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(DocsError::Config(format!(
                    "source.{} must be an http(s) URL, got '{}'",
                    name, base
                )));
            }
        }
        if source.request_timeout_secs == 0 {
            return Err(DocsError::Config(
                "source.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(DocsError::Config(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache.namespace.trim().is_empty() {
            return Err(DocsError::Config("cache.namespace must be set".to_string()));
        }
        if !self.docs.route_prefix.starts_with('/') {
            return Err(DocsError::Config(format!(
                "docs.route_prefix must start with '/', got '{}'",
                self.docs.route_prefix
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Directory for cache entries: configured, or the per-user default.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache.dir.clone().or_else(paths::entries_dir)
    }

    /// Repository layout used to resolve links inside documents.
    pub fn layout(&self) -> RepoLayout {
        RepoLayout::new(
            &self.source.raw_base,
            &self.source.owner,
            &self.source.repo,
            &self.source.branch,
            &self.source.docs_path,
            self.source.parent_path.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.docs.default_slug, "Home");
        assert_eq!(
            config.layout().raw_content_base,
            "https://raw.githubusercontent.com/clovalink/clovalink/main"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [source]
            owner = "acme"
            docs_path = "docs/wiki"

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.source.owner, "acme");
        assert_eq!(config.source.repo, "clovalink");
        assert_eq!(config.source.docs_path, "docs/wiki");
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.namespace, "docview");
        assert_eq!(config.layout().parent_root, "docs");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_toml("[cache]\nttl_secs = 0\n").unwrap_err();
        assert!(matches!(err, DocsError::Config(_)));

        let err = Config::from_toml("[source]\nraw_base = \"ftp://host\"\n").unwrap_err();
        assert!(err.to_string().contains("raw_base"));

        let err = Config::from_toml("[docs]\nroute_prefix = \"docs\"\n").unwrap_err();
        assert!(err.to_string().contains("route_prefix"));

        let err = Config::from_toml("[source\nowner = 1").unwrap_err();
        assert!(matches!(err, DocsError::Config(_)));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[docs]\ndefault_slug = \"Overview\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.docs.default_slug, "Overview");

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(DocsError::Config(_))
        ));
    }
}
