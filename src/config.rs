//! Host configuration: engine settings plus where the dataset lives.
//!
//! ```toml
//! [data]
//! path = "records.json"
//!
//! [search]
//! retrieval_timeout_ms = 2000
//!
//! [[search.collections]]
//! uid = "api::article.article"
//! strategy = "hybrid"
//! fields = [{ name = "title" }, { name = "content", weight = -50 }]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_search::SearchConfig;

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine configuration.
    pub search: SearchConfig,
    /// Dataset location.
    pub data: DataConfig,
}

/// Where records are loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON dataset file. Relative paths are resolved against the config
    /// file's directory.
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        if let (Some(data), Some(dir)) = (config.data.path.as_mut(), path.parent()) {
            if data.is_relative() {
                *data = dir.join(&*data);
            }
        }
        Ok(config)
    }

    /// Returns the default config file path: `~/.config/sift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("sift").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("sift")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/sift-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use sift_search::RetrievalStrategy;

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn from_file_resolves_relative_data_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [data]
            path = "records.json"

            [[search.collections]]
            uid = "api::article.article"
            strategy = "pre-filtering"
            fields = [{ name = "title" }]
            "#,
        )
        .expect("write");

        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.data.path, Some(dir.path().join("records.json")));
        assert_eq!(config.search.collections[0].strategy, RetrievalStrategy::PreFilter);
        assert_eq!(config.search.retrieval_timeout_ms, 5_000);
    }

    #[test]
    fn absolute_data_path_kept() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\npath = \"/srv/records.json\"\n").expect("write");

        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.data.path, Some(PathBuf::from("/srv/records.json")));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("sift"));
    }
}
