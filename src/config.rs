use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::workflows::search::{DirectIdentifier, SearchLimits};

pub const DATASET_ENV: &str = "EPISODE_GRAPH_DATASET";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Local path or http(s) URL of the episodes database.
    pub dataset: String,
    pub identifier_pattern: String,
    pub link_template: String,
    pub debounce_ms: u64,
    pub retrieval_limit: usize,
    pub result_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: "episodes.db".to_string(),
            identifier_pattern: r"^tt\d+$".to_string(),
            link_template: "https://www.imdb.com/title/{id}/".to_string(),
            debounce_ms: 200,
            retrieval_limit: 100,
            result_limit: 15,
        }
    }
}

impl Settings {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            retrieval: self.retrieval_limit,
            results: self.result_limit,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn direct_identifier(&self) -> Result<DirectIdentifier> {
        DirectIdentifier::new(&self.identifier_pattern)
            .with_context(|| format!("Invalid identifier_pattern {:?}", self.identifier_pattern))
    }
}

pub fn load_settings(dataset_override: Option<String>) -> Result<Settings> {
    layer_settings(&get_config_path(), env::var(DATASET_ENV).ok(), dataset_override)
}

/// Config file first, then the environment, then an explicit override.
fn layer_settings(
    path: &Path,
    env_dataset: Option<String>,
    dataset_override: Option<String>,
) -> Result<Settings> {
    let mut settings = load_settings_from(path)?;
    if let Some(dataset) = dataset_override.or(env_dataset) {
        settings.dataset = dataset;
    }
    Ok(settings)
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(settings)
}

pub fn get_session_path() -> PathBuf {
    get_config_dir_path().join("session.json")
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("episode-graph"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.debounce(), Duration::from_millis(200));
        assert_eq!(settings.limits().retrieval, 100);
        assert_eq!(settings.limits().results, 15);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "dataset = \"https://example.org/episodes.db\"\nresult_limit = 5\n",
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.dataset, "https://example.org/episodes.db");
        assert_eq!(settings.result_limit, 5);
        assert_eq!(settings.retrieval_limit, 100);
        assert_eq!(settings.identifier_pattern, r"^tt\d+$");
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "result_limit = \"many\"").unwrap();
        assert!(load_settings_from(&path).is_err());
    }

    #[test]
    fn test_environment_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dataset = \"file.db\"\nresult_limit = 5\n").unwrap();

        let settings = layer_settings(&path, None, None).unwrap();
        assert_eq!(settings.dataset, "file.db");

        let settings = layer_settings(&path, Some("env.db".to_string()), None).unwrap();
        assert_eq!(settings.dataset, "env.db");
        assert_eq!(settings.result_limit, 5);
    }

    #[test]
    fn test_override_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dataset = \"file.db\"\n").unwrap();

        let settings = layer_settings(
            &path,
            Some("env.db".to_string()),
            Some("local.db".to_string()),
        )
        .unwrap();
        assert_eq!(settings.dataset, "local.db");

        let settings =
            layer_settings(&dir.path().join("missing.toml"), None, Some("local.db".to_string()))
                .unwrap();
        assert_eq!(settings.dataset, "local.db");
        assert_eq!(settings.result_limit, 15);
    }

    #[test]
    fn test_invalid_identifier_pattern() {
        let settings = Settings {
            identifier_pattern: "(".to_string(),
            ..Settings::default()
        };
        assert!(settings.direct_identifier().is_err());
    }
}
