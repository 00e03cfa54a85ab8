use super::schema::WaymarkConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WAYMARK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// `$WAYMARK_CONFIG` when set (it must exist), otherwise the first
    /// existing file among [`ConfigLoader::search_paths`], otherwise defaults.
    pub async fn load_default() -> Result<WaymarkConfig, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            debug!("Using config from {}", CONFIG_ENV);
            return Self::load_from(Path::new(&path)).await;
        }
        Self::load_first(&Self::search_paths(dirs::home_dir())).await
    }

    /// `./waymark.yaml`, then `<home>/.waymark/config.yaml`.
    pub fn search_paths(home: Option<PathBuf>) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./waymark.yaml")];
        if let Some(home) = home {
            paths.push(home.join(".waymark").join("config.yaml"));
        }
        paths
    }

    /// Load the first candidate that exists; defaults when none does.
    pub async fn load_first(candidates: &[PathBuf]) -> Result<WaymarkConfig, ConfigError> {
        for path in candidates {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                debug!("Loading config from {}", path.display());
                return Self::load_from(path).await;
            }
        }
        debug!("No config file found, using defaults");
        Ok(WaymarkConfig::default())
    }

    /// An empty file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<WaymarkConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(WaymarkConfig::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}
