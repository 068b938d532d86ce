//! Configuration loading.
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/voxpop/` on Linux). A missing file is not an error; every
//! field has a default. The API key can always be supplied through the
//! environment instead, which takes precedence over the file.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::RwLock;
use voxpop_core::error::{Result, VoxError};

/// Primary environment variable for the Gemini API key.
pub const ENV_API_KEY: &str = "VOXPOP_GEMINI_API_KEY";
/// Fallback variable honored for compatibility with other Google tools.
pub const FALLBACK_ENV_API_KEY: &str = "GOOGLE_API_KEY";

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Overrides the number of follow-up probes per primary question.
    #[serde(default)]
    pub follow_up_limit: Option<usize>,
    /// Caps the conversation turns replayed to the provider.
    #[serde(default)]
    pub context_window: Option<usize>,
}

/// Loads and caches the configuration file.
pub struct ConfigService {
    path: PathBuf,
    cached: RwLock<Option<Config>>,
}

impl ConfigService {
    /// Uses the platform default config path.
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| VoxError::config("platform config directory is not available"))?;
        Ok(Self::with_path(base.join("voxpop").join("config.toml")))
    }

    /// Uses an explicit config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// Loads the configuration, reading the file at most once.
    pub fn load(&self) -> Result<Config> {
        if let Some(config) = self
            .cached
            .read()
            .map_err(|_| VoxError::internal("config cache lock poisoned"))?
            .clone()
        {
            return Ok(config);
        }

        let config = self.read_file()?;
        *self
            .cached
            .write()
            .map_err(|_| VoxError::internal("config cache lock poisoned"))? = Some(config.clone());
        Ok(config)
    }

    /// Resolves the Gemini API key: environment first, then the file.
    pub fn api_key(&self) -> Result<String> {
        for var in [ENV_API_KEY, FALLBACK_ENV_API_KEY] {
            if let Ok(key) = std::env::var(var)
                && !key.trim().is_empty()
            {
                return Ok(key);
            }
        }
        self.load()?.gemini_api_key.ok_or_else(|| {
            VoxError::config(format!(
                "no Gemini API key: set {ENV_API_KEY} or add gemini_api_key to {}",
                self.path.display()
            ))
        })
    }

    fn read_file(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(
                target: "config",
                path = %self.path.display(),
                "no config file, using defaults"
            );
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        toml::from_str(&raw).map_err(|err| {
            VoxError::config(format!("invalid config {}: {err}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let service = ConfigService::with_path("/nonexistent/voxpop/config.toml");
        let config = service.load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_are_loaded_and_cached() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gemini_api_key = \"test-key\"\nfollow_up_limit = 3\ncontext_window = 12"
        )
        .unwrap();

        let service = ConfigService::with_path(file.path());
        let config = service.load().unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("test-key"));
        assert_eq!(config.follow_up_limit, Some(3));
        assert_eq!(config.context_window, Some(12));

        // The cache survives the file going away.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
        assert_eq!(service.load().unwrap().gemini_api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gemini_api_key = [not toml").unwrap();

        let service = ConfigService::with_path(file.path());
        assert!(matches!(service.load(), Err(VoxError::Config(_))));
    }
}
