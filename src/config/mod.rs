//! Configuration management for ragdeck
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (document upload / processing / config API)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Chat completion API configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Chat proxy service configuration
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Chat completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Environment variable name holding the API key
    #[serde(default = "default_chat_api_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per reply
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    /// System prompt sent with every message
    #[serde(default = "default_chat_system_prompt")]
    pub system_prompt: String,
}

/// Chat proxy service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Bind host
    #[serde(default = "default_proxy_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for ragdeck data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            chat: ChatConfig::default(),
            proxy: ProxyConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_chat_api_key_env(),
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            temperature: default_chat_temperature(),
            max_tokens: default_chat_max_tokens(),
            system_prompt: default_chat_system_prompt(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
        }
    }
}

impl Config {
    /// Get the default base directory for ragdeck (~/.ragdeck)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ragdeck")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_config_path())
    }

    /// Load configuration from a specific base directory, falling back to
    /// defaults when no config file exists there yet
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the chat API key from environment
    pub fn chat_api_key(&self) -> Option<String> {
        std::env::var(&self.chat.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.backend_url)
            .map_err(|e| Error::Config(format!("Invalid backend_url: {}", e)))?;

        url::Url::parse(&self.chat.base_url)
            .map_err(|e| Error::Config(format!("Invalid chat.base_url: {}", e)))?;

        if self.chat.api_key_env.is_empty() {
            return Err(Error::Config(
                "chat.api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.chat.model.is_empty() {
            return Err(Error::Config("chat.model must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(Error::Config(
                "chat.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.chat.max_tokens == 0 {
            return Err(Error::Config(
                "chat.max_tokens must be positive".to_string(),
            ));
        }

        if self.proxy.host.is_empty() {
            return Err(Error::Config("proxy.host must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert_eq!(config.chat.model, "llama-3.1-8b-instant");
        assert_eq!(config.chat.max_tokens, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.backend_url = "http://10.0.0.5:8000".to_string();

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.backend_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let loaded = Config::load_from(Some(tmp.path().join("nope"))).unwrap();
        assert_eq!(loaded.backend_url, default_backend_url());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.chat.temperature = 3.0;
        assert!(config.validate().is_err());

        config.chat.temperature = 0.7;
        assert!(config.validate().is_ok());

        config.chat.max_tokens = 0;
        assert!(config.validate().is_err());

        config.chat.max_tokens = 1024;
        config.backend_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("backend_url = \"http://backend:9000\"").unwrap();
        assert_eq!(parsed.backend_url, "http://backend:9000");
        assert_eq!(parsed.chat.api_key_env, "GROQ_API_KEY");
        assert_eq!(parsed.proxy.port, default_proxy_port());
    }
}
