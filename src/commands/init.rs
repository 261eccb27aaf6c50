//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write the default configuration file
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();

    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    config.paths.base_dir = base.clone();
    config.paths.config_file = base.join("config.toml");

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.base_dir.display().to_string(),
        ));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    Ok(config)
}

/// Print the post-init summary and next steps
pub fn print_init_result(config: &Config) {
    println!("✓ Initialized ragdeck at {:?}", config.paths.base_dir);
    println!("\nConfiguration: {:?}", config.paths.config_file);
    println!("Backend URL: {}", config.backend_url);
    println!("\nNext steps:");
    println!("  1. Edit the config file if your backend runs elsewhere");
    println!(
        "  2. Export {} for the chat commands",
        config.chat.api_key_env
    );
    println!("  ragdeck upload ./report.pdf --watch   # Upload and follow processing");
    println!("  ragdeck files                         # List known documents");
    println!("  ragdeck chat \"summarize my setup\"     # Talk to the assistant");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();
        assert!(config.paths.config_file.exists());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));

        cmd_init(Some(tmp.path().to_path_buf()), true).await.unwrap();
    }
}
