//! Status command implementation

use crate::api::BackendClient;
use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub backend_url: String,
    pub backend_reachable: bool,
    pub chat_model: String,
    pub chat_api_key_env: String,
    pub chat_api_key_present: bool,
}

/// Get system status
pub async fn cmd_status(config: &Config, client: &BackendClient) -> Result<StatusInfo> {
    info!("Getting status");

    let backend_reachable = client.health().await;

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        backend_url: config.backend_url.clone(),
        backend_reachable,
        chat_model: config.chat.model.clone(),
        chat_api_key_env: config.chat.api_key_env.clone(),
        chat_api_key_present: config.chat_api_key().is_some(),
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 ragdeck Status\n");
    println!("Configuration: {}", status.config_path);
    println!("\nBackend:");
    println!("  URL: {}", status.backend_url);
    let reachability = if status.backend_reachable {
        "✓ Reachable"
    } else {
        "✗ Not reachable (is the backend running?)"
    };
    println!("  Status: {}", reachability);
    println!("\nChat:");
    println!("  Model: {}", status.chat_model);
    let key_status = if status.chat_api_key_present {
        "✓ set".to_string()
    } else {
        format!("✗ not set (export {})", status.chat_api_key_env)
    };
    println!("  API key: {}", key_status);
}
