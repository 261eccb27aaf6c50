//! Config command: inspect the backend's embedding configuration
//!
//! The configuration is read-only from this side; changing providers
//! happens on the backend itself.

use crate::api::{BackendClient, EmbeddingConfig};
use crate::error::Result;
use serde::Serialize;
use tracing::info;

/// Readiness classification for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Warning,
    Error,
}

/// Static readiness note for a provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReadiness {
    pub status: Readiness,
    pub message: &'static str,
}

/// Fetch the current embedding configuration
pub async fn cmd_show_config(client: &BackendClient) -> Result<EmbeddingConfig> {
    info!("Fetching embedding configuration");
    client.config().await
}

/// Display label for a provider: first letter uppercased, rest unchanged
pub fn provider_label(provider: &str) -> String {
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Static description per known provider
pub fn provider_description(provider: &str) -> &'static str {
    match provider {
        "dummy" => "Testing provider - generates consistent dummy embeddings",
        "openai" => "OpenAI embeddings - high quality, requires API key",
        "huggingface" => "HuggingFace embeddings - local processing, good quality",
        _ => "Unknown provider",
    }
}

/// Static readiness note per known provider
pub fn provider_readiness(provider: &str) -> ProviderReadiness {
    match provider {
        "dummy" => ProviderReadiness {
            status: Readiness::Ready,
            message: "Always available",
        },
        "openai" => ProviderReadiness {
            status: Readiness::Warning,
            message: "Requires OPENAI_API_KEY environment variable",
        },
        "huggingface" => ProviderReadiness {
            status: Readiness::Ready,
            message: "Model will download automatically on first use",
        },
        _ => ProviderReadiness {
            status: Readiness::Error,
            message: "Unknown provider",
        },
    }
}

/// Print the embedding configuration to console
pub fn print_config(config: &EmbeddingConfig) {
    println!("\n⚙️  Embedding Configuration\n");

    let readiness = provider_readiness(&config.provider);
    let marker = match readiness.status {
        Readiness::Ready => "✓",
        Readiness::Warning => "⚠",
        Readiness::Error => "✗",
    };
    println!("Active Provider: {}", provider_label(&config.provider));
    println!("  {}", provider_description(&config.provider));
    println!("  {} {}", marker, readiness.message);

    for (name, settings) in &config.providers {
        println!("\n{} Settings:", provider_label(name));
        match settings.as_object() {
            Some(map) => {
                for (key, value) in map {
                    let rendered = match value.as_str() {
                        Some(s) => s.to_string(),
                        None => value.to_string(),
                    };
                    println!("  {}: {}", key, rendered);
                }
            }
            None => println!("  {}", settings),
        }
    }

    println!("\nTo change providers, reconfigure the backend service.");
}
