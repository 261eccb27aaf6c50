//! Local chat proxy service
//!
//! A single pass-through route: POST `/api/chat` takes `{message}` and
//! answers `{message}` with the completion API's reply. The credential is
//! checked on every request; its absence is a configuration error with a
//! fixed response body. Upstream failures surface the provider's message
//! text as `details`, never a stack trace.

use crate::chat::ChatClient;
use crate::config::Config;
use crate::error::{Error, Result};
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

/// Shared state for the proxy routes
#[derive(Clone)]
pub struct ProxyState {
    config: Arc<Config>,
}

/// Request body for chat messages
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Build the proxy router with CORS for the local frontend origins
pub fn proxy_router(config: Arc<Config>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(ProxyState { config })
        .layer(cors)
}

/// Bind and serve the proxy until the process is stopped
pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.proxy.host, config.proxy.port)
        .parse()
        .map_err(|e| Error::Config(format!("Invalid proxy address: {}", e)))?;

    let app = proxy_router(Arc::new(config));

    info!("Chat proxy listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat_handler(
    State(state): State<ProxyState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    // Credential check comes before message validation; an absent key is
    // a fatal configuration error.
    let client = match ChatClient::from_config(&state.config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "API key not configured"})),
            )
                .into_response();
        }
    };

    match client.send(&request.message).await {
        Ok(reply) => (StatusCode::OK, Json(json!({"message": reply}))).into_response(),
        Err(Error::Validation(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Message is required"})),
        )
            .into_response(),
        Err(e) => {
            error!("Chat API error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process your request",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
