//! Default values for configuration

/// Default backend base URL (the FastAPI document-processing service)
pub fn default_backend_url() -> String {
    std::env::var("RAGDECK_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Default environment variable name for the chat API key
pub fn default_chat_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

/// Default chat API base URL (OpenAI-compatible)
pub fn default_chat_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

/// Default chat model
pub fn default_chat_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

/// Default sampling temperature
pub fn default_chat_temperature() -> f32 {
    0.7
}

/// Default upper bound on generated tokens
pub fn default_chat_max_tokens() -> u32 {
    1024
}

/// Default system prompt sent with every chat message
pub fn default_chat_system_prompt() -> String {
    "You are a helpful AI assistant. Provide clear, concise, and helpful responses.".to_string()
}

/// Default chat proxy bind host
pub fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

/// Default chat proxy bind port
pub fn default_proxy_port() -> u16 {
    3080
}
