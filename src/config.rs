//! Environment configuration for the studio client.

use std::env;

/// Process-wide configuration, injected at startup and never mutated.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// Base URL of the course backend REST API
    pub api_base_url: String,
    /// WebSocket URL of the video-status push channel
    pub push_url: String,
    /// Bearer token for mutating backend calls
    pub api_token: String,
    /// Public environment key of the video platform
    pub video_env_key: String,
    /// Cloud name of the document-storage service
    pub storage_cloud_name: String,
}

impl StudioConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| String::from("http://127.0.0.1:8000")),
            push_url: env::var("PUSH_URL")
                .unwrap_or_else(|_| String::from("ws://127.0.0.1:8000/ws")),
            api_token: env::var("API_TOKEN").unwrap_or_default(),
            video_env_key: env::var("VIDEO_ENV_KEY").unwrap_or_default(),
            storage_cloud_name: env::var("STORAGE_CLOUD_NAME").unwrap_or_default(),
        }
    }
}
