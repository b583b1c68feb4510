//! Server error types

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Body returned for every 404
pub const NOT_FOUND_BODY: &str = "<h1>Not found</h1>";

/// Errors that can occur in the pulse server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// WebSocket error
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Path segment does not name a namespace
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Static asset missing or unreadable
    #[error("static asset {path}: {source}")]
    StaticAsset {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::UnknownNamespace(_) | ServerError::StaticAsset { .. } => {
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response()
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}
