//! REST API handlers

use std::sync::Arc;

use axum::{Json, extract::State};
use pulse_core::Namespace;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Live connections per namespace
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConnectionCounts {
    pub services: usize,
    pub sysinfo: usize,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Live connections
    pub connections: ConnectionCounts,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let connections = ConnectionCounts {
        services: state.connections.count_for(Namespace::Services).await,
        sysinfo: state.connections.count_for(Namespace::Sysinfo).await,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        connections,
    })
}
