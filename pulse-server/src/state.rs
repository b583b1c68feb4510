//! Shared application state for the pulse server

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pulse_core::{NamespaceRouter, RestClient, SystemHost};

use crate::registry::ConnectionRegistry;
use crate::{ServerConfig, ServerError};

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Namespace → roster dispatch
    pub router: NamespaceRouter,
    /// Live connections
    pub connections: ConnectionRegistry,
    /// Root of the bootstrap asset tree
    pub static_dir: PathBuf,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state backed by the local host and the configured backend API
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let api = RestClient::new(config.backend.clone())
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let router = NamespaceRouter::standard(
            Arc::new(SystemHost::new()),
            Arc::new(api),
            config.supported_kernel.clone(),
        );

        Ok(Self::with_router(router, config.static_dir.clone()))
    }

    /// Create AppState with a custom router (for testing)
    pub fn with_router(router: NamespaceRouter, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            router,
            connections: ConnectionRegistry::new(),
            static_dir: static_dir.into(),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
