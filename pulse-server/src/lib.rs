//! pulse-server - HTTP and WebSocket frontend for pulse
//!
//! Serves the bootstrap assets, performs the WebSocket handshake on
//! `/socket.io/{namespace}` and hands each session to the namespace's
//! [`pulse_core::ConnectionSupervisor`].

mod error;
pub mod http;
mod registry;
mod state;
pub mod ws;

use std::path::PathBuf;
use std::sync::Arc;

use pulse_core::RestClientConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::{NOT_FOUND_BODY, ServerError};
pub use http::create_router;
pub use registry::ConnectionRegistry;
pub use state::AppState;

/// Default address to bind
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port to listen on
pub const DEFAULT_PORT: u16 = 8001;

/// The main pulse server
pub struct PulseServer {
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl PulseServer {
    /// Create a server backed by the local host and configured backend API
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = Arc::new(AppState::from_config(&config)?);
        Ok(Self::with_state(config, state))
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self {
            config,
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Token that stops the server when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("pulse server listening on {}", addr);

        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let shutdown = self.shutdown.clone();
        let router = create_router(self.state);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("pulse server stopped");
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding `index.html` and `static/`
    pub static_dir: PathBuf,
    /// Backend API used by refresh triggers
    pub backend: RestClientConfig,
    /// Kernel release the appliance supports; `None` accepts any
    pub supported_kernel: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("."),
            backend: RestClientConfig::default(),
            supported_kernel: None,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:8001")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
