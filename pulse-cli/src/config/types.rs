use std::path::PathBuf;
use std::time::Duration;

use pulse_core::RestClientConfig;
use pulse_core::source::api::DEFAULT_BASE_URL;
use pulse_server::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
use serde::{Deserialize, Serialize};

/// Default backend request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPulseConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub backend: RawBackendConfig,

    #[serde(default)]
    pub kernel: KernelConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

/// Backend config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawBackendConfig {
    pub base_url: Option<String>,
    pub verify_tls: Option<bool>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PulseConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub kernel: KernelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory holding `index.html` and `static/`
    pub static_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSection {
    /// Appliance API root
    pub base_url: String,

    /// Verify the API's TLS certificate
    pub verify_tls: bool,

    /// Bearer token for API calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_tls: false,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KernelConfig {
    /// Kernel release the appliance supports; unset accepts any
    pub supported_version: Option<String>,
}

impl PulseConfig {
    /// Server settings derived from this configuration
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            static_dir: self.server.static_dir.clone(),
            backend: RestClientConfig {
                base_url: self.backend.base_url.clone(),
                verify_tls: self.backend.verify_tls,
                token: self.backend.token.clone(),
                timeout: Duration::from_secs(self.backend.timeout_secs),
            },
            supported_kernel: self.kernel.supported_version.clone(),
        }
    }
}
