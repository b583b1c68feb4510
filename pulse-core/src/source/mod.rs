//! Status sources: point-in-time data producers
//!
//! A [`StatusSource`] performs one collection and returns either a JSON
//! payload or a [`SourceError`]. Sources have no concurrency of their own;
//! scheduling and failure policy live in [`crate::task`].

pub mod api;
pub mod host;
pub mod kernel;
pub mod mock;
pub mod services;
pub mod trigger;
pub mod uptime;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;

pub use api::{BackendApi, RestClient, RestClientConfig};
pub use host::{CommandOutput, HostFacts, SystemHost};
pub use kernel::KernelCheckSource;
pub use services::{DEFAULT_SERVICES, ServiceHealthSource};
pub use trigger::{
    DISK_SCAN_PATH, POOL_REFRESH_PATH, ROCKON_UPDATE_PATH, SHARE_REFRESH_PATH, TriggerSource,
};
pub use uptime::UptimeSource;

/// A single data-producing operation with a success/failure outcome
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Collect one reading
    async fn collect(&self) -> Result<Value, SourceError>;
}
