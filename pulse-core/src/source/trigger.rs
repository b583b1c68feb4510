//! One-shot backend refresh triggers

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::StatusSource;
use super::api::BackendApi;
use crate::error::SourceError;

/// Refresh Rock-on metadata
pub const ROCKON_UPDATE_PATH: &str = "/rockons/update";
/// Rescan attached disks
pub const DISK_SCAN_PATH: &str = "/disks/scan";
/// Refresh pool state
pub const POOL_REFRESH_PATH: &str = "/commands/refresh-pool-state";
/// Refresh share state
pub const SHARE_REFRESH_PATH: &str = "/commands/refresh-share-state";

/// POSTs to a fixed backend endpoint
pub struct TriggerSource {
    api: Arc<dyn BackendApi>,
    path: String,
}

impl TriggerSource {
    pub fn new(api: Arc<dyn BackendApi>, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl StatusSource for TriggerSource {
    async fn collect(&self) -> Result<Value, SourceError> {
        let status = self.api.post(&self.path).await?;
        Ok(json!({ "path": self.path, "status": status }))
    }
}
