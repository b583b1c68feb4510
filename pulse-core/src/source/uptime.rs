//! Host uptime source

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::StatusSource;
use super::host::HostFacts;
use crate::error::SourceError;

/// Reports seconds since boot
pub struct UptimeSource {
    host: Arc<dyn HostFacts>,
}

impl UptimeSource {
    pub fn new(host: Arc<dyn HostFacts>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl StatusSource for UptimeSource {
    async fn collect(&self) -> Result<Value, SourceError> {
        let secs = self.host.uptime().await?;
        Ok(Value::from(secs))
    }
}
