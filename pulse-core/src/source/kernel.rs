//! Kernel compatibility check

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::StatusSource;
use super::host::HostFacts;
use crate::error::SourceError;

/// Reports the running kernel and fails if it differs from the supported one
pub struct KernelCheckSource {
    host: Arc<dyn HostFacts>,
    supported: Option<String>,
}

impl KernelCheckSource {
    /// `supported` of `None` accepts any running kernel
    pub fn new(host: Arc<dyn HostFacts>, supported: Option<String>) -> Self {
        Self { host, supported }
    }
}

#[async_trait]
impl StatusSource for KernelCheckSource {
    async fn collect(&self) -> Result<Value, SourceError> {
        let running = self.host.kernel_version().await?;

        if let Some(supported) = &self.supported
            && *supported != running
        {
            return Err(SourceError::UnsupportedKernel {
                running,
                supported: supported.clone(),
            });
        }

        Ok(Value::String(running))
    }
}
