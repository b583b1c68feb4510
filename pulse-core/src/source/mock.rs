//! Scriptable sources and collaborators for testing
//!
//! [`MockSource`] plays back queued outcomes and counts calls, so task and
//! supervisor behaviour can be exercised without touching the host.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::StatusSource;
use super::api::BackendApi;
use super::host::{CommandOutput, HostFacts};
use crate::error::SourceError;

type Outcome = Result<Value, String>;

/// Mock implementation of [`StatusSource`]
///
/// Each `collect()` pops one queued outcome; once the queue is empty the
/// fallback outcome is returned forever.
pub struct MockSource {
    queued: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    /// Always succeeds with `value`
    pub fn ok(value: impl Into<Value>) -> Self {
        Self::with_fallback(Ok(value.into()))
    }

    /// Always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_fallback(Err(message.into()))
    }

    fn with_fallback(fallback: Outcome) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue outcomes played back before the fallback
    pub fn then(mut self, outcome: Result<Value, &str>) -> Self {
        self.queued
            .get_mut()
            .push_back(outcome.map_err(str::to_string));
        self
    }

    /// Sleep before returning each outcome
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared call counter, readable after the source is moved into a task
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for MockSource {
    async fn collect(&self) -> Result<Value, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .queued
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        outcome.map_err(SourceError::Other)
    }
}

/// Mock implementation of [`HostFacts`]
///
/// Unknown services report exit code 0.
pub struct MockHost {
    services: HashMap<String, Result<i32, String>>,
    uptime: Result<u64, String>,
    kernel: Result<String, String>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            uptime: Ok(0),
            kernel: Ok("4.12.4-1.el7.elrepo.x86_64".to_string()),
        }
    }

    pub fn with_service_code(mut self, service: &str, code: i32) -> Self {
        self.services.insert(service.to_string(), Ok(code));
        self
    }

    pub fn with_failing_service(mut self, service: &str, message: &str) -> Self {
        self.services
            .insert(service.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_uptime(mut self, secs: u64) -> Self {
        self.uptime = Ok(secs);
        self
    }

    pub fn with_failing_uptime(mut self, message: &str) -> Self {
        self.uptime = Err(message.to_string());
        self
    }

    pub fn with_kernel(mut self, version: &str) -> Self {
        self.kernel = Ok(version.to_string());
        self
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostFacts for MockHost {
    async fn service_status(&self, service: &str) -> Result<CommandOutput, SourceError> {
        match self.services.get(service) {
            Some(Err(message)) => Err(SourceError::Other(message.clone())),
            Some(Ok(code)) => Ok(CommandOutput {
                code: Some(*code),
                stdout: String::new(),
                stderr: String::new(),
            }),
            None => Ok(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }

    async fn uptime(&self) -> Result<u64, SourceError> {
        self.uptime.clone().map_err(SourceError::Other)
    }

    async fn kernel_version(&self) -> Result<String, SourceError> {
        self.kernel.clone().map_err(SourceError::Other)
    }
}

/// Mock implementation of [`BackendApi`] that records posted paths
pub struct MockApi {
    posted: Mutex<Vec<String>>,
    failing: HashMap<String, u16>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            posted: Mutex::new(Vec::new()),
            failing: HashMap::new(),
        }
    }

    /// Answer `path` with a non-2xx status
    pub fn with_failing_path(mut self, path: &str, status: u16) -> Self {
        self.failing.insert(path.to_string(), status);
        self
    }

    /// Paths posted so far, in order
    pub async fn posted(&self) -> Vec<String> {
        self.posted.lock().await.clone()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendApi for MockApi {
    async fn post(&self, path: &str) -> Result<u16, SourceError> {
        self.posted.lock().await.push(path.to_string());

        match self.failing.get(path) {
            Some(status) => Err(SourceError::ApiStatus {
                url: path.to_string(),
                status: *status,
            }),
            None => Ok(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_plays_queue_then_fallback() {
        let source = MockSource::ok("steady")
            .then(Ok(Value::from("first")))
            .then(Err("second failed"));

        assert_eq!(source.collect().await.unwrap(), Value::from("first"));
        assert!(source.collect().await.is_err());
        assert_eq!(source.collect().await.unwrap(), Value::from("steady"));
        assert_eq!(source.collect().await.unwrap(), Value::from("steady"));
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn mock_host_defaults_to_running() {
        let host = MockHost::new();
        let output = host.service_status("anything").await.unwrap();
        assert!(output.success());
    }
}
