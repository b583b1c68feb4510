//! Service health source

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::StatusSource;
use super::host::HostFacts;
use crate::error::SourceError;

/// Services reported on the service-health namespace.
///
/// `smartd` and `docker` appear twice; the result map collapses them.
pub const DEFAULT_SERVICES: [&str; 17] = [
    "nfs",
    "smb",
    "ntpd",
    "winbind",
    "netatalk",
    "snmpd",
    "docker",
    "smartd",
    "replication",
    "nis",
    "ldap",
    "sftp",
    "data-collector",
    "smartd",
    "service-monitor",
    "docker",
    "task-scheduler",
];

/// Probes every configured service and reports `{name: {"running": code}}`
pub struct ServiceHealthSource {
    host: Arc<dyn HostFacts>,
    services: Vec<String>,
}

impl ServiceHealthSource {
    pub fn new(host: Arc<dyn HostFacts>) -> Self {
        Self::with_services(host, DEFAULT_SERVICES.iter().map(|s| s.to_string()))
    }

    pub fn with_services(
        host: Arc<dyn HostFacts>,
        services: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            host,
            services: services.into_iter().collect(),
        }
    }
}

#[async_trait]
impl StatusSource for ServiceHealthSource {
    async fn collect(&self) -> Result<Value, SourceError> {
        let mut data = Map::new();
        let mut failures = 0;

        for service in &self.services {
            let entry = match self.host.service_status(service).await {
                Ok(output) => json!({ "running": output.code }),
                Err(e) => {
                    debug!(service = %service, error = %e, "Service probe failed");
                    failures += 1;
                    json!({ "running": null, "error": e.to_string() })
                }
            };
            data.insert(service.clone(), entry);
        }

        if !self.services.is_empty() && failures == self.services.len() {
            return Err(SourceError::AllProbesFailed { count: failures });
        }

        Ok(Value::Object(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::MockHost;

    #[tokio::test]
    async fn reports_exit_code_per_service() {
        let host = MockHost::new()
            .with_service_code("nfs", 0)
            .with_service_code("smb", 3);
        let source = ServiceHealthSource::with_services(
            Arc::new(host),
            ["nfs".to_string(), "smb".to_string()],
        );

        let data = source.collect().await.unwrap();
        assert_eq!(data["nfs"], json!({"running": 0}));
        assert_eq!(data["smb"], json!({"running": 3}));
    }

    #[tokio::test]
    async fn default_roster_collapses_duplicates() {
        let source = ServiceHealthSource::new(Arc::new(MockHost::new()));
        let data = source.collect().await.unwrap();

        let map = data.as_object().unwrap();
        assert_eq!(map.len(), 15);
        assert!(map.contains_key("task-scheduler"));
        assert!(map.contains_key("smartd"));
    }

    #[tokio::test]
    async fn single_probe_failure_is_recorded_inline() {
        let host = MockHost::new().with_failing_service("netatalk", "no such unit");
        let source = ServiceHealthSource::with_services(
            Arc::new(host),
            ["netatalk".to_string(), "nfs".to_string()],
        );

        let data = source.collect().await.unwrap();
        assert_eq!(data["netatalk"]["running"], Value::Null);
        assert_eq!(data["netatalk"]["error"], json!("no such unit"));
        assert_eq!(data["nfs"]["running"], json!(0));
    }

    #[tokio::test]
    async fn all_probes_failing_fails_the_source() {
        let host = MockHost::new()
            .with_failing_service("nfs", "down")
            .with_failing_service("smb", "down");
        let source = ServiceHealthSource::with_services(
            Arc::new(host),
            ["nfs".to_string(), "smb".to_string()],
        );

        assert!(matches!(
            source.collect().await,
            Err(SourceError::AllProbesFailed { count: 2 })
        ));
    }
}
