//! Namespaces and their fixed task rosters

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::{
    BackendApi, DISK_SCAN_PATH, HostFacts, KernelCheckSource, POOL_REFRESH_PATH,
    ROCKON_UPDATE_PATH, SHARE_REFRESH_PATH, ServiceHealthSource, TriggerSource, UptimeSource,
};
use crate::task::{FirstRun, TaskSpec};

/// Delay between service health reports
pub const SERVICE_HEALTH_INTERVAL: Duration = Duration::from_secs(5);
/// Delay between uptime reports
pub const UPTIME_INTERVAL: Duration = Duration::from_secs(30);

/// A channel of concern a client can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Service health
    Services,
    /// System information and refresh triggers
    Sysinfo,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Services, Namespace::Sysinfo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Services => "services",
            Namespace::Sysinfo => "sysinfo",
        }
    }

    /// Parse a path segment such as `services` or `/sysinfo`
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.trim_matches('/') {
            "services" => Some(Namespace::Services),
            "sysinfo" => Some(Namespace::Sysinfo),
            _ => None,
        }
    }

    /// Key of the acknowledgment event sent on connect
    pub fn connected_key(&self) -> String {
        self.key("connected")
    }

    /// Build a namespaced event key
    pub fn key(&self, name: &str) -> String {
        format!("{}:{}", self.as_str(), name)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed list of tasks spawned for every connection to a namespace
#[derive(Debug, Clone)]
pub struct Roster {
    namespace: Namespace,
    tasks: Vec<TaskSpec>,
}

impl Roster {
    pub fn new(namespace: Namespace, tasks: Vec<TaskSpec>) -> Self {
        Self { namespace, tasks }
    }

    /// One task covering every service, first report after one interval
    pub fn service_health(host: Arc<dyn HostFacts>) -> Self {
        let ns = Namespace::Services;
        let tasks = vec![
            TaskSpec::repeating(
                "service health",
                ns.key("get_services"),
                ns.key("get_services_error"),
                SERVICE_HEALTH_INTERVAL,
                Arc::new(ServiceHealthSource::new(host)),
            )
            .with_first_run(FirstRun::AfterInterval),
        ];
        Self::new(ns, tasks)
    }

    /// Uptime, kernel check and the four backend refresh triggers
    pub fn system_info(
        host: Arc<dyn HostFacts>,
        api: Arc<dyn BackendApi>,
        supported_kernel: Option<String>,
    ) -> Self {
        let ns = Namespace::Sysinfo;
        let trigger = |name: &str, path: &str| {
            TaskSpec::one_shot(
                name,
                ns.key(name),
                ns.key(&format!("{name}_error")),
                Arc::new(TriggerSource::new(Arc::clone(&api), path)),
            )
        };

        let tasks = vec![
            TaskSpec::repeating(
                "uptime",
                ns.key("uptime"),
                ns.key("uptime_error"),
                UPTIME_INTERVAL,
                Arc::new(UptimeSource::new(Arc::clone(&host))),
            ),
            TaskSpec::one_shot(
                "kernel_info",
                ns.key("kernel_info"),
                ns.key("kernel_error"),
                Arc::new(KernelCheckSource::new(host, supported_kernel)),
            ),
            trigger("update_rockons", ROCKON_UPDATE_PATH),
            trigger("refresh_disks", DISK_SCAN_PATH),
            trigger("refresh_pools", POOL_REFRESH_PATH),
            trigger("refresh_shares", SHARE_REFRESH_PATH),
        ];
        Self::new(ns, tasks)
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
