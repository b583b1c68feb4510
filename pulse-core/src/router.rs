//! Maps path segments to connection supervisors

use std::collections::HashMap;
use std::sync::Arc;

use crate::roster::{Namespace, Roster};
use crate::source::{BackendApi, HostFacts};
use crate::supervisor::ConnectionSupervisor;

/// Dispatches a namespace path segment to the supervisor for its roster
#[derive(Debug, Clone, Default)]
pub struct NamespaceRouter {
    supervisors: HashMap<Namespace, ConnectionSupervisor>,
}

impl NamespaceRouter {
    /// Build from rosters; a later roster for the same namespace replaces an earlier one
    pub fn new(rosters: impl IntoIterator<Item = Roster>) -> Self {
        let supervisors = rosters
            .into_iter()
            .map(|roster| (roster.namespace(), ConnectionSupervisor::new(roster)))
            .collect();
        Self { supervisors }
    }

    /// The service-health and system-info rosters
    pub fn standard(
        host: Arc<dyn HostFacts>,
        api: Arc<dyn BackendApi>,
        supported_kernel: Option<String>,
    ) -> Self {
        Self::new([
            Roster::service_health(Arc::clone(&host)),
            Roster::system_info(host, api, supported_kernel),
        ])
    }

    /// Look up the supervisor for a path segment
    pub fn route(&self, segment: &str) -> Option<&ConnectionSupervisor> {
        Namespace::from_segment(segment).and_then(|ns| self.supervisor(ns))
    }

    pub fn supervisor(&self, namespace: Namespace) -> Option<&ConnectionSupervisor> {
        self.supervisors.get(&namespace)
    }

    /// Registered namespaces in a stable order
    pub fn namespaces(&self) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|ns| self.supervisors.contains_key(ns))
            .collect()
    }
}
