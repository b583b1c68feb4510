//! Registry of live connections

use std::collections::HashMap;

use pulse_core::{Connection, Namespace};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Tracks every connection between connect and disconnect
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Uuid, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, connection: Connection) {
        self.connections
            .write()
            .await
            .insert(connection.id, connection);
    }

    pub async fn remove(&self, id: Uuid) -> Option<Connection> {
        self.connections.write().await.remove(&id)
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn count_for(&self, namespace: Namespace) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.namespace == namespace)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(namespace: Namespace) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            namespace,
            connected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn tracks_connections_per_namespace() {
        let registry = ConnectionRegistry::new();
        let services = connection(Namespace::Services);
        let services_id = services.id;

        registry.insert(services).await;
        registry.insert(connection(Namespace::Sysinfo)).await;
        registry.insert(connection(Namespace::Sysinfo)).await;

        assert_eq!(registry.count().await, 3);
        assert_eq!(registry.count_for(Namespace::Services).await, 1);
        assert_eq!(registry.count_for(Namespace::Sysinfo).await, 2);

        assert!(registry.remove(services_id).await.is_some());
        assert!(registry.remove(services_id).await.is_none());
        assert_eq!(registry.count_for(Namespace::Services).await, 0);
    }
}
