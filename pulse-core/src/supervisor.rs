//! Connection-scoped task supervision
//!
//! [`ConnectionSupervisor::connect`] is the only way tasks get spawned: it
//! acknowledges the connection on the [`PushChannel`], then starts one
//! [`PeriodicTask`] per roster entry, all sharing one cancellation signal.
//! The returned [`ConnectionHandle`] owns that signal and the task handles;
//! [`ConnectionHandle::disconnect`] (or dropping the handle) fires it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::channel::PushChannel;
use crate::event::{CONNECTED_DATA, Event};
use crate::roster::{Namespace, Roster};
use crate::task::{PeriodicTask, TaskExit};

/// One active client session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: Uuid,
    pub namespace: Namespace,
    pub connected_at: DateTime<Utc>,
}

/// Spawns a roster's tasks for each new connection
#[derive(Debug, Clone)]
pub struct ConnectionSupervisor {
    roster: Arc<Roster>,
}

impl ConnectionSupervisor {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Arc::new(roster),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.roster.namespace()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Start a connection: emit the connected event, then spawn every task.
    ///
    /// Returns immediately; no task iteration is awaited.
    pub fn connect(&self, channel: PushChannel) -> ConnectionHandle {
        let namespace = self.roster.namespace();
        let connection = Connection {
            id: Uuid::new_v4(),
            namespace,
            connected_at: Utc::now(),
        };
        let cancel = CancellationToken::new();

        info!(connection_id = %connection.id, namespace = %namespace, "Connection established");

        // Sent before any task exists, so it is always first on the channel
        channel.write(Event::new(namespace.connected_key(), CONNECTED_DATA));

        let handles = self
            .roster
            .tasks()
            .iter()
            .cloned()
            .map(|spec| PeriodicTask::new(spec, channel.clone(), cancel.clone()).spawn())
            .collect::<Vec<_>>();

        debug!(
            connection_id = %connection.id,
            count = handles.len(),
            "Spawned connection tasks"
        );

        ConnectionHandle {
            connection,
            cancel,
            handles,
        }
    }
}

/// Owns the task set of one connection
pub struct ConnectionHandle {
    connection: Connection,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<TaskExit>>,
}

impl ConnectionHandle {
    pub fn id(&self) -> Uuid {
        self.connection.id
    }

    pub fn namespace(&self) -> Namespace {
        self.connection.namespace
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// True until the connection is disconnected
    pub fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// A token that fires when this connection is torn down
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Fire the cancellation signal without waiting for tasks to exit.
    ///
    /// Safe to call any number of times; returns `true` only on the call
    /// that actually tore the connection down.
    pub fn disconnect(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        info!(
            connection_id = %self.connection.id,
            namespace = %self.connection.namespace,
            "Connection closed"
        );
        true
    }

    /// Wait for every task to exit, in roster order
    pub async fn join(mut self) -> Vec<TaskExit> {
        let mut exits = Vec::with_capacity(self.handles.len());
        for handle in std::mem::take(&mut self.handles) {
            match handle.await {
                Ok(exit) => exits.push(exit),
                Err(e) => {
                    warn!(connection_id = %self.connection.id, error = %e, "Connection task panicked");
                    exits.push(TaskExit::Failed);
                }
            }
        }
        exits
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
