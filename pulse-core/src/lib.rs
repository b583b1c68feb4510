//! pulse-core: connection-scoped status collection
//!
//! Each client connection gets its own set of periodic producer tasks that
//! push tagged [`Event`]s into a shared [`PushChannel`]:
//!
//! - **Sources** - [`source::StatusSource`] adapters for service health,
//!   uptime, kernel compatibility and backend refresh triggers
//! - **Tasks** - [`PeriodicTask`] runs one source on a fixed interval (or once)
//! - **Supervision** - [`ConnectionSupervisor`] spawns a [`Roster`] of tasks per
//!   connection and [`ConnectionHandle`] tears them down on disconnect
//! - **Routing** - [`NamespaceRouter`] picks the roster for a path segment
//!
//! # Architecture
//!
//! ```text
//! path segment ──► NamespaceRouter ──► ConnectionSupervisor(Roster)
//!                                              │ connect()
//!                                              ▼
//!                  ┌──────────── ConnectionHandle (CancellationToken) ──┐
//!                  │  PeriodicTask  PeriodicTask  ...  PeriodicTask     │
//!                  └──────┬─────────────┬──────────────────┬───────────┘
//!                         └─────────────┴─► PushChannel ◄──┘
//!                                               │
//!                                               ▼
//!                                        transport writer
//! ```

pub mod channel;
pub mod error;
pub mod event;
pub mod roster;
pub mod router;
pub mod source;
pub mod supervisor;
pub mod task;

pub use channel::{DEFAULT_CHANNEL_CAPACITY, PushChannel};
pub use error::SourceError;
pub use event::Event;
pub use roster::{Namespace, Roster, SERVICE_HEALTH_INTERVAL, UPTIME_INTERVAL};
pub use router::NamespaceRouter;
pub use source::{
    BackendApi, HostFacts, RestClient, RestClientConfig, StatusSource, SystemHost,
};
pub use supervisor::{Connection, ConnectionHandle, ConnectionSupervisor};
pub use task::{FirstRun, PeriodicTask, TaskExit, TaskSpec};
