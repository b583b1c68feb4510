//! Shared test utilities for pulse-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pulse_core::source::mock::MockSource;
use pulse_core::{FirstRun, Namespace, NamespaceRouter, Roster, TaskSpec};
use pulse_server::{AppState, PulseServer, ServerConfig};
use serde_json::json;
use tokio::net::TcpListener;

/// Service-health report interval used by test rosters
#[allow(dead_code)]
pub const FAST_SERVICES_INTERVAL: Duration = Duration::from_millis(50);
/// Uptime report interval used by test rosters
#[allow(dead_code)]
pub const FAST_UPTIME_INTERVAL: Duration = Duration::from_millis(100);

/// Rosters shaped like the real ones, on short intervals and mock sources
pub fn fast_router() -> NamespaceRouter {
    let services = Roster::new(
        Namespace::Services,
        vec![
            TaskSpec::repeating(
                "service health",
                "services:get_services",
                "services:get_services_error",
                FAST_SERVICES_INTERVAL,
                Arc::new(MockSource::ok(json!({ "nfs": { "running": 0 } }))),
            )
            .with_first_run(FirstRun::AfterInterval),
        ],
    );

    let sysinfo = Roster::new(
        Namespace::Sysinfo,
        vec![
            TaskSpec::repeating(
                "uptime",
                "sysinfo:uptime",
                "sysinfo:uptime_error",
                FAST_UPTIME_INTERVAL,
                Arc::new(MockSource::ok(1234)),
            ),
            TaskSpec::one_shot(
                "kernel_info",
                "sysinfo:kernel_info",
                "sysinfo:kernel_error",
                Arc::new(MockSource::failing(
                    "You are running an unsupported kernel(6.1.0)",
                )),
            ),
        ],
    );

    NamespaceRouter::new([services, sysinfo])
}

/// Creates a test server with fast rosters, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_static(Path::new(".")).await
}

/// Creates a test server serving assets from `static_dir`
#[allow(dead_code)]
pub async fn create_test_server_with_static(static_dir: &Path) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::with_router(fast_router(), static_dir));
    let server = PulseServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: PulseServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    addr
}

/// Poll `check` until it returns true or `timeout` elapses
#[allow(dead_code)]
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
