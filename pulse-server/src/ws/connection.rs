//! WebSocket session handling
//!
//! One session per upgraded socket: the namespace's supervisor spawns the
//! roster's tasks, and this module pumps their events out as text frames
//! until the client leaves or a write fails.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use pulse_core::{ConnectionSupervisor, DEFAULT_CHANNEL_CAPACITY, Event, PushChannel};
use tracing::{debug, trace, warn};

use crate::{AppState, ServerError};

/// WebSocket upgrade handler for `/socket.io/{namespace}`
///
/// Unknown namespaces are rejected with 404 before any upgrade happens.
pub async fn namespace_ws(
    ws: Option<WebSocketUpgrade>,
    Path(namespace): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let supervisor = state
        .router
        .route(&namespace)
        .cloned()
        .ok_or_else(|| ServerError::UnknownNamespace(namespace.clone()))?;

    let Some(ws) = ws else {
        return Ok((StatusCode::BAD_REQUEST, "expected a websocket upgrade").into_response());
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, supervisor, state)))
}

/// Drive one connection from handshake to teardown
async fn handle_socket(socket: WebSocket, supervisor: ConnectionSupervisor, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (channel, mut events) = PushChannel::new(DEFAULT_CHANNEL_CAPACITY);

    let handle = supervisor.connect(channel);
    let connection_id = handle.id();
    state.connections.insert(handle.connection().clone()).await;

    // Goes false once every task has finished and dropped its channel
    let mut events_open = true;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        trace!(connection_id = %connection_id, len = text.len(), "Ignoring client message");
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection_id = %connection_id, "Client closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(connection_id = %connection_id, error = %e, "WebSocket receive failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            event = events.recv(), if events_open => {
                match event {
                    Some(event) => {
                        if let Err(e) = send_event(&mut sender, &event).await {
                            warn!(connection_id = %connection_id, error = %e, "Failed to push event");
                            break;
                        }
                    }
                    None => events_open = false,
                }
            }
        }
    }

    handle.disconnect();
    state.connections.remove(connection_id).await;
    let _ = sender.close().await;
}

/// Serialize an event and send it as one text frame
async fn send_event<S>(sender: &mut S, event: &Event) -> Result<(), ServerError>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = event
        .to_json()
        .map_err(|e| ServerError::Internal(format!("serialize error: {}", e)))?;
    sender
        .send(Message::Text(json))
        .await
        .map_err(|e| ServerError::WebSocket(e.to_string()))
}
