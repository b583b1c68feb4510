//! WebSocket test client for namespace sessions
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// URL of a namespace session
pub fn namespace_url(addr: SocketAddr, namespace: &str) -> String {
    format!("ws://{}/socket.io/{}", addr, namespace)
}

/// Low-level WebSocket connection to one namespace
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to a namespace endpoint
    pub async fn connect(addr: SocketAddr, namespace: &str) -> Self {
        let (ws, _) = tokio_tungstenite::connect_async(namespace_url(addr, namespace))
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    #[allow(dead_code)]
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send a close frame
    #[allow(dead_code)]
    pub async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }

    /// Receive and parse the next event
    pub async fn recv_event(&mut self) -> serde_json::Value {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).expect("Failed to parse JSON");
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive with timeout, returns None if timeout
    #[allow(dead_code)]
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<serde_json::Value> {
        tokio::time::timeout(duration, self.recv_event()).await.ok()
    }

    /// Collect every event key received during `window`
    #[allow(dead_code)]
    pub async fn collect_keys(&mut self, window: Duration) -> Vec<String> {
        let deadline = Instant::now() + window;
        let mut keys = Vec::new();
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.recv_timeout(remaining).await {
                Some(event) => keys.push(event["key"].as_str().unwrap_or_default().to_string()),
                None => break,
            }
        }
        keys
    }
}
