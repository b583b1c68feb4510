//! Per-connection outbound event conduit
//!
//! Every periodic task of a connection holds a clone of the same
//! [`PushChannel`]. Writes go through a bounded mpsc queue drained by a
//! single writer, so one event is always framed as one message and each
//! task's own writes stay in order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::event::Event;

/// Default queue depth for a connection's outbound events
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Outbound event sink bound to exactly one connection
#[derive(Clone)]
pub struct PushChannel {
    tx: mpsc::Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl PushChannel {
    /// Create a channel and the receiver the transport writer drains
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        let channel = Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (channel, rx)
    }

    /// Queue an event for delivery.
    ///
    /// Never blocks and never fails the caller. Returns `false` when the
    /// event was dropped because the connection is gone or the queue is full.
    pub fn write(&self, event: Event) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Closed(event)) => {
                debug!(key = %event.key, "Push channel closed, dropping event");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Full(event)) => {
                warn!(key = %event.key, "Push channel full, dropping event");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Queue an event, waiting for room if the queue is full.
    ///
    /// For events that must not be lost to backpressure, such as the only
    /// error report of a task that is about to stop. Returns `false` only
    /// when the connection is gone.
    pub async fn deliver(&self, event: Event) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Closed(event)) => {
                debug!(key = %event.key, "Push channel closed, dropping event");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Full(event)) => {
                debug!(key = %event.key, "Push channel full, waiting for room");
                if self.tx.send(event).await.is_ok() {
                    true
                } else {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    false
                }
            }
        }
    }

    /// Whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Total events dropped on this channel
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_delivers_event() {
        let (channel, mut rx) = PushChannel::new(8);
        assert!(channel.write(Event::new("services:connected", "connected")));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.key, "services:connected");
    }

    #[tokio::test]
    async fn write_after_receiver_dropped_is_noop() {
        let (channel, rx) = PushChannel::new(8);
        drop(rx);

        assert!(channel.is_closed());
        assert!(!channel.write(Event::new("sysinfo:uptime", 1)));
        assert!(!channel.write(Event::new("sysinfo:uptime", 2)));
        assert_eq!(channel.dropped_count(), 2);
    }

    #[tokio::test]
    async fn write_to_full_channel_drops() {
        let (channel, _rx) = PushChannel::new(1);
        assert!(channel.write(Event::new("a", 1)));
        assert!(!channel.write(Event::new("a", 2)));
        assert_eq!(channel.dropped_count(), 1);
    }

    #[tokio::test]
    async fn deliver_waits_for_room_instead_of_dropping() {
        let (channel, mut rx) = PushChannel::new(1);
        assert!(channel.write(Event::new("sysinfo:uptime", 1)));

        let writer = channel.clone();
        let pending = tokio::spawn(async move {
            writer
                .deliver(Event::error("sysinfo:kernel_error", "unsupported"))
                .await
        });
        tokio::task::yield_now().await;

        assert_eq!(rx.recv().await.unwrap().key, "sysinfo:uptime");
        assert!(pending.await.unwrap());
        assert_eq!(rx.recv().await.unwrap().key, "sysinfo:kernel_error");
        assert_eq!(channel.dropped_count(), 0);
    }

    #[tokio::test]
    async fn deliver_to_closed_channel_returns_false() {
        let (channel, rx) = PushChannel::new(1);
        drop(rx);

        assert!(!channel.deliver(Event::new("a", 1)).await);
        assert_eq!(channel.dropped_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_keep_their_own_order() {
        let (channel, mut rx) = PushChannel::new(1024);

        let mut handles = Vec::new();
        for writer in 0..4 {
            let channel = channel.clone();
            handles.push(tokio::spawn(async move {
                for seq in 0..100u64 {
                    channel.write(Event::new(format!("w{writer}"), seq));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        drop(channel);

        let mut last: std::collections::HashMap<String, i64> = Default::default();
        let mut total = 0;
        while let Some(event) = rx.recv().await {
            let seq = event.data.as_i64().unwrap();
            let prev = last.insert(event.key.clone(), seq).unwrap_or(-1);
            assert!(seq > prev, "{} went backwards: {} after {}", event.key, seq, prev);
            total += 1;
        }
        assert_eq!(total, 400);
    }
}
