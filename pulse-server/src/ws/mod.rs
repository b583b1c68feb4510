//! WebSocket module for namespace sessions

mod connection;

pub use connection::namespace_ws;
