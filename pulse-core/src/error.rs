//! Error types for pulse-core

use thiserror::Error;

/// Errors raised by a status source while collecting data
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error(
        "You are running an unsupported kernel({running}). Some features may not work properly. Supported kernel version is {supported}"
    )]
    UnsupportedKernel { running: String, supported: String },

    #[error("could not parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("request to {url} failed: {source}")]
    Api {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    ApiStatus { url: String, status: u16 },

    #[error("invalid backend url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("all {count} service probes failed")]
    AllProbesFailed { count: usize },

    #[error("{0}")]
    Other(String),
}
