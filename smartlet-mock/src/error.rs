use std::io;
use std::net::SocketAddr;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unable to open discovery socket: {0}")]
    Bind(#[source] io::Error),

    #[error("No collector announcement after {0} attempts")]
    DiscoveryExhausted(u32),

    #[error("Unable to connect to collector at {endpoint}: {source}")]
    Connect {
        endpoint: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Unable to send packet for node {node_id}: {reason}")]
    Write { node_id: u32, reason: String },

    #[error("Receive timed out")]
    Timeout,

    #[error("Error when receiving from collector: {0}")]
    Receive(String),

    #[error("Shutdown requested")]
    Cancelled,
}

impl Error {
    /// Whether the error ends the run.
    ///
    /// A timeout is an expected outcome of every wait, and cancellation is an
    /// orderly shutdown.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Timeout | Error::Cancelled)
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
