use std::net::SocketAddr;

use thiserror::Error;

/// Error surface for the static file responder.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open browser at {url}: {source}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    /// Another process already listens on the port.
    pub fn is_addr_in_use(&self) -> bool {
        matches!(self, ServeError::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse)
    }
}
