//! Server lifecycle errors.

use std::net::SocketAddr;

use thiserror::Error;

use crate::transport::ListenerError;

/// Errors raised by [`Server`](super::Server) lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be created. The server stays stopped.
    #[error("failed to start listener: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// `start` was called on a running server.
    #[error("server already running on {addr}")]
    AlreadyRunning {
        /// Address of the existing listener.
        addr: SocketAddr,
    },
    /// `run` was called before `start`.
    #[error("server is not running")]
    NotRunning,
    /// The listening socket failed during a tick. The server has stopped.
    #[error("listener failed: {source}")]
    ListenerFailure {
        /// Underlying accept error.
        #[source]
        source: ListenerError,
    },
}
