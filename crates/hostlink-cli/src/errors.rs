//! Error types for the CLI runtime.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to parse params: {0}")]
    ParseParams(serde_json::Error),
    #[error("params must be a JSON object")]
    ParamsNotObject,
    #[error("failed to resolve server address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to server at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to serialise command request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to server: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from server: {0}")]
    ReadResponse(io::Error),
    #[error("timed out after {timeout_ms} ms waiting for a response")]
    TimedOut { timeout_ms: u128 },
    #[error("server closed the connection before a complete response arrived")]
    Truncated,
    #[error("failed to parse server response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("failed to write response: {0}")]
    ForwardResponse(io::Error),
}
