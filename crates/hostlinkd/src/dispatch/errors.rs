//! Error types for request dispatch failures.
//!
//! The display text of each variant is exactly the `message` placed in the
//! error response sent back to the client.

use thiserror::Error;

use crate::registry::HandlerError;

/// Errors surfaced while parsing or executing a single request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The frame could not be parsed as JSON.
    #[error("invalid json")]
    InvalidJson {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The request is not an object or lacks a string `command` field.
    #[error("missing command")]
    MissingCommand,

    /// `params` was present but not an object.
    #[error("invalid params: expected object")]
    InvalidParams,

    /// No handler is registered under the requested name.
    #[error("unknown command: {name}")]
    UnknownCommand {
        /// Requested command name.
        name: String,
    },

    /// The handler reported a failure.
    #[error("{source}")]
    Handler {
        /// Error returned by the handler.
        #[source]
        source: HandlerError,
    },

    /// The handler panicked.
    #[error("handler panicked: {message}")]
    HandlerPanicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

impl DispatchError {
    /// Creates an invalid JSON error from a parser error.
    pub fn invalid_json(source: serde_json::Error) -> Self {
        Self::InvalidJson { source }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Wraps a handler failure.
    pub fn handler(source: HandlerError) -> Self {
        Self::Handler { source }
    }

    /// Records a handler panic.
    pub fn handler_panicked(message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            message: message.into(),
        }
    }

    /// Returns `true` when the request itself was at fault rather than the
    /// handler.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson { .. }
                | Self::MissingCommand
                | Self::InvalidParams
                | Self::UnknownCommand { .. }
        )
    }
}
