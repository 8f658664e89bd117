//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A command invocation sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Name of the registered command to invoke.
    pub command: String,
    /// Parameters forwarded to the command handler.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Request {
    /// Builds a request for `command` with the given parameters.
    #[must_use]
    pub fn new(command: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Serialises the request as a single wire frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_frame(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Reply produced for every framed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The handler completed and produced a value.
    Ok {
        /// Handler output.
        result: Value,
    },
    /// The request could not be served.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl Response {
    /// Wraps a successful handler result.
    #[must_use]
    pub const fn ok(result: Value) -> Self {
        Self::Ok { result }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns `true` for `status: "ok"`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Serialises the response as a single wire frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_frame(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parses a response from one framed message.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a valid response envelope.
    pub fn from_frame(frame: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(frame)
    }
}
