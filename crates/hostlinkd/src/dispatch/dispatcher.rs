//! Routes parsed requests to registered handlers.

use std::panic::{self, AssertUnwindSafe};

use hostlink_protocol::{Request, Response};
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::DispatchError;
use super::panic::PanicMessage;
use super::request::parse_request;
use super::DISPATCH_TARGET;
use crate::registry::{CommandContext, HandlerRegistry};

/// Executes framed requests against a [`HandlerRegistry`].
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Registered handlers.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Mutable access for registering or removing handlers.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Produces the response for one frame. Never fails.
    pub fn dispatch(&self, frame: &[u8], context: &CommandContext) -> Response {
        match self.execute(frame, context) {
            Ok(result) => Response::ok(result),
            Err(error) => {
                if error.is_client_error() {
                    debug!(
                        target: DISPATCH_TARGET,
                        peer = %context.peer(),
                        %error,
                        "rejected request"
                    );
                } else {
                    warn!(
                        target: DISPATCH_TARGET,
                        peer = %context.peer(),
                        %error,
                        "command failed"
                    );
                }
                Response::error(error.to_string())
            }
        }
    }

    /// Parses `frame` and invokes the matching handler.
    ///
    /// Handler panics are caught and reported as
    /// [`DispatchError::HandlerPanicked`]; they never unwind into the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] describing why no result was produced.
    pub fn execute(&self, frame: &[u8], context: &CommandContext) -> Result<Value, DispatchError> {
        let Request { command, params } = parse_request(frame)?;
        let handler = self
            .registry
            .get(&command)
            .ok_or_else(|| DispatchError::unknown_command(&command))?;

        debug!(
            target: DISPATCH_TARGET,
            peer = %context.peer(),
            command = %command,
            "dispatching request"
        );

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&params, context))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(source)) => Err(DispatchError::handler(source)),
            Err(payload) => Err(DispatchError::handler_panicked(
                PanicMessage::new(payload).to_string(),
            )),
        }
    }
}
