//! Turns framed request bytes into response envelopes.
//!
//! Every frame produces exactly one [`Response`](hostlink_protocol::Response).
//! Failures at each stage map to a fixed message:
//!
//! | Stage                       | Message                            |
//! |-----------------------------|------------------------------------|
//! | frame is not JSON           | `invalid json`                     |
//! | no string `command` field   | `missing command`                  |
//! | `params` is not an object   | `invalid params: expected object`  |
//! | name has no handler         | `unknown command: <name>`          |
//! | handler returned an error   | the error's display text           |
//! | handler panicked            | `handler panicked: <payload>`      |

mod dispatcher;
mod errors;
mod panic;
mod request;

pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
