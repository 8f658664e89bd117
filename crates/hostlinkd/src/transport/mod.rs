//! TCP listener for the command server.
//!
//! The listener is polled from the scheduler tick: it never blocks, and each
//! accepted stream is switched to non-blocking mode before it is handed to
//! the connection set.

mod errors;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::listener::{Acceptor, CommandListener};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
