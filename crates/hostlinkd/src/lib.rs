//! Host-side command server.
//!
//! `hostlinkd` exposes named commands to external tools over a TCP stream
//! of brace-delimited JSON objects. Many clients are multiplexed on one
//! thread: the [`Server`] does all of its work inside [`Server::tick`],
//! which accepts new clients, reads and frames whatever each client has
//! sent, dispatches each frame to a registered [`CommandHandler`], queues
//! the response and finally evicts clients that have been idle for longer
//! than the configured timeout.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use hostlink_config::Config;
//! use hostlinkd::{HandlerRegistry, IntervalTicker, Server, register_builtins};
//!
//! # fn main() -> Result<(), hostlinkd::ServerError> {
//! let config = Config::default();
//! let mut registry = HandlerRegistry::new();
//! register_builtins(&mut registry);
//!
//! let mut server = Server::with_registry(config.clone(), registry);
//! server.start()?;
//! let shutdown = AtomicBool::new(false);
//! server.run(&mut IntervalTicker::new(config.tick_interval()), &shutdown)?;
//! # Ok(())
//! # }
//! ```
//!
//! A failure while handling one message becomes an error response on that
//! connection; a failure on one connection evicts only that connection.
//! Only a broken listening socket stops the server.

mod bootstrap;
mod connection;
mod dispatch;
mod handlers;
mod health;
mod process;
mod registry;
mod server;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{DispatchError, Dispatcher};
pub use handlers::{EchoHandler, PingHandler, register_builtins};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, run_daemon};
pub use registry::{
    CommandContext, CommandHandler, FnCommand, HandlerError, HandlerRegistry, HandlerResult,
    Registration, RegistrationPolicy, command_fn,
};
pub use server::{IntervalTicker, MAX_READS_PER_TICK, Server, ServerError, TickSource};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
