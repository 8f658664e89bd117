//! Tick-driven command server.
//!
//! A [`Server`] owns the listener, the active connection set and the handler
//! registry. All I/O happens inside [`Server::tick`], which never blocks:
//!
//! 1. accept every pending connection;
//! 2. for each connection, read what is available, frame it, dispatch each
//!    frame and queue the response, then flush queued output;
//! 3. sweep connections whose idle time reached the client timeout.
//!
//! A fault on one connection evicts only that connection. Only a broken
//! listening socket stops the server.

mod errors;
mod ticker;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hostlink_config::Config;
use hostlink_protocol::Response;
use tracing::{debug, info, warn};

use crate::connection::{Connection, EvictionReason, ReadOutcome};
use crate::dispatch::Dispatcher;
use crate::registry::{CommandContext, CommandHandler, HandlerRegistry, Registration};
use crate::transport::{Acceptor, CommandListener};

pub use self::errors::ServerError;
pub use self::ticker::{IntervalTicker, TickSource};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Upper bound on reads from one connection within a single tick.
pub const MAX_READS_PER_TICK: usize = 16;

/// Emits at `info` when verbose logging is enabled, `debug` otherwise.
macro_rules! activity {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!(target: SERVER_TARGET, $($arg)+);
        } else {
            debug!(target: SERVER_TARGET, $($arg)+);
        }
    };
}

/// Multiplexes many clients on the caller's thread.
#[derive(Debug)]
pub struct Server {
    config: Config,
    dispatcher: Dispatcher,
    listener: Option<Box<dyn Acceptor>>,
    connections: Vec<Connection>,
    scratch: Vec<u8>,
    frame_limit: usize,
}

impl Server {
    /// Creates a stopped server with no handlers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, HandlerRegistry::new())
    }

    /// Creates a stopped server dispatching to `registry`.
    #[must_use]
    pub fn with_registry(config: Config, registry: HandlerRegistry) -> Self {
        let receive_buffer_size = config.receive_buffer_size().max(1);
        Self {
            frame_limit: receive_buffer_size.saturating_mul(2),
            scratch: vec![0; receive_buffer_size],
            config,
            dispatcher: Dispatcher::new(registry),
            listener: None,
            connections: Vec::new(),
        }
    }

    /// Overrides the unframed-byte limit, which defaults to twice the
    /// receive buffer size.
    #[must_use]
    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Configuration the server was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Unframed-byte limit above which a connection is evicted.
    #[must_use]
    pub const fn frame_limit(&self) -> usize {
        self.frame_limit
    }

    /// Binds the listener on the loopback interface.
    ///
    /// Returns the bound address, which differs from the configured port
    /// when port 0 was requested.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] if the server is running and
    /// [`ServerError::Listener`] if binding fails. In both cases the
    /// running state is unchanged.
    pub fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if let Some(listener) = &self.listener {
            return Err(ServerError::AlreadyRunning {
                addr: listener.local_addr(),
            });
        }
        let listener = CommandListener::bind(self.config.port())
            .map_err(|source| ServerError::Listener { source })?;
        Ok(self.attach(Box::new(listener)))
    }

    /// Installs a bound listener and marks the server as running.
    pub(crate) fn attach(&mut self, listener: Box<dyn Acceptor>) -> SocketAddr {
        let addr = listener.local_addr();
        self.listener = Some(listener);
        info!(
            target: SERVER_TARGET,
            %addr,
            client_timeout_ms = self.config.client_timeout().as_millis(),
            receive_buffer_size = self.config.receive_buffer_size(),
            "command server listening"
        );
        addr
    }

    /// Evicts every connection and closes the listener.
    ///
    /// Queued responses that have not been written are discarded. Calling
    /// `stop` on a stopped server does nothing.
    pub fn stop(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let verbose = self.config.verbose();
        for connection in self.connections.drain(..) {
            log_eviction(&connection, &EvictionReason::Shutdown, verbose);
        }
        info!(
            target: SERVER_TARGET,
            addr = %listener.local_addr(),
            "command server stopped"
        );
    }

    /// Returns `true` between a successful [`start`](Self::start) and the
    /// next [`stop`](Self::stop).
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Bound listener address while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|listener| listener.local_addr())
    }

    /// Registered handlers.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }

    /// Mutable registry access. Changes apply from the next dispatched frame.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        self.dispatcher.registry_mut()
    }

    /// Registers `handler` under the registry's duplicate policy.
    pub fn register_handler<H>(&mut self, handler: H) -> Registration
    where
        H: CommandHandler + 'static,
    {
        self.handlers_mut().register(handler)
    }

    /// Removes the handler for `name`, returning it if one was registered.
    pub fn unregister_handler(&mut self, name: &str) -> Option<Box<dyn CommandHandler>> {
        self.handlers_mut().unregister(name)
    }

    /// Number of active connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Remote addresses of the active connections, in accept order.
    #[must_use]
    pub fn peers(&self) -> Vec<SocketAddr> {
        self.connections.iter().map(Connection::peer).collect()
    }

    /// Runs one scheduler tick covering `delta` of elapsed time.
    ///
    /// A tick on a stopped server does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ListenerFailure`] when accepting fails for a
    /// reason other than "nothing pending" or a client abort. The server
    /// has already been stopped when this is returned.
    pub fn tick(&mut self, delta: Duration) -> Result<(), ServerError> {
        let Some(listener) = &self.listener else {
            return Ok(());
        };
        let accepted = match listener.accept_pending() {
            Ok(accepted) => accepted,
            Err(source) => {
                warn!(target: SERVER_TARGET, error = %source, "listener failed; stopping");
                self.stop();
                return Err(ServerError::ListenerFailure { source });
            }
        };

        let verbose = self.config.verbose();
        for (stream, peer) in accepted {
            activity!(verbose, %peer, "client connected");
            self.connections.push(Connection::new(stream, peer));
        }

        self.service_connections(verbose);
        self.sweep_timeouts(delta, verbose);
        Ok(())
    }

    /// Ticks until `shutdown` is raised or the listener fails, then stops.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotRunning`] if the server was never started
    /// and [`ServerError::ListenerFailure`] if the listener broke.
    pub fn run<T>(&mut self, ticker: &mut T, shutdown: &AtomicBool) -> Result<(), ServerError>
    where
        T: TickSource + ?Sized,
    {
        if !self.is_running() {
            return Err(ServerError::NotRunning);
        }
        while !shutdown.load(Ordering::Relaxed) {
            let delta = ticker.next_tick();
            self.tick(delta)?;
        }
        self.stop();
        Ok(())
    }

    fn service_connections(&mut self, verbose: bool) {
        let Self {
            connections,
            dispatcher,
            scratch,
            frame_limit,
            ..
        } = self;
        let frame_limit = *frame_limit;
        connections.retain_mut(|connection| {
            match service(connection, dispatcher, scratch.as_mut_slice(), frame_limit, verbose) {
                Ok(()) => true,
                Err(reason) => {
                    log_eviction(connection, &reason, verbose);
                    false
                }
            }
        });
    }

    fn sweep_timeouts(&mut self, delta: Duration, verbose: bool) {
        let timeout = self.config.client_timeout();
        self.connections.retain_mut(|connection| {
            connection.age(delta);
            if connection.idle() >= timeout {
                log_eviction(connection, &EvictionReason::TimedOut, verbose);
                false
            } else {
                true
            }
        });
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reads, frames, dispatches and flushes for one connection.
fn service(
    connection: &mut Connection,
    dispatcher: &Dispatcher,
    scratch: &mut [u8],
    frame_limit: usize,
    verbose: bool,
) -> Result<(), EvictionReason> {
    for _ in 0..MAX_READS_PER_TICK {
        match connection.read_into(scratch) {
            Ok(ReadOutcome::Data(_)) => {
                respond(connection, dispatcher, verbose);
                let buffered = connection.unframed();
                if buffered > frame_limit {
                    return Err(EvictionReason::Oversized {
                        buffered,
                        limit: frame_limit,
                    });
                }
            }
            Ok(ReadOutcome::Pending) => break,
            Ok(ReadOutcome::Closed) => {
                // A half-closed peer can still receive what it asked for.
                if let Err(error) = connection.flush() {
                    debug!(
                        target: SERVER_TARGET,
                        peer = %connection.peer(),
                        %error,
                        "flush before close failed"
                    );
                }
                return Err(EvictionReason::Closed);
            }
            Err(error) => return Err(EvictionReason::ReadFailed(error)),
        }
    }
    connection
        .flush()
        .map(drop)
        .map_err(EvictionReason::WriteFailed)
}

/// Dispatches every complete frame and queues the responses in order.
fn respond(connection: &mut Connection, dispatcher: &Dispatcher, verbose: bool) {
    let context = CommandContext::new(connection.peer());
    while let Some(frame) = connection.next_frame() {
        let response = dispatcher.dispatch(&frame, &context);
        activity!(
            verbose,
            peer = %context.peer(),
            request_bytes = frame.len(),
            ok = response.is_ok(),
            "handled request"
        );
        connection.queue(&encode(&response));
    }
}

fn encode(response: &Response) -> Vec<u8> {
    match response.to_frame() {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(target: SERVER_TARGET, %error, "failed to serialise response");
            br#"{"status":"error","message":"failed to serialise response"}"#.to_vec()
        }
    }
}

fn log_eviction(connection: &Connection, reason: &EvictionReason, verbose: bool) {
    let peer = connection.peer();
    if reason.is_routine() {
        activity!(verbose, %peer, %reason, "client disconnected");
    } else {
        warn!(
            target: SERVER_TARGET,
            %peer,
            %reason,
            unsent_bytes = connection.pending_output(),
            "evicting client"
        );
    }
}
