//! Non-blocking listener polled once per scheduler tick.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use tracing::{debug, warn};

use super::{LISTENER_TARGET, ListenerError};

/// Upper bound on connections accepted during a single tick.
const MAX_ACCEPTS_PER_TICK: usize = 32;

/// Source of newly connected clients, polled once per tick.
pub(crate) trait Acceptor: fmt::Debug + Send {
    /// Address the listener is bound to.
    fn local_addr(&self) -> SocketAddr;

    /// Accepts every connection that is already pending.
    ///
    /// An error means the listening socket is broken.
    fn accept_pending(&self) -> Result<Vec<(TcpStream, SocketAddr)>, ListenerError>;
}

/// Listener bound to the loopback interface.
#[derive(Debug)]
pub(crate) struct CommandListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl CommandListener {
    /// Binds `127.0.0.1:port` and switches the socket to non-blocking mode.
    pub(crate) fn bind(port: u16) -> Result<Self, ListenerError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener =
            TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            listener,
            local_addr,
        })
    }
}

impl Acceptor for CommandListener {
    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts every connection that is already pending, up to a per-tick cap.
    ///
    /// "Nothing pending" and client-side aborts are routine and yield an
    /// empty or shorter batch. Any other accept error means the listening
    /// socket is broken and is returned to the caller.
    fn accept_pending(&self) -> Result<Vec<(TcpStream, SocketAddr)>, ListenerError> {
        let mut accepted = Vec::new();
        while accepted.len() < MAX_ACCEPTS_PER_TICK {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(error) = stream.set_nonblocking(true) {
                        warn!(
                            target: LISTENER_TARGET,
                            %peer,
                            %error,
                            "dropping connection that cannot be made non-blocking"
                        );
                        continue;
                    }
                    accepted.push((stream, peer));
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) if is_transient(error.kind()) => {
                    debug!(
                        target: LISTENER_TARGET,
                        %error,
                        "client aborted before accept completed"
                    );
                }
                Err(source) => {
                    return Err(ListenerError::Accept {
                        addr: self.local_addr,
                        source,
                    });
                }
            }
        }
        Ok(accepted)
    }
}

fn is_transient(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}
