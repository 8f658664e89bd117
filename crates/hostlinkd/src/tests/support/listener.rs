//! Listener double whose accept path can be broken on demand.

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::transport::{Acceptor, CommandListener, ListenerError};

/// Wraps a real loopback listener until its switch is flipped.
#[derive(Debug)]
pub struct BreakableListener {
    inner: CommandListener,
    broken: Arc<AtomicBool>,
}

impl BreakableListener {
    pub fn bind() -> Self {
        Self {
            inner: CommandListener::bind(0).expect("bind listener"),
            broken: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that makes every later accept fail.
    pub fn switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.broken)
    }
}

impl Acceptor for BreakableListener {
    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr()
    }

    fn accept_pending(&self) -> Result<Vec<(TcpStream, SocketAddr)>, ListenerError> {
        if self.broken.load(Ordering::Relaxed) {
            return Err(ListenerError::Accept {
                addr: self.inner.local_addr(),
                source: io::Error::other("listening socket went away"),
            });
        }
        self.inner.accept_pending()
    }
}
