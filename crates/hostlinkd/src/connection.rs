//! Per-client connection state.
//!
//! A [`Connection`] is the sole owner of its socket. The server's active set
//! owns every connection, and removing one from the set drops it, which
//! closes the socket exactly once.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use hostlink_protocol::FrameDecoder;

/// Result of one non-blocking read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// Bytes were appended to the receive buffer.
    Data(usize),
    /// Nothing is available right now.
    Pending,
    /// The peer performed an orderly close.
    Closed,
}

/// One accepted client.
#[derive(Debug)]
pub(crate) struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    idle: Duration,
    read_this_tick: bool,
    inbound: FrameDecoder,
    outbound: Vec<u8>,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            idle: Duration::ZERO,
            read_this_tick: false,
            inbound: FrameDecoder::new(),
            outbound: Vec::new(),
        }
    }

    pub(crate) const fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) const fn idle(&self) -> Duration {
        self.idle
    }

    /// Closes out a tick by adding its elapsed time to the idle accumulator.
    ///
    /// A connection that read data during the tick stays at zero, so a
    /// client that just spoke is never timed out by the same tick.
    pub(crate) fn age(&mut self, delta: Duration) {
        if std::mem::take(&mut self.read_this_tick) {
            return;
        }
        self.idle = self.idle.saturating_add(delta);
    }

    /// Reads once into `scratch` and appends whatever arrived.
    ///
    /// A successful non-empty read resets the idle accumulator.
    pub(crate) fn read_into(&mut self, scratch: &mut [u8]) -> io::Result<ReadOutcome> {
        loop {
            match self.stream.read(scratch) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(count) => {
                    self.inbound.extend(&scratch[..count]);
                    self.idle = Duration::ZERO;
                    self.read_this_tick = true;
                    return Ok(ReadOutcome::Data(count));
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadOutcome::Pending);
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    pub(crate) fn next_frame(&mut self) -> Option<Vec<u8>> {
        self.inbound.next_frame()
    }

    /// Bytes received but not yet part of a complete frame.
    pub(crate) fn unframed(&self) -> usize {
        self.inbound.buffered()
    }

    /// Queues serialised response bytes for delivery.
    pub(crate) fn queue(&mut self, bytes: &[u8]) {
        self.outbound.extend_from_slice(bytes);
    }

    pub(crate) fn pending_output(&self) -> usize {
        self.outbound.len()
    }

    /// Writes as much queued output as the socket accepts without blocking.
    ///
    /// Unsent bytes stay queued for the next tick.
    pub(crate) fn flush(&mut self) -> io::Result<usize> {
        let mut written = 0;
        while written < self.outbound.len() {
            match self.stream.write(&self.outbound[written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "socket accepted no bytes",
                    ));
                }
                Ok(count) => written += count,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
        self.outbound.drain(..written);
        Ok(written)
    }
}

/// Why a connection left the active set.
#[derive(Debug)]
pub(crate) enum EvictionReason {
    /// The peer closed its end of the stream.
    Closed,
    /// Reading from the socket failed.
    ReadFailed(io::Error),
    /// Unframed input grew past the configured limit.
    Oversized { buffered: usize, limit: usize },
    /// Writing queued output failed.
    WriteFailed(io::Error),
    /// No successful read within the client timeout.
    TimedOut,
    /// The server is stopping.
    Shutdown,
}

impl EvictionReason {
    /// Routine lifecycle events as opposed to faults.
    pub(crate) const fn is_routine(&self) -> bool {
        matches!(self, Self::Closed | Self::TimedOut | Self::Shutdown)
    }
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => formatter.write_str("peer closed the connection"),
            Self::ReadFailed(error) => write!(formatter, "read failed: {error}"),
            Self::Oversized { buffered, limit } => write!(
                formatter,
                "{buffered} unframed bytes exceed the {limit} byte limit"
            ),
            Self::WriteFailed(error) => write!(formatter, "write failed: {error}"),
            Self::TimedOut => formatter.write_str("client timed out"),
            Self::Shutdown => formatter.write_str("server stopping"),
        }
    }
}
