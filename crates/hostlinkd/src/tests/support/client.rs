//! Loopback client that interleaves its own I/O with manual server ticks.
//!
//! The server runs on the test thread, so every wait here is a loop of
//! "tick the server, then poll the socket" bounded by a wall-clock deadline.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use hostlink_protocol::{FrameDecoder, Response};

use crate::server::Server;

/// Simulated time that passes on each polling tick.
pub const STEP: Duration = Duration::from_millis(10);

const DEADLINE: Duration = Duration::from_secs(5);

/// Ticks `server` until `done` holds or the deadline passes.
pub fn tick_until(server: &mut Server, mut done: impl FnMut(&Server) -> bool) -> bool {
    let deadline = Instant::now() + DEADLINE;
    while Instant::now() < deadline {
        server.tick(STEP).expect("tick should succeed");
        if done(server) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

/// Client side of one test connection.
pub struct TestClient {
    stream: TcpStream,
    decoder: FrameDecoder,
}

impl TestClient {
    /// Connects and ticks until the server has accepted the connection.
    pub fn connect(server: &mut Server) -> Self {
        let addr = server.local_addr().expect("server should be running");
        let before = server.connection_count();
        let stream = TcpStream::connect(addr).expect("connect to server");
        stream.set_nonblocking(true).expect("non-blocking client");
        assert!(
            tick_until(server, |server| server.connection_count() > before),
            "server never accepted the connection"
        );
        Self {
            stream,
            decoder: FrameDecoder::new(),
        }
    }

    /// Writes raw bytes.
    pub fn send(&mut self, bytes: &[u8]) {
        let mut remaining = bytes;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(count) => remaining = &remaining[count..],
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(error) => panic!("client write failed: {error}"),
            }
        }
    }

    /// Writes raw bytes, ticking the server whenever the socket is full.
    pub fn send_ticking(&mut self, server: &mut Server, bytes: &[u8]) {
        let deadline = Instant::now() + DEADLINE;
        let mut remaining = bytes;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(count) => remaining = &remaining[count..],
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    assert!(Instant::now() < deadline, "server stopped reading");
                    server.tick(STEP).expect("tick should succeed");
                }
                Err(error) => panic!("client write failed: {error}"),
            }
        }
    }

    /// Ticks until one complete response frame has arrived.
    pub fn receive(&mut self, server: &mut Server) -> Response {
        let deadline = Instant::now() + DEADLINE;
        loop {
            if let Some(frame) = self.decoder.next_frame() {
                return Response::from_frame(&frame).expect("response should parse");
            }
            assert!(Instant::now() < deadline, "no response before deadline");
            server.tick(STEP).expect("tick should succeed");
            let closed = self.poll();
            if closed && self.decoder.is_empty() {
                panic!("server closed the connection without responding");
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Sends one frame and waits for its response.
    pub fn request(&mut self, server: &mut Server, frame: &[u8]) -> Response {
        self.send(frame);
        self.receive(server)
    }

    /// Ticks until the server closes this connection.
    pub fn wait_closed(&mut self, server: &mut Server) -> bool {
        let deadline = Instant::now() + DEADLINE;
        while Instant::now() < deadline {
            server.tick(STEP).expect("tick should succeed");
            if self.poll() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    /// Returns `true` if the connection has been closed by the server.
    pub fn is_closed(&mut self) -> bool {
        self.poll()
    }

    /// Reads whatever is available. Returns `true` on end of stream.
    fn poll(&mut self) -> bool {
        let mut chunk = [0_u8; 1024];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => return true,
                Ok(count) => self.decoder.extend(&chunk[..count]),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return false,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
                    ) =>
                {
                    return true;
                }
                Err(error) => panic!("client read failed: {error}"),
            }
        }
    }
}
