//! Fake command server for CLI tests.
//!
//! Accepts a single connection, records the framed request and plays back a
//! canned reply, so the client can be exercised without a real daemon.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use hostlink_protocol::FrameDecoder;

/// What the fake server does once it has read the request.
#[derive(Debug, Clone)]
pub(in crate::tests) enum Reply {
    /// Writes each chunk separately, pausing briefly between them.
    Chunks(Vec<Vec<u8>>),
    /// Closes the connection without writing anything.
    Hangup,
    /// Holds the connection open without replying for the given duration.
    Stall(Duration),
}

impl Reply {
    /// Replies with `bytes` in one write.
    pub(in crate::tests) fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Chunks(vec![bytes.into()])
    }
}

pub(in crate::tests) struct FakeServer {
    port: u16,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeServer {
    /// Spawns a fake server on an ephemeral loopback port.
    pub(in crate::tests) fn spawn(reply: Reply) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || serve(&listener, &reply, &recorded));
        Ok(Self {
            port,
            requests,
            handle: Some(handle),
        })
    }

    pub(in crate::tests) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the server thread and returns the requests it saw.
    pub(in crate::tests) fn take_requests(&mut self) -> Result<Vec<Vec<u8>>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?
                .context("fake server failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(listener: &TcpListener, reply: &Reply, requests: &Mutex<Vec<Vec<u8>>>) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut stream = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(ref error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(5));
            }
            // The client gave up before connecting (for example a usage error).
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(error) => return Err(error).context("accept connection"),
        }
    };
    stream
        .set_nonblocking(false)
        .context("blocking accepted stream")?;

    let request = read_frame(&mut stream)?;
    requests
        .lock()
        .map_err(|error| anyhow!("lock requests: {error}"))?
        .push(request);

    match reply {
        Reply::Chunks(chunks) => {
            for chunk in chunks {
                stream.write_all(chunk).context("write reply")?;
                stream.flush().context("flush reply")?;
                thread::sleep(Duration::from_millis(5));
            }
        }
        Reply::Hangup => {}
        Reply::Stall(duration) => thread::sleep(*duration),
    }
    Ok(())
}

fn read_frame(stream: &mut TcpStream) -> Result<Vec<u8>> {
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .context("read timeout")?;
    let mut decoder = FrameDecoder::new();
    let mut chunk = [0_u8; 512];
    loop {
        if let Some(frame) = decoder.next_frame() {
            return Ok(frame);
        }
        let count = stream.read(&mut chunk).context("read request")?;
        if count == 0 {
            return Err(anyhow!("client closed before sending a request"));
        }
        decoder.extend(&chunk[..count]);
    }
}
