//! TCP transport for a single request/response exchange.
//!
//! The server writes responses back-to-back with no delimiter, so the client
//! keeps reading until the framing engine yields one complete object.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use hostlink_protocol::FrameDecoder;

use crate::errors::AppError;

const READ_CHUNK: usize = 4096;

pub(crate) fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, AppError> {
    let endpoint = format!("{host}:{port}");
    let address = resolve_tcp_address(host, port).map_err(|source| AppError::Resolve {
        endpoint: endpoint.clone(),
        source,
    })?;
    let stream = TcpStream::connect_timeout(&address, timeout)
        .map_err(|source| AppError::Connect { endpoint, source })?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(AppError::ReadResponse)?;
    Ok(stream)
}

/// Writes `request` and returns the first complete response frame.
pub(crate) fn exchange<S>(stream: &mut S, request: &[u8], timeout: Duration) -> Result<Vec<u8>, AppError>
where
    S: Read + Write,
{
    stream.write_all(request).map_err(AppError::SendRequest)?;
    stream.flush().map_err(AppError::SendRequest)?;

    let mut decoder = FrameDecoder::new();
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        if let Some(frame) = decoder.next_frame() {
            return Ok(frame);
        }
        match stream.read(&mut chunk) {
            Ok(0) => return Err(AppError::Truncated),
            Ok(count) => decoder.extend(&chunk[..count]),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(AppError::TimedOut {
                    timeout_ms: timeout.as_millis(),
                });
            }
            Err(error) => return Err(AppError::ReadResponse(error)),
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
