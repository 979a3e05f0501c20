//! Single-port banner checks.
//!
//! # Responsibilities
//! - Connect to one backend port, optionally wrap it in TLS
//! - Require a banner line before the deadline
//!
//! # Design Decisions
//! - One deadline covers connect, handshake and banner read together
//! - A timeout is an ordinary failed check, not a fault
//! - The socket is owned by the check future and dropped on every exit path

use std::io;
use std::time::Duration;

use rustls::pki_types::ServerName;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::time;
use tokio_rustls::TlsConnector;

/// Why a port check failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("no banner within {0:?}")]
    Timeout(Duration),

    #[error("connection closed before a banner was sent")]
    NoBanner,

    #[error("banner read failed: {0}")]
    Read(#[source] io::Error),

    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),
}

/// Connect to `host:port` and wait for a banner line.
pub async fn check_plain(host: &str, port: u16, timeout: Duration) -> Result<String, ProbeError> {
    let check = async {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(ProbeError::Connect)?;
        read_banner(stream).await
    };

    time::timeout(timeout, check)
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

/// Connect to `host:port`, complete a TLS handshake and wait for a banner line.
pub async fn check_tls(
    host: &str,
    port: u16,
    timeout: Duration,
    connector: &TlsConnector,
) -> Result<String, ProbeError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ProbeError::Tls(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    let check = async {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(ProbeError::Connect)?;
        let stream = connector
            .connect(server_name, stream)
            .await
            .map_err(ProbeError::Tls)?;
        read_banner(stream).await
    };

    time::timeout(timeout, check)
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

async fn read_banner<S: AsyncRead + Unpin>(stream: S) -> Result<String, ProbeError> {
    let mut reader = BufReader::new(stream);
    let mut banner = Vec::new();
    let read = reader
        .read_until(b'\n', &mut banner)
        .await
        .map_err(ProbeError::Read)?;
    if read == 0 {
        return Err(ProbeError::NoBanner);
    }
    Ok(String::from_utf8_lossy(&banner).trim_end().to_string())
}
