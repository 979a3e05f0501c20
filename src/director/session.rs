//! A single conversation with the director.
//!
//! # Responsibilities
//! - Perform the version handshake before anything else
//! - Send directives and read replies with a bounded wait
//! - Release the socket on every exit path
//!
//! # Design Decisions
//! - Generic over the byte stream so tests can drive it through an in-memory pipe
//! - `HOST-SET` and `HOST-FLUSH` are fire-and-forget; no acknowledgement is read
//! - Dropping a session closes the socket; `close` additionally shuts down the write side

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time;

use crate::director::error::DirectorError;
use crate::director::protocol::{self, HostRecord, END_OF_LIST, HOST_LIST, VERSION_LINE};

/// An open, handshaken director session.
#[derive(Debug)]
pub struct Session<S> {
    stream: BufReader<S>,
    timeout: Duration,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Send the version line over `stream` and require it echoed back verbatim.
    ///
    /// On failure the stream is dropped, closing the underlying socket.
    pub async fn handshake(stream: S, timeout: Duration) -> Result<Self, DirectorError> {
        let mut session = Self {
            stream: BufReader::new(stream),
            timeout,
        };

        session.send(VERSION_LINE).await?;
        let reply = session.read_line().await?;
        if reply != VERSION_LINE.as_bytes() {
            return Err(DirectorError::Handshake {
                expected: VERSION_LINE.trim_end().to_string(),
                received: String::from_utf8_lossy(&reply).trim_end().to_string(),
            });
        }

        tracing::trace!("Director handshake complete");
        Ok(session)
    }

    /// Fetch the director's host table.
    ///
    /// Reads records until the empty terminator line. Malformed records,
    /// including ones that are not valid UTF-8, are skipped.
    pub async fn list_hosts(&mut self) -> Result<Vec<HostRecord>, DirectorError> {
        self.send(HOST_LIST).await?;

        let mut hosts = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == END_OF_LIST.as_bytes() {
                break;
            }
            match std::str::from_utf8(&line).ok().and_then(HostRecord::parse) {
                Some(record) => hosts.push(record),
                None => tracing::debug!(
                    line = %String::from_utf8_lossy(&line).trim_end(),
                    "Dropping malformed host record"
                ),
            }
        }

        Ok(hosts)
    }

    /// Set `host`'s weight.
    pub async fn set_weight(&mut self, host: &str, weight: u32) -> Result<(), DirectorError> {
        self.send(&protocol::host_set(host, weight)).await
    }

    /// Drop the director's cached user assignments for `host`.
    pub async fn flush(&mut self, host: &str) -> Result<(), DirectorError> {
        self.send(&protocol::host_flush(host)).await
    }

    /// Shut down the write side and release the socket.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::trace!(error = %e, "Director session shutdown failed");
        }
    }

    async fn send(&mut self, line: &str) -> Result<(), DirectorError> {
        let timeout = self.timeout;
        let stream = &mut self.stream;
        let write = async {
            stream.write_all(line.as_bytes()).await?;
            stream.flush().await
        };
        time::timeout(timeout, write)
            .await
            .map_err(|_| DirectorError::Timeout(timeout))??;
        Ok(())
    }

    /// One raw LF-terminated line, terminator included.
    async fn read_line(&mut self) -> Result<Vec<u8>, DirectorError> {
        let timeout = self.timeout;
        let mut line = Vec::new();
        let read = time::timeout(timeout, self.stream.read_until(b'\n', &mut line))
            .await
            .map_err(|_| DirectorError::Timeout(timeout))??;
        if read == 0 {
            return Err(DirectorError::Closed);
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, DuplexStream};

    const TIMEOUT: Duration = Duration::from_secs(1);

    /// Read whatever the client has written so far.
    async fn drain(peer: &mut DuplexStream) -> String {
        let mut buf = vec![0u8; 4096];
        let n = peer.read(&mut buf).await.unwrap();
        String::from_utf8(buf[..n].to_vec()).unwrap()
    }

    #[tokio::test]
    async fn handshake_requires_exact_echo() {
        let (client, mut director) = duplex(4096);
        director.write_all(VERSION_LINE.as_bytes()).await.unwrap();

        let session = Session::handshake(client, TIMEOUT).await.unwrap();
        assert_eq!(drain(&mut director).await, VERSION_LINE);
        session.close().await;
    }

    #[tokio::test]
    async fn handshake_mismatch_is_rejected() {
        let (client, mut director) = duplex(4096);
        director
            .write_all(b"VERSION\tdirector-doveadm\t2\t0\n")
            .await
            .unwrap();

        match Session::handshake(client, TIMEOUT).await {
            Err(DirectorError::Handshake { received, .. }) => {
                assert_eq!(received, "VERSION\tdirector-doveadm\t2\t0");
            }
            other => panic!("expected handshake error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn silent_director_times_out() {
        let (client, _director) = duplex(4096);
        let result = Session::handshake(client, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(DirectorError::Timeout(_))));
    }

    #[tokio::test]
    async fn list_drops_malformed_records() {
        let (client, mut director) = duplex(4096);
        director.write_all(VERSION_LINE.as_bytes()).await.unwrap();
        let mut session = Session::handshake(client, TIMEOUT).await.unwrap();
        drain(&mut director).await;

        director
            .write_all(b"mail1\t0\t3\nbogus\nmail2\t100\t1\n\n")
            .await
            .unwrap();
        let hosts = session.list_hosts().await.unwrap();

        assert_eq!(drain(&mut director).await, HOST_LIST);
        let names: Vec<_> = hosts.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(names, vec!["mail1", "mail2"]);
        assert_eq!(hosts[1].weight, 100);
    }

    #[tokio::test]
    async fn list_drops_records_that_are_not_utf8() {
        let (client, mut director) = duplex(4096);
        director.write_all(VERSION_LINE.as_bytes()).await.unwrap();
        let mut session = Session::handshake(client, TIMEOUT).await.unwrap();

        director
            .write_all(b"mail1\t0\t3\nma\xffil9\t100\t1\nmail2\t100\t1\n\n")
            .await
            .unwrap();
        let hosts = session.list_hosts().await.unwrap();

        let names: Vec<_> = hosts.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(names, vec!["mail1", "mail2"]);
    }

    #[tokio::test]
    async fn list_without_terminator_is_closed() {
        let (client, mut director) = duplex(4096);
        director.write_all(VERSION_LINE.as_bytes()).await.unwrap();
        let mut session = Session::handshake(client, TIMEOUT).await.unwrap();

        director.write_all(b"mail1\t0\t3\n").await.unwrap();
        director.shutdown().await.unwrap();

        assert!(matches!(session.list_hosts().await, Err(DirectorError::Closed)));
    }

    #[tokio::test]
    async fn set_and_flush_write_directives() {
        let (client, mut director) = duplex(4096);
        director.write_all(VERSION_LINE.as_bytes()).await.unwrap();
        let mut session = Session::handshake(client, TIMEOUT).await.unwrap();
        drain(&mut director).await;

        session.set_weight("mail2", 0).await.unwrap();
        session.flush("mail2").await.unwrap();
        session.close().await;

        let mut written = String::new();
        director.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "HOST-SET\tmail2\t0\nHOST-FLUSH\tmail2\n");
    }
}
