//! Director client over the administrative unix socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::net::UnixStream;
use tokio::time;

use crate::config::DirectorConfig;
use crate::director::error::DirectorError;
use crate::director::protocol::HostRecord;
use crate::director::session::Session;
use crate::director::Director;

/// Opens one session per logical action against the director socket.
#[derive(Debug, Clone)]
pub struct DirectorClient {
    socket: PathBuf,
    timeout: Duration,
}

impl DirectorClient {
    pub fn new(socket: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket: socket.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DirectorConfig) -> Self {
        Self::new(config.socket.clone(), config.timeout())
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Connect and handshake.
    pub async fn connect(&self) -> Result<Session<UnixStream>, DirectorError> {
        let stream = time::timeout(self.timeout, UnixStream::connect(&self.socket))
            .await
            .map_err(|_| DirectorError::Timeout(self.timeout))?
            .map_err(|source| DirectorError::Connect {
                path: self.socket.clone(),
                source,
            })?;

        Session::handshake(stream, self.timeout).await
    }
}

impl Director for DirectorClient {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, DirectorError> {
        let mut session = self.connect().await?;
        let hosts = session.list_hosts().await?;
        session.close().await;
        Ok(hosts)
    }

    async fn enable(&self, host: &str, weight: u32) -> Result<(), DirectorError> {
        let mut session = self.connect().await?;
        session.set_weight(host, weight).await?;
        session.close().await;
        Ok(())
    }

    async fn disable(&self, host: &str) -> Result<(), DirectorError> {
        let mut session = self.connect().await?;
        session.set_weight(host, 0).await?;
        session.flush(host).await?;
        session.close().await;
        Ok(())
    }
}
