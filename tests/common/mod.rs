//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UnixListener};

pub const VERSION_LINE: &str = "VERSION\tdirector-doveadm\t1\t0\n";

/// A director speaking the admin protocol on a unix socket.
///
/// `HOST-SET` updates the listed weight, so repeated cycles see the effect
/// of earlier writes.
#[derive(Clone)]
#[allow(dead_code)]
pub struct MockDirector {
    pub path: PathBuf,
    /// Raw `HOST-LIST` reply lines, without the terminator.
    pub records: Arc<Mutex<Vec<String>>>,
    /// Every line received after a handshake, recorded once it has been applied.
    pub received: Arc<Mutex<Vec<String>>>,
    pub sessions: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockDirector {
    /// Received lines other than `HOST-LIST`.
    pub fn writes(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.as_str() != "HOST-LIST")
            .cloned()
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Writes seen so far, waiting up to two seconds for at least `count`.
    pub async fn wait_for_writes(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            let writes = self.writes();
            if writes.len() >= count {
                return writes;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.writes()
    }
}

/// Start a mock director at `dir/director-admin` answering the handshake with `version_reply`.
pub async fn start_mock_director(dir: &Path, records: &[&str], version_reply: &'static str) -> MockDirector {
    let path = dir.join("director-admin");
    let listener = UnixListener::bind(&path).unwrap();
    let director = MockDirector {
        path,
        records: Arc::new(Mutex::new(records.iter().map(|r| r.to_string()).collect())),
        received: Arc::new(Mutex::new(Vec::new())),
        sessions: Arc::new(AtomicUsize::new(0)),
    };

    let state = director.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                state.sessions.fetch_add(1, Ordering::SeqCst);
                let (read, mut write) = socket.into_split();
                let mut lines = BufReader::new(read).lines();

                if lines.next_line().await.ok().flatten().is_none() {
                    return;
                }
                if write.write_all(version_reply.as_bytes()).await.is_err() {
                    return;
                }

                while let Ok(Some(line)) = lines.next_line().await {
                    let fields: Vec<&str> = line.split('\t').collect();
                    match fields.as_slice() {
                        ["HOST-LIST"] => {
                            let mut reply = String::new();
                            for record in state.records.lock().unwrap().iter() {
                                reply.push_str(record);
                                reply.push('\n');
                            }
                            reply.push('\n');
                            let _ = write.write_all(reply.as_bytes()).await;
                        }
                        ["HOST-SET", host, weight] => {
                            for record in state.records.lock().unwrap().iter_mut() {
                                let parts: Vec<&str> = record.split('\t').collect();
                                if parts.len() == 3 && parts[0] == *host {
                                    *record = format!("{}\t{}\t{}", host, weight, parts[2]);
                                }
                            }
                        }
                        _ => {}
                    }
                    state.received.lock().unwrap().push(line.clone());
                }
            });
        }
    });

    director
}

/// Start a plain-text server on `addr` that sends `banner` to every client.
#[allow(dead_code)]
pub async fn start_banner_server(addr: SocketAddr, banner: &'static str) -> SocketAddr {
    let listener = TcpListener::bind(addr).await.unwrap();
    let local = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(banner.as_bytes()).await;
                tokio::time::sleep(Duration::from_millis(50)).await;
            });
        }
    });

    local
}

/// Start a TLS server with a throwaway self-signed certificate that sends
/// `banner` once the handshake completes.
#[allow(dead_code)]
pub async fn start_tls_banner_server(banner: &'static str) -> SocketAddr {
    use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert = CertificateDer::from(certified.cert.der().to_vec());
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![cert], key)
    .unwrap();
    let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(socket).await {
                    let _ = tls.write_all(banner.as_bytes()).await;
                    let _ = tls.flush().await;
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            });
        }
    });

    local
}

/// A port on 127.0.0.1 with nothing listening.
#[allow(dead_code)]
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
