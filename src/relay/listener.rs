//! Relay listener
//!
//! Accepts one connection at a time on a small listen backlog, reads a single
//! buffer, decodes it and hands the resulting record to the `MessageWriter`.
//! Per connection the flow is
//! `ACCEPTED -> READ -> (PARSED | MALFORMED) -> CLOSED`; nothing that happens
//! to one connection stops the accept loop.
//!
//! Known limits:
//! - Only the first `buffer_size` bytes are read. Longer payloads are cut.
//! - Without `read_timeout_ms` a client that connects and stays silent blocks
//!   the relay until it disconnects.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::payload::parse_payload;
use crate::config::RelaySettings;
use crate::persistence::{DocumentId, MessageRecord, MessageWriter, ReceiptClock};
use crate::utils::error::{PayloadError, RelayError};

/// Final state of one relay connection.
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The client closed without sending anything.
    Empty,
    Stored(DocumentId),
    /// Parsed, but the writer could not store it.
    NotStored,
    Malformed(PayloadError),
    ReadFailed,
    ReadTimedOut,
}

pub struct RelayListener {
    listener: TcpListener,
    writer: MessageWriter,
    clock: ReceiptClock,
    buffer_size: usize,
    read_timeout: Option<Duration>,
}

impl RelayListener {
    pub async fn bind(settings: &RelaySettings, writer: MessageWriter) -> Result<Self, RelayError> {
        let addr = settings.bind_addr();
        let listener = listen(&addr, settings.backlog)
            .await
            .map_err(|source| RelayError::Bind {
                addr: addr.clone(),
                source,
            })?;

        Ok(Self {
            listener,
            writer,
            clock: ReceiptClock::new(),
            buffer_size: settings.buffer_size.max(1),
            read_timeout: settings.read_timeout_ms.map(Duration::from_millis),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn writer(&self) -> &MessageWriter {
        &self.writer
    }

    pub async fn run(self) {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serves connections sequentially until `shutdown` resolves.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        match self.local_addr() {
            Ok(addr) => info!("Relay listening on tcp://{addr}"),
            Err(e) => warn!(error = %e, "relay listening on unknown address"),
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("relay shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let outcome = self.handle_connection(stream).await;
                        debug!(%peer, ?outcome, "relay connection closed");
                    }
                    Err(e) => {
                        warn!(error = %e, "relay accept failed");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        }
    }

    /// Processes one accepted connection. The stream is closed on return.
    pub async fn handle_connection(&mut self, mut stream: TcpStream) -> ConnectionOutcome {
        let mut buf = vec![0u8; self.buffer_size];

        let read = match self.read_timeout {
            Some(limit) => match timeout(limit, stream.read(&mut buf)).await {
                Ok(read) => read,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "relay client sent nothing in time");
                    return ConnectionOutcome::ReadTimedOut;
                }
            },
            None => stream.read(&mut buf).await,
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "relay read failed");
                return ConnectionOutcome::ReadFailed;
            }
        };

        if n == 0 {
            return ConnectionOutcome::Empty;
        }

        let received_at = self.clock.now();

        if n == buf.len() {
            warn!(limit = n, "payload filled the relay buffer, anything after it was not read");
        }

        let submission = match parse_payload(&buf[..n]) {
            Ok(submission) => submission,
            Err(e) => {
                warn!(error = %e, bytes = n, "dropping malformed relay payload");
                return ConnectionOutcome::Malformed(e);
            }
        };

        let record = MessageRecord::new(received_at, submission.username, submission.message);
        match self.writer.save(&record).await {
            Ok(id) => ConnectionOutcome::Stored(id),
            Err(e) => {
                error!(error = %e, username = %record.username, "message not stored");
                ConnectionOutcome::NotStored
            }
        }
    }
}

async fn listen(addr: &str, backlog: u32) -> io::Result<TcpListener> {
    let mut last_error = None;

    for resolved in tokio::net::lookup_host(addr).await? {
        let socket = if resolved.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;

        match socket.bind(resolved) {
            Ok(()) => return socket.listen(backlog.max(1)),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, format!("{addr} did not resolve"))
    }))
}
