use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::RelaySettings;
use crate::utils::error::ForwardError;

/// Sends raw form bodies to the relay, one fresh connection per submission.
///
/// Fire-and-forget: the body is written unmodified, the write half is shut
/// down and nothing is read back.
#[derive(Debug, Clone)]
pub struct RelayForwarder {
    addr: String,
    connect_timeout: Duration,
}

impl RelayForwarder {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
        }
    }

    pub fn from_settings(settings: &RelaySettings) -> Self {
        Self::new(
            settings.forward_addr(),
            Duration::from_millis(settings.connect_timeout_ms),
        )
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn forward(&self, body: &[u8]) -> Result<(), ForwardError> {
        let mut stream = match timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ForwardError::Connect {
                    addr: self.addr.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(ForwardError::Timeout {
                    addr: self.addr.clone(),
                });
            }
        };

        stream.write_all(body).await?;
        stream.shutdown().await?;
        Ok(())
    }
}
