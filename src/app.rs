//! Service bootstrap shared by the CLI subcommands.
//!
//! The relay and the ingress are built independently: the relay owns the
//! datastore connector, the ingress only knows the relay's address.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Settings;
use crate::ingress::IngressState;
use crate::persistence::{Connector, MessageWriter};
use crate::relay::RelayListener;
use crate::utils::error::AppError;

/// Builds the connector, warms it up when configured to, and binds the relay.
///
/// With `connect_on_startup` an unreachable datastore fails here, after the
/// full retry budget, instead of on the first message.
pub async fn start_relay(settings: &Settings) -> Result<RelayListener, AppError> {
    let connector = Arc::new(Connector::from_settings(&settings.datastore)?);

    if settings.datastore.connect_on_startup {
        connector.get().await?;
    }

    let relay = RelayListener::bind(&settings.relay, MessageWriter::new(connector)).await?;
    Ok(relay)
}

pub async fn start_ingress(
    settings: &Settings,
) -> Result<(TcpListener, Arc<IngressState>), AppError> {
    let listener = TcpListener::bind(settings.http.bind_addr()).await?;
    let state = Arc::new(IngressState::from_settings(settings));
    info!(
        relay = state.forwarder.addr(),
        static_dir = %state.pages.root().display(),
        "ingress configured"
    );
    Ok((listener, state))
}

/// Runs the relay and the ingress side by side until `shutdown` resolves.
///
/// Both services are expected to run forever. If either one stops first the
/// whole process is treated as failed.
pub async fn run_services<R, I, S>(relay: R, ingress: I, shutdown: S) -> Result<(), AppError>
where
    R: Future<Output = ()> + Send + 'static,
    I: Future<Output = io::Result<()>> + Send + 'static,
    S: Future<Output = ()>,
{
    let mut relay_task = tokio::spawn(relay);
    let mut ingress_task = tokio::spawn(ingress);

    let result = tokio::select! {
        res = &mut relay_task => {
            error!(?res, "Relay exited unexpectedly.");
            Err(AppError::ServiceExited("relay"))
        }
        res = &mut ingress_task => {
            error!(?res, "HTTP server exited unexpectedly.");
            match res {
                Ok(Err(e)) => Err(AppError::Io(e)),
                _ => Err(AppError::ServiceExited("http server")),
            }
        }
        _ = shutdown => Ok(()),
    };

    relay_task.abort();
    ingress_task.abort();
    result
}
