//! The `ingress` module is the HTTP front door.
//!
//! Form submissions are forwarded verbatim to the relay over a fresh TCP
//! connection and answered with a redirect to `/`. The HTTP tier never sees
//! whether a message was parsed or stored.

pub mod forward;
pub mod pages;
pub mod routes;

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use forward::RelayForwarder;
pub use pages::Pages;
pub use routes::{IngressState, router};

/// Serves the ingress router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<IngressState>, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("HTTP server ready on http://{addr}");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests;
