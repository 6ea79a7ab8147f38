use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::forward::RelayForwarder;
use super::pages::{INDEX_PAGE, MESSAGE_PAGE, Pages};
use crate::config::Settings;

/// Everything the HTTP tier needs. Holds no connection to the datastore.
#[derive(Debug, Clone)]
pub struct IngressState {
    pub forwarder: RelayForwarder,
    pub pages: Pages,
}

impl IngressState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            forwarder: RelayForwarder::from_settings(&settings.relay),
            pages: Pages::new(&settings.http.static_dir),
        }
    }
}

/// `GET` serves pages and assets; `POST` on any path forwards the body to the relay.
pub fn router(state: Arc<IngressState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/message", get(message_page).post(submit))
        .route("/front-init/{*path}", get(asset).post(submit))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<IngressState>>) -> Response {
    state.pages.page(INDEX_PAGE).await
}

async fn message_page(State(state): State<Arc<IngressState>>) -> Response {
    state.pages.page(MESSAGE_PAGE).await
}

async fn asset(State(state): State<Arc<IngressState>>, Path(path): Path<String>) -> Response {
    state.pages.asset(&path).await
}

async fn submit(State(state): State<Arc<IngressState>>, body: Bytes) -> Response {
    forward_and_redirect(&state, &body).await
}

async fn fallback(
    State(state): State<Arc<IngressState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method == Method::POST {
        forward_and_redirect(&state, &body).await
    } else if method == Method::GET || method == Method::HEAD {
        state.pages.not_found().await
    } else {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    }
}

/// The browser is redirected home whatever happens downstream; a relay that
/// cannot be reached is only visible in the logs.
async fn forward_and_redirect(state: &IngressState, body: &[u8]) -> Response {
    match state.forwarder.forward(body).await {
        Ok(()) => info!(
            bytes = body.len(),
            relay = state.forwarder.addr(),
            "submission sent to relay"
        ),
        Err(e) => error!(error = %e, bytes = body.len(), "submission not forwarded"),
    }

    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}
