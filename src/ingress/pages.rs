//! Front-end pages and assets served from the static directory.
//!
//! Only three named pages exist (`index.html`, `message.html`,
//! `error.html`); everything else under `/front-init/` is passed through with
//! a MIME type guessed from the file extension.

use std::path::{Component, Path, PathBuf};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

pub const INDEX_PAGE: &str = "index.html";
pub const MESSAGE_PAGE: &str = "message.html";
pub const ERROR_PAGE: &str = "error.html";

const HTML: &str = "text/html";

#[derive(Debug, Clone)]
pub struct Pages {
    root: PathBuf,
}

impl Pages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A named page: 200 with its content, 500 if the backing file is gone.
    pub async fn page(&self, name: &str) -> Response {
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, HTML)], body).into_response(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "named page unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error: File not found",
                )
                    .into_response()
            }
        }
    }

    /// A file below the static root, addressed by its relative path.
    pub async fn asset(&self, relative: &str) -> Response {
        let Some(path) = self.resolve(relative) else {
            warn!(path = relative, "rejected asset path");
            return self.not_found().await;
        };

        match tokio::fs::read(&path).await {
            Ok(body) => {
                let mime = mime_guess::from_path(&path).first_or_text_plain();
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                    body,
                )
                    .into_response()
            }
            Err(_) => self.not_found().await,
        }
    }

    /// 404 with the error page, or a plain body when that page is missing too.
    pub async fn not_found(&self) -> Response {
        match tokio::fs::read(self.root.join(ERROR_PAGE)).await {
            Ok(body) => (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, HTML)], body).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }

    /// Joins `relative` onto the root, refusing anything that could leave it.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative.as_os_str().is_empty() {
            return None;
        }
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}
