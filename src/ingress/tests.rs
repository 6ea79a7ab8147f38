use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tempfile::{TempDir, tempdir};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

use super::{IngressState, Pages, RelayForwarder, router};

fn static_root() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(dir.path().join("message.html"), "<form method=post></form>").unwrap();
    fs::write(dir.path().join("error.html"), "<h1>lost</h1>").unwrap();
    fs::create_dir_all(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css/style.css"), "body { margin: 0 }").unwrap();
    dir
}

fn state(relay_addr: &str, root: &TempDir) -> Arc<IngressState> {
    Arc::new(IngressState {
        forwarder: RelayForwarder::new(relay_addr, Duration::from_millis(500)),
        pages: Pages::new(root.path()),
    })
}

/// Accepts a single relay connection and reports everything it received.
async fn fake_relay() -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        let _ = tx.send(received);
    });

    (addr, rx)
}

/// An address nothing listens on.
async fn dead_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

async fn get(state: Arc<IngressState>, uri: &str) -> Response {
    router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(state: Arc<IngressState>, uri: &str, body: &'static str) -> Response {
    router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_post_forwards_body_verbatim_and_redirects() {
    let root = static_root();
    let (addr, received) = fake_relay().await;

    let response = post(state(&addr, &root), "/", "username=O%27Brien&message=hi+there").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(
        received.await.unwrap(),
        b"username=O%27Brien&message=hi+there".to_vec()
    );
}

#[tokio::test]
async fn test_post_on_any_path_forwards() {
    let root = static_root();

    for uri in ["/message", "/somewhere/else", "/front-init/css/style.css"] {
        let (addr, received) = fake_relay().await;
        let response = post(state(&addr, &root), uri, "username=alice").await;

        assert_eq!(response.status(), StatusCode::FOUND, "POST {uri}");
        assert_eq!(received.await.unwrap(), b"username=alice".to_vec());
    }
}

#[tokio::test]
async fn test_post_redirects_when_relay_is_down() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = post(state(&addr, &root), "/", "username=alice").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_get_named_pages() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(body_text(response).await, "<h1>home</h1>");

    let response = get(state(&addr, &root), "/message").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<form method=post></form>");
}

#[tokio::test]
async fn test_missing_named_page_is_server_error() {
    let root = static_root();
    fs::remove_file(root.path().join("message.html")).unwrap();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/message").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_text(response).await,
        "Internal Server Error: File not found"
    );
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/nonexistent").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "<h1>lost</h1>");
}

#[tokio::test]
async fn test_not_found_without_error_page() {
    let root = static_root();
    fs::remove_file(root.path().join("error.html")).unwrap();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/nonexistent").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not Found");
}

#[tokio::test]
async fn test_static_asset_with_guessed_mime() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/front-init/css/style.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/css");
    assert_eq!(body_text(response).await, "body { margin: 0 }");
}

#[tokio::test]
async fn test_static_asset_unknown_extension_is_text() {
    let root = static_root();
    fs::write(root.path().join("notes.zzunknown"), "plain").unwrap();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/front-init/notes.zzunknown").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/plain");
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/front-init/missing.js").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_asset_path_cannot_escape_root() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = get(state(&addr, &root), "/front-init/../index.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(state(&addr, &root), "/front-init/css/../../index.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    let root = static_root();
    let addr = dead_relay().await;

    let response = router(state(&addr, &root))
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
