//! Fake GitHub contents API server.
//!
//! Serves exactly one file behind Basic auth, with the same sha-based
//! optimistic locking the real contents API applies: a PUT carrying a stale
//! sha is rejected with 409 and leaves the stored content untouched.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use catalog_editor::catalog::{decode_document, encode_document, CatalogDocument};

use super::{ACCESS_TOKEN, CATALOG_PATH, OWNER, REPOSITORY};

struct StoredFile {
    /// Unwrapped base64 content, exactly as last written.
    content: String,
    sha: String,
    next_sha: u64,
}

struct RemoteState {
    expected_auth: String,
    file: Mutex<StoredFile>,
}

#[derive(Deserialize)]
struct UpdateFileBody {
    #[allow(dead_code)]
    message: String,
    content: String,
    sha: String,
}

/// Fake remote instance bound to a random local port.
///
/// Shuts down when dropped.
pub struct FakeRemote {
    pub base_url: String,
    state: Arc<RemoteState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeRemote {
    /// Spawns the fake remote serving `initial` at sha "sha-0".
    pub async fn spawn(initial: &CatalogDocument) -> Self {
        let state = Arc::new(RemoteState {
            expected_auth: format!("Basic {}", BASE64.encode(ACCESS_TOKEN.as_bytes())),
            file: Mutex::new(StoredFile {
                content: encode_document(initial),
                sha: "sha-0".to_string(),
                next_sha: 1,
            }),
        });

        let app = Router::new()
            .route(
                "/repos/{owner}/{repository}/contents/{*path}",
                get(get_contents).put(put_contents),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake remote failed");
        });

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Stops the server, leaving the port unreachable. Used to provoke
    /// transport failures mid-session.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn current_sha(&self) -> String {
        self.state.file.lock().unwrap().sha.clone()
    }

    /// Decodes and returns the currently stored document.
    pub fn current_document(&self) -> CatalogDocument {
        let content = self.state.file.lock().unwrap().content.clone();
        decode_document(&content).expect("stored content is not a valid document")
    }

    /// Simulates an external edit: replaces the content and advances the
    /// sha without going through the editor.
    pub fn overwrite(&self, document: &CatalogDocument) -> String {
        let mut file = self.state.file.lock().unwrap();
        file.content = encode_document(document);
        let sha = format!("sha-{}", file.next_sha);
        file.next_sha += 1;
        file.sha = sha.clone();
        sha
    }

    /// Replaces the stored content with something that is not a catalog.
    pub fn corrupt_content(&self, raw: &str) {
        self.state.file.lock().unwrap().content = raw.to_string();
    }
}

impl Drop for FakeRemote {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn check_request(
    state: &RemoteState,
    headers: &HeaderMap,
    owner: &str,
    repository: &str,
    path: &str,
) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != state.expected_auth {
        return Err((StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response());
    }
    if owner != OWNER || repository != REPOSITORY || path != CATALOG_PATH {
        return Err((StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"})))
            .into_response());
    }
    Ok(())
}

/// Wraps base64 at 60 columns, the way the real contents API serves it.
fn wrap_base64(content: &str) -> String {
    content
        .as_bytes()
        .chunks(60)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

async fn get_contents(
    State(state): State<Arc<RemoteState>>,
    Path((owner, repository, path)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_request(&state, &headers, &owner, &repository, &path) {
        return response;
    }

    let file = state.file.lock().unwrap();
    Json(json!({
        "content": wrap_base64(&file.content),
        "sha": file.sha,
    }))
    .into_response()
}

async fn put_contents(
    State(state): State<Arc<RemoteState>>,
    Path((owner, repository, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdateFileBody>,
) -> Response {
    if let Err(response) = check_request(&state, &headers, &owner, &repository, &path) {
        return response;
    }

    let mut file = state.file.lock().unwrap();
    if body.sha != file.sha {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": format!("{} does not match {}", body.sha, file.sha)})),
        )
            .into_response();
    }

    file.content = body.content;
    let sha = format!("sha-{}", file.next_sha);
    file.next_sha += 1;
    file.sha = sha.clone();

    Json(json!({"content": {"sha": sha}})).into_response()
}
