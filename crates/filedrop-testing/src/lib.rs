//! Test infrastructure for filedrop.
//!
//! `TestEnv` lays out a throwaway application tree, opens the datastore
//! inside it and wires a recording sink next to the production log sink so
//! tests can assert on exactly what the receiver recorded.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{body::Body, Router};
use bytes::Bytes;
use filedrop_api::{create_router, AppState, RouteOptions};
use filedrop_core::{LogSink, MulticastSink, PoolSettings, Storage};
use http::{Request, Response, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

pub mod logs;
pub mod recording;

pub use filedrop_core::{Clock, DatabaseConfig, TestClock};
pub use logs::LogCapture;
pub use recording::RecordingSink;

/// Isolated environment backed by a temporary directory.
pub struct TestEnv {
    /// Deterministic clock shared with the router.
    pub clock: TestClock,
    /// Every notification the receiver accepted.
    pub sink: Arc<RecordingSink>,
    storage: Storage,
    routes: RouteOptions,
    base_dir: PathBuf,
    _root: TempDir,
}

impl TestEnv {
    /// Creates an environment with default route options.
    pub async fn new() -> Result<Self> {
        Self::with_routes(RouteOptions::default()).await
    }

    /// Creates an environment with custom route options.
    pub async fn with_routes(routes: RouteOptions) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
            )
            .with_test_writer()
            .try_init();

        let root = tempfile::tempdir().context("failed to create temp dir")?;
        let base_dir = root.path().join("app");
        std::fs::create_dir_all(&base_dir).context("failed to create base dir")?;

        let database = DatabaseConfig::from_base_dir(&base_dir);
        let storage = Storage::connect(&database, &PoolSettings::default())
            .await
            .context("failed to open test datastore")?;

        Ok(Self {
            clock: TestClock::new(),
            sink: Arc::new(RecordingSink::new()),
            storage,
            routes,
            base_dir,
            _root: root,
        })
    }

    /// Datastore handle.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Application base directory inside the temp tree.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Route options the router is built with.
    pub fn routes(&self) -> &RouteOptions {
        &self.routes
    }

    /// Application state wired to the recording and log sinks.
    pub fn state(&self) -> AppState {
        let sink =
            MulticastSink::new().with_sink(Arc::new(LogSink::new())).with_sink(self.sink.clone());

        AppState::new(self.storage.clone(), Arc::new(self.clock.clone()), Arc::new(sink))
            .with_routes(self.routes.clone())
    }

    /// Router over [`TestEnv::state`].
    pub fn router(&self) -> Router {
        create_router(self.state())
    }

    /// Sends one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router().oneshot(request).await.context("router failed")?;
        TestResponse::read(response).await
    }

    /// Posts a JSON document to the receiver route.
    pub async fn post_notification(&self, payload: &serde_json::Value) -> Result<TestResponse> {
        let body = serde_json::to_vec(payload).context("failed to serialize payload")?;
        self.post_raw(body).await
    }

    /// Posts raw bytes to the receiver route.
    pub async fn post_raw(&self, body: impl Into<Bytes>) -> Result<TestResponse> {
        let request = Request::builder()
            .method("POST")
            .uri(&self.routes.eventarc_path)
            .header("content-type", "application/json")
            .body(Body::from(body.into()))
            .context("failed to build request")?;

        self.send(request).await
    }

    /// Issues a `GET` against `path`.
    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .context("failed to build request")?;

        self.send(request).await
    }
}

/// Fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl TestResponse {
    async fn read(response: Response<Body>) -> Result<Self> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.context("failed to read body")?;

        Ok(Self { status: parts.status, headers: parts.headers, body })
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }
}
