//! filedrop HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Duration};

use filedrop_core::{Clock, ObjectEventSink, Storage};

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{create_router, serve, start_server};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Datastore handle, used by the probes.
    pub storage: Storage,
    /// Time source for receipt timestamps and probe latency.
    pub clock: Arc<dyn Clock>,
    /// Destination for received notifications.
    pub sink: Arc<dyn ObjectEventSink>,
    /// Route and limit settings.
    pub routes: RouteOptions,
}

impl AppState {
    /// Creates state with default route options.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>, sink: Arc<dyn ObjectEventSink>) -> Self {
        Self { storage, clock, sink, routes: RouteOptions::default() }
    }

    /// Replaces the route options.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteOptions) -> Self {
        self.routes = routes;
        self
    }
}

/// Router settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    /// Path the Eventarc trigger posts to.
    pub eventarc_path: String,
    /// Largest body the receiver reads.
    pub max_body_bytes: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            eventarc_path: "/eventarc".to_string(),
            max_body_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}
