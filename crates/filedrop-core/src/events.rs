//! Sinks that record received object notifications.
//!
//! The receiver hands every notification to exactly one `ObjectEventSink`.
//! Production wires a `LogSink`; tests combine it with a recording sink
//! through `MulticastSink`.
//!
//! ```text
//! ┌──────────────────┐  ObjectEvent  ┌───────────────┐
//! │ Eventarc handler │ ─────────────▶│ MulticastSink │
//! └──────────────────┘               └───────────────┘
//!                                       │         │
//!                                       ▼         ▼
//!                                   LogSink   other sinks
//! ```

use std::sync::Arc;

use tracing::info;

use crate::models::ObjectEvent;

/// Receives object notifications accepted by the HTTP layer.
///
/// Implementations must not fail the request: errors are logged, never
/// propagated.
#[async_trait::async_trait]
pub trait ObjectEventSink: Send + Sync + std::fmt::Debug {
    /// Records one received notification.
    async fn object_received(&self, event: &ObjectEvent);
}

/// Writes one `INFO` line per notification through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    /// Creates a new log sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ObjectEventSink for LogSink {
    async fn object_received(&self, event: &ObjectEvent) {
        let n = &event.notification;
        let ctx = &event.context;

        info!(
            bucket = n.bucket.as_deref().unwrap_or_default(),
            name = n.name.as_deref().unwrap_or_default(),
            content_type = n.content_type.as_deref(),
            size = n.size,
            ce_id = ctx.id.as_deref(),
            ce_type = ctx.event_type.as_deref(),
            ce_subject = ctx.subject.as_deref(),
            "{}",
            event.summary()
        );
    }
}

/// Forwards each notification to every registered sink, in order.
#[derive(Debug, Clone, Default)]
pub struct MulticastSink {
    sinks: Vec<Arc<dyn ObjectEventSink>>,
}

impl MulticastSink {
    /// Creates a multicast sink with no subscribers.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a subscriber.
    pub fn add_sink(&mut self, sink: Arc<dyn ObjectEventSink>) {
        self.sinks.push(sink);
    }

    /// Builder-style variant of [`MulticastSink::add_sink`].
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ObjectEventSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Number of registered subscribers.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

#[async_trait::async_trait]
impl ObjectEventSink for MulticastSink {
    async fn object_received(&self, event: &ObjectEvent) {
        for sink in &self.sinks {
            sink.object_received(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::models::{CloudEventContext, ObjectNotification};

    #[derive(Debug, Default)]
    struct CountingSink {
        count: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ObjectEventSink for CountingSink {
        async fn object_received(&self, _event: &ObjectEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_event() -> ObjectEvent {
        ObjectEvent {
            notification: ObjectNotification::default(),
            context: CloudEventContext::default(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn multicast_reaches_every_sink() {
        let first = Arc::new(CountingSink::default());
        let second = Arc::new(CountingSink::default());
        let multicast = MulticastSink::new()
            .with_sink(first.clone())
            .with_sink(second.clone())
            .with_sink(Arc::new(LogSink::new()));

        multicast.object_received(&sample_event()).await;
        multicast.object_received(&sample_event()).await;

        assert_eq!(multicast.sink_count(), 3);
        assert_eq!(first.count.load(Ordering::SeqCst), 2);
        assert_eq!(second.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_multicast_is_a_no_op() {
        let multicast = MulticastSink::new();
        multicast.object_received(&sample_event()).await;
        assert_eq!(multicast.sink_count(), 0);
    }
}
