//! In-memory sink for asserting on received notifications.

use std::sync::Mutex;

use filedrop_core::{ObjectEvent, ObjectEventSink};

/// Keeps every event it receives, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ObjectEvent>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<ObjectEvent> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Summary line of each recorded event.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ObjectEvent::summary).collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ObjectEventSink for RecordingSink {
    async fn object_received(&self, event: &ObjectEvent) {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(event.clone());
    }
}
