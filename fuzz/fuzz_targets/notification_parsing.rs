#![no_main]

//! Fuzz target for storage notification parsing.
//!
//! The receiver acknowledges every delivery, so parsing must never panic
//! on arbitrary bodies, and whatever it extracts must render as a `gs://`
//! URI.

use filedrop_core::ObjectNotification;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let notification = ObjectNotification::from_slice(data);

    let uri = notification.uri().to_string();
    assert!(uri.starts_with("gs://"));

    if let Some(bucket) = &notification.bucket {
        assert!(uri.contains(bucket.as_str()));
    }
    if notification.is_empty() {
        assert_eq!(uri, "gs:///");
    }
});
