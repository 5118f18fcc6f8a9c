//! Property tests for notification parsing.
//!
//! Parsing must never reject input and must carry string fields through
//! verbatim.

use filedrop_core::ObjectNotification;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(body in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = ObjectNotification::from_slice(&body);
    }

    #[test]
    fn bucket_and_name_survive_verbatim(bucket in ".*", name in ".*") {
        let body = serde_json::to_vec(&json!({ "data": { "bucket": bucket, "name": name } }))
            .expect("serialize payload");

        let n = ObjectNotification::from_slice(&body);
        let uri = n.uri().to_string();

        prop_assert_eq!(n.bucket.as_deref(), Some(bucket.as_str()));
        prop_assert_eq!(n.name.as_deref(), Some(name.as_str()));
        prop_assert_eq!(uri, format!("gs://{bucket}/{name}"));
    }

    #[test]
    fn unrelated_documents_are_empty(key in "[a-z]{1,8}", value in any::<i64>()) {
        prop_assume!(key != "data");
        let body = serde_json::to_vec(&json!({ key: value })).expect("serialize payload");

        prop_assert!(ObjectNotification::from_slice(&body).is_empty());
    }
}
