//! Property tests for the receiver contract.
//!
//! Whatever the payload, the response is an empty 204 and exactly one line
//! is recorded per request.

use axum::http::StatusCode;
use filedrop_testing::TestEnv;
use proptest::prelude::*;
use serde_json::{json, Value};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("build runtime")
}

fn optional_field() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z0-9._/ -]{0,40}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_bucket_and_name_are_logged_verbatim(
        bucket in "[a-z0-9][a-z0-9._-]{2,62}",
        name in "\\PC{1,120}",
    ) {
        let (status, lines) = runtime().block_on(async {
            let env = TestEnv::new().await.expect("test env setup");
            let response = env
                .post_notification(&json!({ "data": { "bucket": bucket, "name": name } }))
                .await
                .expect("request");
            (response.status, env.sink.lines())
        });

        prop_assert_eq!(status, StatusCode::NO_CONTENT);
        prop_assert_eq!(lines, vec![format!("Received file: gs://{bucket}/{name}")]);
    }

    #[test]
    fn partial_payloads_are_always_acknowledged(
        include_data in any::<bool>(),
        bucket in optional_field(),
        name in optional_field(),
    ) {
        let mut data = serde_json::Map::new();
        if let Some(bucket) = &bucket {
            data.insert("bucket".to_string(), Value::from(bucket.as_str()));
        }
        if let Some(name) = &name {
            data.insert("name".to_string(), Value::from(name.as_str()));
        }
        let payload = if include_data { json!({ "data": data }) } else { json!({}) };

        let (status, body_empty, recorded) = runtime().block_on(async {
            let env = TestEnv::new().await.expect("test env setup");
            let response = env.post_notification(&payload).await.expect("request");
            (response.status, response.body.is_empty(), env.sink.len())
        });

        prop_assert_eq!(status, StatusCode::NO_CONTENT);
        prop_assert!(body_empty);
        prop_assert_eq!(recorded, 1);
    }
}
