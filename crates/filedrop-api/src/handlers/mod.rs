//! HTTP request handlers.
//!
//! - `eventarc` - storage notification receiver
//! - `health` - liveness and readiness probes

pub mod eventarc;
pub mod health;

pub use eventarc::receive_notification;
pub use health::{health_check, liveness_check, readiness_check};
