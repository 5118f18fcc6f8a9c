//! Core domain types for the filedrop notification receiver.
//!
//! Provides the datastore declaration, the lenient object notification
//! model, event sinks and the clock abstraction. The HTTP crate and the
//! binary depend on these types; nothing here knows about HTTP.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod error;
pub mod events;
pub mod models;
pub mod storage;
pub mod time;

pub use database::{DatabaseConfig, DatabaseEngine};
pub use error::{CoreError, Result};
pub use events::{LogSink, MulticastSink, ObjectEventSink};
pub use models::{CloudEventContext, ObjectEvent, ObjectNotification, ObjectUri};
pub use storage::{PoolSettings, Storage};
pub use time::{Clock, RealClock, TestClock};
