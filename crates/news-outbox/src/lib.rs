//! Outbox pattern implementation for reliable news delivery.
//!
//! This crate provides:
//! - Outbox: in-memory queue of records awaiting delivery, rebuilt from the
//!   store on startup
//! - Forwarder: background loop draining the outbox into a [`PublishSink`]
//!   in insertion order, with head-of-line blocking and capped backoff

mod error;
mod forwarder;
mod queue;

pub use error::{OutboxError, OutboxResult};
pub use forwarder::{CycleReport, Forwarder, ForwarderConfig, PublishSink};
pub use queue::{Outbox, OutboxEntry, OutboxStatus};
