//! News host: durable intake of reporter submissions and at-least-once
//! forwarding to the publisher.
//!
//! # Core Invariants
//!
//! 1. **Store before ack**: `add_post` succeeds only after the record is
//!    committed to SQLite
//! 2. **Published flag is the truth**: the outbox is rebuilt from unpublished
//!    records on every start
//! 3. **Ordered forwarding**: entries reach the publisher in outbox order and
//!    a failed head blocks the rest
//!
//! # Architecture
//!
//! ```text
//! Reporter -> add_post -> Database.append -> Outbox.enqueue -> ack
//!                                               |
//!                         Forwarder <-----------+
//!                             | publish
//!                             v
//!                         Publisher -> accepted -> mark_published + remove
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod sink;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::HostConfig;
pub use error::{HostError, HostResult};
pub use host::Host;
pub use sink::RpcPublishSink;
pub use state::HostState;
