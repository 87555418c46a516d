//! News publisher.
//!
//! Keeps a registry of subscriber datagram addresses and fans every item
//! published by a host out to all of them:
//!
//! ```text
//! subscriber ──register──▶ [register port] ──▶ SubscriptionRegistry
//! host ───────publish───▶ [publish port]  ──▶ Fanout ──UDP──▶ subscribers
//! ```
//!
//! Delivery to subscribers is best effort. A `publish` is accepted once
//! fan-out was attempted, including when nobody is subscribed.

pub mod config;
pub mod error;
pub mod fanout;
pub mod publisher;
pub mod registry;

#[cfg(test)]
mod tests;

pub use config::PublisherConfig;
pub use error::{PublisherError, PublisherResult};
pub use fanout::{Fanout, FanoutReport};
pub use publisher::Publisher;
pub use registry::{Subscription, SubscriptionRegistry};
