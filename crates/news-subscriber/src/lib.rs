//! News subscriber.
//!
//! Binds a UDP port, registers its address with the publisher once at
//! startup, then receives pushed items. Each datagram carries one JSON
//! encoded news item.

pub mod config;
pub mod error;
pub mod subscriber;

#[cfg(test)]
mod tests;

pub use config::SubscriberConfig;
pub use error::{SubscriberError, SubscriberResult};
pub use subscriber::Subscriber;
