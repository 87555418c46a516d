//! Subscriber registrations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::RwLock;
use tracing::info;

/// A subscriber address and when it last registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub address: SocketAddr,
    pub registered_at: DateTime<Utc>,
}

/// Registered subscribers, unique by address.
///
/// Entries are never evicted; an address that stops listening keeps
/// receiving datagrams.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<SocketAddr, Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `address`, or refresh its timestamp if already present.
    ///
    /// Returns `true` for a new subscriber.
    pub async fn register(&self, address: SocketAddr) -> bool {
        let subscription = Subscription {
            address,
            registered_at: Utc::now(),
        };
        let is_new = self
            .subscriptions
            .write()
            .await
            .insert(address, subscription)
            .is_none();

        if is_new {
            info!(address = %address, "Registered subscription");
        } else {
            info!(address = %address, "Refreshed subscription");
        }
        is_new
    }

    pub async fn get(&self, address: &SocketAddr) -> Option<Subscription> {
        self.subscriptions.read().await.get(address).cloned()
    }

    /// Current subscriber addresses.
    pub async fn addresses(&self) -> Vec<SocketAddr> {
        self.subscriptions.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
