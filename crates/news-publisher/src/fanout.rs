//! Datagram fan-out to registered subscribers.

use crate::{PublisherResult, SubscriptionRegistry};
use news_protocol::NewsItem;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub sent: Vec<SocketAddr>,
    pub failed: Vec<SocketAddr>,
}

impl FanoutReport {
    /// Number of subscribers a send was attempted to.
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

/// Sends each published item as one JSON datagram to every subscriber.
pub struct Fanout {
    socket: UdpSocket,
    registry: Arc<SubscriptionRegistry>,
}

impl Fanout {
    /// Bind an ephemeral UDP socket for outgoing datagrams.
    pub async fn bind(registry: Arc<SubscriptionRegistry>) -> PublisherResult<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        Ok(Self { socket, registry })
    }

    /// Send `item` to every registered subscriber.
    ///
    /// Failures for individual subscribers are logged and reported, never
    /// returned as errors.
    pub async fn send(&self, item: &NewsItem) -> PublisherResult<FanoutReport> {
        let datagram = item.to_bytes()?;
        let addresses = self.registry.addresses().await;
        let mut report = FanoutReport::default();

        if addresses.is_empty() {
            info!(item = %item, "No subscriptions, dropping item");
            return Ok(report);
        }

        for address in addresses {
            match self.socket.send_to(&datagram, address).await {
                Ok(_) => {
                    debug!(subscriber = %address, "Datagram sent");
                    report.sent.push(address);
                }
                Err(e) => {
                    warn!(subscriber = %address, error = %e, "Failed to send datagram");
                    report.failed.push(address);
                }
            }
        }

        info!(
            item = %item,
            sent = report.sent.len(),
            failed = report.failed.len(),
            "Item fanned out"
        );
        Ok(report)
    }
}
