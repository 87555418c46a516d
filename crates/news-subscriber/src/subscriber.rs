//! Datagram receive loop and registration.

use crate::{SubscriberConfig, SubscriberError, SubscriberResult};
use news_protocol::{NewsItem, RegisterParams, RegisterResult};
use news_rpc::{Method, RpcClient};
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Largest datagram accepted.
const MAX_DATAGRAM: usize = 64 * 1024;

/// A bound subscriber socket.
pub struct Subscriber {
    socket: UdpSocket,
    config: SubscriberConfig,
}

impl Subscriber {
    /// Bind the configured UDP port on all interfaces.
    pub async fn bind(config: SubscriberConfig) -> SubscriberResult<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", config.port)).await?;
        info!(addr = %socket.local_addr()?, "Subscriber socket bound");
        Ok(Self { socket, config })
    }

    pub fn local_addr(&self) -> SubscriberResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Address the publisher should push to.
    pub fn advertised_addr(&self) -> SubscriberResult<SocketAddr> {
        let ip: IpAddr = self
            .config
            .advertise_host
            .parse()
            .map_err(|_| SubscriberError::InvalidAddress(self.config.advertise_host.clone()))?;
        Ok(SocketAddr::new(ip, self.local_addr()?.port()))
    }

    /// Register the advertised address with the publisher.
    pub async fn register(&self) -> SubscriberResult<SocketAddr> {
        let address = self.advertised_addr()?;
        let client = RpcClient::with_config(self.config.publisher_addr(), self.config.client.clone());
        let result: RegisterResult = client
            .invoke(Method::Register, &RegisterParams { address })
            .await?;

        if !result.registered {
            return Err(SubscriberError::Refused(address));
        }
        info!(address = %result.address, publisher = %client.addr(), "Registered with publisher");
        Ok(result.address)
    }

    /// Wait for the next decodable item.
    ///
    /// Datagrams that do not decode are dropped with a warning.
    pub async fn recv(&self) -> SubscriberResult<NewsItem> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;
            match NewsItem::from_bytes(&buf[..len]) {
                Ok(item) => {
                    debug!(peer = %peer, item = %item, "Item received");
                    return Ok(item);
                }
                Err(e) => warn!(peer = %peer, len, error = %e, "Dropping undecodable datagram"),
            }
        }
    }

    /// Forward received items to `tx` until shutdown or the receiver is gone.
    pub async fn run(
        &self,
        tx: mpsc::Sender<NewsItem>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> SubscriberResult<()> {
        loop {
            tokio::select! {
                item = self.recv() => {
                    if tx.send(item?).await.is_err() {
                        debug!("Item receiver dropped, stopping");
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    info!("Subscriber shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}
