//! Test harness: a publisher on ephemeral ports.

use crate::{Publisher, PublisherConfig, PublisherResult};
use news_rpc::{ClientConfig, RpcClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestPublisher {
    pub publisher: Arc<Publisher>,
    pub register_addr: SocketAddr,
    pub publish_addr: SocketAddr,
    task: JoinHandle<PublisherResult<()>>,
}

impl TestPublisher {
    pub async fn start() -> Self {
        let publisher = Arc::new(Publisher::new(PublisherConfig::new(0, 0)).await.unwrap());
        let register_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let publish_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let register_addr = register_listener.local_addr().unwrap();
        let publish_addr = publish_listener.local_addr().unwrap();

        let task = {
            let publisher = publisher.clone();
            tokio::spawn(async move { publisher.run_on(register_listener, publish_listener).await })
        };

        Self {
            publisher,
            register_addr,
            publish_addr,
            task,
        }
    }

    pub fn client(addr: SocketAddr) -> RpcClient {
        RpcClient::with_config(
            addr.to_string(),
            ClientConfig {
                connect_timeout: Duration::from_secs(1),
                response_timeout: Duration::from_secs(2),
            },
        )
    }

    pub async fn stop(self) -> PublisherResult<()> {
        self.publisher.shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("publisher should stop")
            .unwrap()
    }
}
