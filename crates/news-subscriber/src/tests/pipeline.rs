use crate::{Subscriber, SubscriberConfig};
use news_host::{Host, HostConfig};
use news_protocol::{AcceptedResult, AddPostParams, AddPostResult, NewsItem, PublishParams};
use news_publisher::{Publisher, PublisherConfig};
use news_rpc::{ClientConfig, Method, RpcClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

fn client(addr: SocketAddr) -> RpcClient {
    RpcClient::with_config(
        addr.to_string(),
        ClientConfig {
            connect_timeout: Duration::from_secs(1),
            response_timeout: Duration::from_secs(2),
        },
    )
}

struct Running {
    publisher: Arc<Publisher>,
    register_addr: SocketAddr,
    publish_addr: SocketAddr,
}

async fn start_publisher() -> Running {
    let publisher = Arc::new(Publisher::new(PublisherConfig::new(0, 0)).await.unwrap());
    let register_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let publish_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let register_addr = register_listener.local_addr().unwrap();
    let publish_addr = publish_listener.local_addr().unwrap();

    let running = publisher.clone();
    tokio::spawn(async move { running.run_on(register_listener, publish_listener).await });

    Running {
        publisher,
        register_addr,
        publish_addr,
    }
}

async fn start_subscriber(register_addr: SocketAddr) -> Subscriber {
    let subscriber = Subscriber::bind(SubscriberConfig::new(
        0,
        register_addr.ip().to_string(),
        register_addr.port(),
    ))
    .await
    .unwrap();
    subscriber.register().await.unwrap();
    subscriber
}

#[tokio::test]
async fn test_subscriber_observes_exactly_one_item() {
    let running = start_publisher().await;
    let subscriber = start_subscriber(running.register_addr).await;

    let (tx, mut rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let receive = tokio::spawn(async move { subscriber.run(tx, shutdown_rx).await });

    let item = NewsItem::new("BBC", "Some News").unwrap();
    let accepted: AcceptedResult = client(running.publish_addr)
        .invoke(
            Method::Publish,
            &PublishParams {
                id: Some(1),
                payload: item.clone(),
            },
        )
        .await
        .unwrap();
    assert!(accepted.accepted);

    let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, item);
    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
        .await
        .is_err());

    shutdown_tx.send(()).unwrap();
    receive.await.unwrap().unwrap();
    running.publisher.shutdown();
}

#[tokio::test]
async fn test_submission_reaches_subscriber_through_host() {
    let dir = tempfile::tempdir().unwrap();
    let running = start_publisher().await;
    let subscriber = start_subscriber(running.register_addr).await;

    let mut config = HostConfig::new(
        0,
        running.publish_addr.ip().to_string(),
        running.publish_addr.port(),
    );
    config.db_path = dir.path().join("news.db");
    config.forwarder.poll_interval = Duration::from_millis(20);
    let host = Arc::new(Host::new(config).await.unwrap());
    let host_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host_addr = host_listener.local_addr().unwrap();
    let serving = host.clone();
    tokio::spawn(async move { serving.run_on(host_listener).await });

    let item = NewsItem::new("Reuters", "Markets & <rates> rise").unwrap();
    let result: AddPostResult = client(host_addr)
        .invoke(Method::AddPost, &AddPostParams::from(&item))
        .await
        .unwrap();
    assert!(result.accepted);
    assert_eq!(result.id, 1);

    let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, item);

    let db = host.state().db.clone();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !db.get_record(1).unwrap().unwrap().published {
        assert!(tokio::time::Instant::now() < deadline, "record never marked published");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    host.shutdown();
    running.publisher.shutdown();
}
