use super::harness::{unused_port, HostResponse, MockHost};
use crate::{interactive, Reporter, ReporterError, SessionSummary};
use news_protocol::NewsItem;
use news_rpc::RpcError;
use std::io::Cursor;
use std::time::Duration;

fn reporter(port: u16) -> Reporter {
    Reporter::with_timeout("127.0.0.1", port, Duration::from_millis(500))
}

#[tokio::test]
async fn test_submit_sends_xml() {
    let host = MockHost::start(HostResponse::Accept).await;
    let item = NewsItem::new("BBC", "Tom & Jerry <live>").unwrap();

    let result = reporter(host.port()).submit(&item).await.unwrap();

    assert!(result.accepted);
    assert_eq!(result.id, 1);
    assert_eq!(host.items(), vec![item.clone()]);
    assert_eq!(
        host.raw_params()[0]["xml"].as_str(),
        Some(item.to_xml().as_str())
    );
}

#[tokio::test]
async fn test_add_post_trims_and_reports_success() {
    let host = MockHost::start(HostResponse::Accept).await;

    assert!(reporter(host.port()).add_post("  BBC ", " Some News ").await);
    assert_eq!(host.items(), vec![NewsItem::new("BBC", "Some News").unwrap()]);
}

#[tokio::test]
async fn test_add_post_rejects_blank_without_calling_host() {
    let host = MockHost::start(HostResponse::Accept).await;

    assert!(!reporter(host.port()).add_post("BBC", "   ").await);
    assert!(host.items().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_not_success() {
    let host = MockHost::start(HostResponse::StorageFailure).await;
    let item = NewsItem::new("BBC", "Some News").unwrap();

    let err = reporter(host.port()).submit(&item).await.unwrap_err();
    assert!(matches!(
        err,
        ReporterError::Rpc(RpcError::Remote { code: -32000, .. })
    ));
    assert!(!reporter(host.port()).add_post("BBC", "Some News").await);
}

#[tokio::test]
async fn test_unreachable_host() {
    let port = unused_port().await;
    assert!(!reporter(port).add_post("BBC", "Some News").await);
}

#[tokio::test]
async fn test_interactive_session() {
    let host = MockHost::start(HostResponse::Accept).await;
    let input = Cursor::new("BBC\nSome News\ny\n\nNo source\ny\nCNN\nOther News\nn\n");
    let mut output = Vec::new();

    let summary = interactive(&reporter(host.port()), input, &mut output)
        .await
        .unwrap();

    assert_eq!(
        summary,
        SessionSummary {
            sent: 2,
            failed: 0,
            invalid: 1
        }
    );
    assert_eq!(
        host.items(),
        vec![
            NewsItem::new("BBC", "Some News").unwrap(),
            NewsItem::new("CNN", "Other News").unwrap(),
        ]
    );

    let transcript = String::from_utf8(output).unwrap();
    assert_eq!(transcript.matches("News sent successfully").count(), 2);
    assert!(transcript.contains("Invalid input. Input must not be blank."));
}

#[tokio::test]
async fn test_interactive_stops_at_end_of_input() {
    let host = MockHost::start(HostResponse::Accept).await;
    let mut output = Vec::new();

    let summary = interactive(&reporter(host.port()), Cursor::new("BBC\n"), &mut output)
        .await
        .unwrap();

    assert_eq!(summary, SessionSummary::default());
    assert!(host.items().is_empty());
}
