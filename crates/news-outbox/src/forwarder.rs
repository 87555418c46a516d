//! Background delivery of outbox entries to the publisher.
//!
//! One cycle takes a snapshot of the outbox and tries each entry in order.
//! A delivered entry is marked published in the store and then dropped from
//! the outbox. The first failure ends the cycle, so a stuck entry blocks
//! everything queued behind it.

use crate::{Outbox, OutboxEntry, OutboxResult};
use async_trait::async_trait;
use news_database::Database;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Downstream that accepts outbox entries.
///
/// Any error counts as a failed attempt and is retried on a later cycle.
#[async_trait]
pub trait PublishSink: Send + Sync {
    async fn publish(&self, entry: &OutboxEntry) -> OutboxResult<()>;
}

#[async_trait]
impl<T: PublishSink + ?Sized> PublishSink for Arc<T> {
    async fn publish(&self, entry: &OutboxEntry) -> OutboxResult<()> {
        (**self).publish(entry).await
    }
}

/// Forwarder configuration.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Idle wait between cycles when nothing failed.
    pub poll_interval: Duration,
    /// First wait after a failed cycle.
    pub initial_retry_delay: Duration,
    /// Upper bound for the doubling retry wait.
    pub max_retry_delay: Duration,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            initial_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

/// Outcome of one delivery cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Ids delivered and committed, in delivery order.
    pub delivered: Vec<u64>,
    /// Entry whose delivery failed and ended the cycle.
    pub blocked_on: Option<u64>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.blocked_on.is_none()
    }
}

/// Drains the outbox into a [`PublishSink`].
pub struct Forwarder<S> {
    db: Arc<Database>,
    outbox: Arc<Outbox>,
    sink: S,
    config: ForwarderConfig,
}

impl<S: PublishSink> Forwarder<S> {
    pub fn new(db: Arc<Database>, outbox: Arc<Outbox>, sink: S, config: ForwarderConfig) -> Self {
        Self {
            db,
            outbox,
            sink,
            config,
        }
    }

    /// Rebuild the outbox from unpublished store records.
    pub async fn reconcile(&self) -> OutboxResult<usize> {
        self.outbox.reconcile(&self.db).await
    }

    /// Run one delivery cycle.
    ///
    /// Only storage failures are returned as errors; a failed delivery is
    /// reported through [`CycleReport::blocked_on`].
    pub async fn run_cycle(&self) -> OutboxResult<CycleReport> {
        let snapshot = self.outbox.snapshot().await;
        let mut report = CycleReport::default();

        for entry in snapshot {
            // Confirmed through another path since the snapshot was taken.
            if !self.outbox.contains(entry.id).await {
                continue;
            }

            if let Err(e) = self.sink.publish(&entry).await {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(id = entry.id, error = %e, "Delivery failed, holding remaining entries");
                report.blocked_on = Some(entry.id);
                break;
            }

            self.commit(entry.id).await?;
            report.delivered.push(entry.id);
        }

        if !report.delivered.is_empty() {
            debug!(
                delivered = report.delivered.len(),
                blocked_on = ?report.blocked_on,
                "Delivery cycle finished"
            );
        }
        Ok(report)
    }

    async fn commit(&self, id: u64) -> OutboxResult<()> {
        let db = Arc::clone(&self.db);
        if !tokio::task::spawn_blocking(move || db.mark_published(id)).await?? {
            warn!(id, "Delivered entry has no store record");
        }
        self.outbox.remove(id).await;
        info!(id, "News item delivered");
        Ok(())
    }

    /// Reconcile, then deliver until shutdown.
    ///
    /// Returns an error only when the store fails, at which point delivery
    /// must stop instead of continuing with unknown state.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> OutboxResult<()> {
        self.reconcile().await?;
        let status = self.outbox.status().await;
        info!(status = ?status, "Forwarder started");

        let mut retry_delay = self.config.initial_retry_delay;

        loop {
            let report = match self.run_cycle().await {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, "Storage failure, stopping forwarder");
                    return Err(e);
                }
            };

            if report.is_clean() {
                retry_delay = self.config.initial_retry_delay;
                tokio::select! {
                    _ = shutdown.recv() => break,
                    _ = self.outbox.notified() => {}
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            } else {
                // New entries cannot pass a blocked head, so enqueue
                // wakeups are ignored while backing off.
                debug!(delay_ms = retry_delay.as_millis() as u64, "Backing off");
                tokio::select! {
                    _ = shutdown.recv() => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
                retry_delay = std::cmp::min(retry_delay * 2, self.config.max_retry_delay);
            }
        }

        info!("Forwarder stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutboxError;
    use news_protocol::NewsItem;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Sink that records deliveries and fails for configured ids.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<OutboxEntry>>,
        failing: Mutex<HashSet<u64>>,
    }

    impl RecordingSink {
        fn fail(&self, id: u64) {
            self.failing.lock().unwrap().insert(id);
        }

        fn heal(&self, id: u64) {
            self.failing.lock().unwrap().remove(&id);
        }

        fn sent_ids(&self) -> Vec<u64> {
            self.sent.lock().unwrap().iter().map(|e| e.id).collect()
        }
    }

    #[async_trait]
    impl PublishSink for RecordingSink {
        async fn publish(&self, entry: &OutboxEntry) -> OutboxResult<()> {
            if self.failing.lock().unwrap().contains(&entry.id) {
                return Err(OutboxError::Send("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct Fixture {
        db: Arc<Database>,
        outbox: Arc<Outbox>,
        sink: Arc<RecordingSink>,
        forwarder: Forwarder<Arc<RecordingSink>>,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let outbox = Arc::new(Outbox::new());
        let sink = Arc::new(RecordingSink::default());
        let forwarder = Forwarder::new(
            db.clone(),
            outbox.clone(),
            sink.clone(),
            ForwarderConfig {
                poll_interval: Duration::from_millis(20),
                initial_retry_delay: Duration::from_millis(20),
                max_retry_delay: Duration::from_millis(80),
            },
        );
        Fixture {
            db,
            outbox,
            sink,
            forwarder,
        }
    }

    async fn submit(f: &Fixture, source: &str, headline: &str) -> u64 {
        let record = f.db.append(source, headline).unwrap();
        f.outbox
            .enqueue(record.id, NewsItem::new(source, headline).unwrap())
            .await;
        record.id
    }

    #[test]
    fn test_forwarder_config_default() {
        let config = ForwarderConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.initial_retry_delay, Duration::from_secs(1));
        assert_eq!(config.max_retry_delay, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_cycle_delivers_and_commits() {
        let f = fixture();
        let id = submit(&f, "BBC", "Some News").await;

        let record = f.db.get_record(id).unwrap().unwrap();
        assert_eq!(id, 1);
        assert!(!record.published);
        assert_eq!(f.outbox.len().await, 1);

        let report = f.forwarder.run_cycle().await.unwrap();
        assert_eq!(report.delivered, vec![1]);
        assert!(report.is_clean());

        assert!(f.db.get_record(1).unwrap().unwrap().published);
        assert!(f.outbox.is_empty().await);
        let sent = f.sink.sent.lock().unwrap().clone();
        assert_eq!(sent[0].payload, NewsItem::new("BBC", "Some News").unwrap());
    }

    #[tokio::test]
    async fn test_head_of_line_blocking() {
        let f = fixture();
        for i in 1..=7 {
            submit(&f, "wire", &format!("item {i}")).await;
        }
        f.sink.fail(5);

        let report = f.forwarder.run_cycle().await.unwrap();
        assert_eq!(report.delivered, vec![1, 2, 3, 4]);
        assert_eq!(report.blocked_on, Some(5));

        let pending: Vec<u64> = f.db.list_unpublished().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(pending, vec![5, 6, 7]);
        assert_eq!(f.sink.sent_ids(), vec![1, 2, 3, 4]);

        // Still blocked on a second attempt.
        let report = f.forwarder.run_cycle().await.unwrap();
        assert!(report.delivered.is_empty());
        assert_eq!(f.outbox.len().await, 3);

        f.sink.heal(5);
        let report = f.forwarder.run_cycle().await.unwrap();
        assert_eq!(report.delivered, vec![5, 6, 7]);
        assert_eq!(f.sink.sent_ids(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_unreachable_sink_keeps_record_pending() {
        let f = fixture();
        let id = submit(&f, "BBC", "Some News").await;
        f.sink.fail(id);

        for _ in 0..3 {
            let report = f.forwarder.run_cycle().await.unwrap();
            assert_eq!(report.blocked_on, Some(id));
        }
        assert!(!f.db.get_record(id).unwrap().unwrap().published);
        assert!(f.outbox.contains(id).await);
    }

    #[tokio::test]
    async fn test_restart_after_mark_does_not_resend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("news.db");

        {
            let db = Database::open(&path).unwrap();
            db.append("BBC", "one").unwrap();
            db.append("BBC", "two").unwrap();
            // Crash between mark_published and outbox removal.
            db.mark_published(1).unwrap();
        }

        let db = Arc::new(Database::open(&path).unwrap());
        let outbox = Arc::new(Outbox::new());
        let sink = Arc::new(RecordingSink::default());
        let forwarder = Forwarder::new(db.clone(), outbox.clone(), sink.clone(), ForwarderConfig::default());

        forwarder.reconcile().await.unwrap();
        assert!(!outbox.contains(1).await);

        let report = forwarder.run_cycle().await.unwrap();
        assert_eq!(report.delivered, vec![2]);
        assert_eq!(sink.sent_ids(), vec![2]);
    }

    #[tokio::test]
    async fn test_skips_entries_confirmed_elsewhere() {
        let f = fixture();
        submit(&f, "BBC", "one").await;
        submit(&f, "BBC", "two").await;
        f.outbox.remove(1).await;

        let report = f.forwarder.run_cycle().await.unwrap();
        assert_eq!(report.delivered, vec![2]);
        assert_eq!(f.sink.sent_ids(), vec![2]);
    }

    #[test]
    fn test_run_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let f = fixture();
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let run = f.forwarder.run(shutdown_rx);
        assert_send(&run);
    }

    #[tokio::test]
    async fn test_run_delivers_in_background_and_stops() {
        let f = fixture();
        f.db.append("BBC", "before start").unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let forwarder = Arc::new(f.forwarder);
        let handle = {
            let forwarder = forwarder.clone();
            tokio::spawn(async move { forwarder.run(shutdown_rx).await })
        };

        let record = f.db.append("CNN", "after start").unwrap();
        f.outbox
            .enqueue(record.id, NewsItem::new("CNN", "after start").unwrap())
            .await;

        tokio::time::timeout(Duration::from_secs(5), async {
            while !f.db.list_unpublished().unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("records should be delivered");

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        let mut sent = f.sink.sent_ids();
        sent.sort_unstable();
        assert_eq!(sent, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_run_recovers_after_outage() {
        let f = fixture();
        let id = submit(&f, "BBC", "Some News").await;
        f.sink.fail(id);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let forwarder = Arc::new(f.forwarder);
        let handle = {
            let forwarder = forwarder.clone();
            tokio::spawn(async move { forwarder.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!f.db.get_record(id).unwrap().unwrap().published);

        f.sink.heal(id);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !f.db.get_record(id).unwrap().unwrap().published {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("record should be delivered once the sink recovers");

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert!(f.outbox.is_empty().await);
    }

    /// Sink that accepts every entry but drops the store's table first,
    /// so the following commit fails.
    struct StoreBreakingSink {
        db_path: std::path::PathBuf,
    }

    #[async_trait]
    impl PublishSink for StoreBreakingSink {
        async fn publish(&self, _entry: &OutboxEntry) -> OutboxResult<()> {
            let conn = rusqlite::Connection::open(&self.db_path).unwrap();
            conn.execute_batch("DROP TABLE news").unwrap();
            Ok(())
        }
    }

    fn breaking_forwarder(dir: &tempfile::TempDir) -> (Arc<Outbox>, Forwarder<StoreBreakingSink>) {
        let db_path = dir.path().join("news.db");
        let db = Arc::new(Database::open(&db_path).unwrap());
        db.append("BBC", "Some News").unwrap();

        let outbox = Arc::new(Outbox::new());
        let forwarder = Forwarder::new(
            db,
            outbox.clone(),
            StoreBreakingSink { db_path },
            ForwarderConfig {
                poll_interval: Duration::from_millis(20),
                initial_retry_delay: Duration::from_millis(20),
                max_retry_delay: Duration::from_millis(80),
            },
        );
        (outbox, forwarder)
    }

    #[tokio::test]
    async fn test_commit_failure_is_returned_and_entry_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (outbox, forwarder) = breaking_forwarder(&dir);
        assert_eq!(forwarder.reconcile().await.unwrap(), 1);

        let err = forwarder.run_cycle().await.unwrap_err();

        assert!(matches!(err, OutboxError::Database(_)));
        assert!(err.is_fatal());
        // Never removed without a committed published flag.
        assert!(outbox.contains(1).await);
    }

    #[tokio::test]
    async fn test_run_stops_on_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (outbox, forwarder) = breaking_forwarder(&dir);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let result = tokio::time::timeout(Duration::from_secs(5), forwarder.run(shutdown_rx))
            .await
            .expect("forwarder should stop by itself");

        assert!(matches!(result, Err(OutboxError::Database(_))));
        assert_eq!(outbox.len().await, 1);
    }
}
