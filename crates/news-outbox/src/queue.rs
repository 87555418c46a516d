//! Outbox queue for news delivery.

use crate::OutboxResult;
use news_database::Database;
use news_protocol::NewsItem;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

/// A record awaiting confirmed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    /// Id of the backing store record.
    pub id: u64,
    pub payload: NewsItem,
}

/// Point-in-time counters for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutboxStatus {
    pub pending: usize,
    /// Head of the queue, the next entry the forwarder will try.
    pub head: Option<u64>,
}

#[derive(Default)]
struct Pending {
    order: VecDeque<u64>,
    payloads: HashMap<u64, NewsItem>,
}

/// In-memory outbox keyed by record id, iterated in insertion order.
///
/// The outbox is a cache of unpublished store records and is never the
/// source of truth: after a restart it is rebuilt with [`Outbox::reconcile`].
#[derive(Default)]
pub struct Outbox {
    pending: Mutex<Pending>,
    /// Signalled on every enqueue so an idle forwarder wakes early.
    notify: Notify,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, or replace the payload of an existing one.
    ///
    /// A replaced entry keeps its place in the queue.
    pub async fn enqueue(&self, id: u64, payload: NewsItem) {
        {
            let mut pending = self.pending.lock().await;
            if pending.payloads.insert(id, payload).is_none() {
                pending.order.push_back(id);
            }
            debug!(id, pending = pending.order.len(), "Entry enqueued");
        }
        self.notify.notify_one();
    }

    /// Drop an entry. Absent ids are ignored.
    pub async fn remove(&self, id: u64) -> bool {
        let mut pending = self.pending.lock().await;
        if pending.payloads.remove(&id).is_none() {
            return false;
        }
        if let Some(pos) = pending.order.iter().position(|&queued| queued == id) {
            pending.order.remove(pos);
        }
        debug!(id, pending = pending.order.len(), "Entry removed");
        true
    }

    /// Copy of all entries in insertion order.
    ///
    /// The lock is released before this returns, so callers may perform
    /// network I/O over the result without blocking submissions.
    pub async fn snapshot(&self) -> Vec<OutboxEntry> {
        let pending = self.pending.lock().await;
        pending
            .order
            .iter()
            .filter_map(|id| {
                pending.payloads.get(id).map(|payload| OutboxEntry {
                    id: *id,
                    payload: payload.clone(),
                })
            })
            .collect()
    }

    /// Load every unpublished store record into the outbox.
    ///
    /// Returns the number of entries that were not already queued.
    pub async fn reconcile(&self, db: &Arc<Database>) -> OutboxResult<usize> {
        let db = Arc::clone(db);
        let records = tokio::task::spawn_blocking(move || db.list_unpublished()).await??;

        let added = {
            let mut pending = self.pending.lock().await;
            let mut added = 0;
            for record in records {
                let payload = NewsItem {
                    source: record.source,
                    headline: record.headline,
                };
                if pending.payloads.insert(record.id, payload).is_none() {
                    pending.order.push_back(record.id);
                    added += 1;
                }
            }
            added
        };

        if added > 0 {
            info!(count = added, "Recovered unpublished records into outbox");
            self.notify.notify_one();
        }
        Ok(added)
    }

    /// Wait until the next enqueue (or a wakeup stored by an earlier one).
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.pending.lock().await.payloads.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn status(&self) -> OutboxStatus {
        let pending = self.pending.lock().await;
        OutboxStatus {
            pending: pending.order.len(),
            head: pending.order.front().copied(),
        }
    }
}
