//! Shared host state handed to every RPC handler.

use crate::{HostError, HostResult};
use news_database::{Database, NewsRecord};
use news_outbox::Outbox;
use news_protocol::NewsItem;
use news_rpc::RpcClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Store and outbox handles plus the optional registration proxy target.
#[derive(Clone)]
pub struct HostState {
    pub db: Arc<Database>,
    pub outbox: Arc<Outbox>,
    /// Client for the publisher's registration endpoint.
    pub registrar: Option<RpcClient>,
}

impl HostState {
    pub fn new(db: Arc<Database>, outbox: Arc<Outbox>) -> Self {
        Self {
            db,
            outbox,
            registrar: None,
        }
    }

    pub fn with_registrar(mut self, registrar: RpcClient) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Durably record a news item, then queue it for forwarding.
    ///
    /// The record is committed before this returns; on error nothing was
    /// stored and the item must not be acknowledged.
    pub async fn submit(&self, item: NewsItem) -> HostResult<NewsRecord> {
        let db = self.db.clone();
        let (source, headline) = (item.source.clone(), item.headline.clone());
        let record = tokio::task::spawn_blocking(move || db.append(&source, &headline))
            .await
            .map_err(|e| HostError::Internal(e.to_string()))??;

        self.outbox.enqueue(record.id, item).await;
        info!(id = record.id, source = %record.source, "News item accepted");
        Ok(record)
    }

    /// Record a delivery confirmation for `id`.
    ///
    /// Idempotent. Returns `false` when no record has that id.
    pub async fn confirm_published(&self, id: u64) -> HostResult<bool> {
        let db = self.db.clone();
        let known = tokio::task::spawn_blocking(move || db.mark_published(id))
            .await
            .map_err(|e| HostError::Internal(e.to_string()))??;

        let removed = self.outbox.remove(id).await;
        debug!(id, known, removed, "Delivery confirmed");
        Ok(known)
    }
}
