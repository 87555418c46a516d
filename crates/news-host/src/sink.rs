//! Forwarding of outbox entries to the publisher over RPC.

use async_trait::async_trait;
use news_outbox::{OutboxEntry, OutboxError, OutboxResult, PublishSink};
use news_protocol::{AcceptedResult, PublishParams};
use news_rpc::{Method, RpcClient, RpcError};
use tracing::debug;

/// [`PublishSink`] calling `publish` on the publisher.
///
/// Only `{"accepted": true}` counts as delivered.
pub struct RpcPublishSink {
    client: RpcClient,
}

impl RpcPublishSink {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PublishSink for RpcPublishSink {
    async fn publish(&self, entry: &OutboxEntry) -> OutboxResult<()> {
        let params = PublishParams {
            id: Some(entry.id),
            payload: entry.payload.clone(),
        };

        let result: AcceptedResult = self
            .client
            .invoke(Method::Publish, &params)
            .await
            .map_err(|e| match e {
                RpcError::Timeout { after, .. } => OutboxError::Timeout(after),
                other => OutboxError::Send(other.to_string()),
            })?;

        debug!(id = entry.id, accepted = result.accepted, publisher = self.client.addr(), "Publish answered");
        if result.accepted {
            Ok(())
        } else {
            Err(OutboxError::Rejected(entry.id))
        }
    }
}
