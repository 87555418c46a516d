//! Client for the host's `add_post` method.

use crate::{ReporterError, ReporterResult};
use news_protocol::{AddPostParams, AddPostResult, NewsItem};
use news_rpc::{ClientConfig, Method, RpcClient};
use std::time::Duration;
use tracing::{info, warn};

/// Default connect and response timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Submits news items to one host.
#[derive(Debug, Clone)]
pub struct Reporter {
    client: RpcClient,
}

impl Reporter {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_timeout(host, port, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(host: &str, port: u16, timeout: Duration) -> Self {
        let config = ClientConfig {
            connect_timeout: timeout,
            response_timeout: timeout,
        };
        Self {
            client: RpcClient::with_config(format!("{}:{}", host, port), config),
        }
    }

    pub fn host_addr(&self) -> &str {
        self.client.addr()
    }

    /// Submit `item` in its XML form.
    ///
    /// An `Ok` result means the host durably stored the item.
    pub async fn submit(&self, item: &NewsItem) -> ReporterResult<AddPostResult> {
        let result: AddPostResult = self
            .client
            .invoke(Method::AddPost, &AddPostParams::from(item))
            .await?;
        if !result.accepted {
            return Err(ReporterError::NotAccepted);
        }
        info!(id = result.id, item = %item, host = %self.host_addr(), "News item submitted");
        Ok(result)
    }

    /// Submit a (source, headline) pair. Returns whether the host stored it.
    pub async fn add_post(&self, source: &str, headline: &str) -> bool {
        let outcome = match NewsItem::new(source.trim(), headline.trim()) {
            Ok(item) => self.submit(&item).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, host = %self.host_addr(), "Submitting news item failed");
                false
            }
        }
    }
}
