//! Host assembly: store, outbox, forwarder and RPC server.

use crate::handlers::register_handlers;
use crate::{HostConfig, HostError, HostResult, HostState, RpcPublishSink};
use news_database::Database;
use news_outbox::{Forwarder, Outbox};
use news_rpc::{RpcClient, RpcServer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// A running news host.
pub struct Host {
    state: HostState,
    server: RpcServer,
    forwarder: Arc<Forwarder<RpcPublishSink>>,
}

impl Host {
    /// Open the store and wire up handlers and the forwarder.
    pub async fn new(config: HostConfig) -> HostResult<Self> {
        let db = Arc::new(Database::open(&config.db_path)?);
        db.health_check()?;
        let stored = db.count_records()?;
        info!(db = %config.db_path.display(), stored, "Store opened");
        let outbox = Arc::new(Outbox::new());

        let mut state = HostState::new(db.clone(), outbox.clone());
        if let Some(addr) = config.registrar_addr() {
            state = state.with_registrar(RpcClient::with_config(addr, config.client.clone()));
        }

        let server = RpcServer::new("news-host", config.server_config());
        register_handlers(&server, state.clone()).await;

        let sink = RpcPublishSink::new(RpcClient::with_config(
            config.publisher_addr(),
            config.client.clone(),
        ));
        let forwarder = Arc::new(Forwarder::new(db, outbox, sink, config.forwarder.clone()));

        Ok(Self {
            state,
            server,
            forwarder,
        })
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    /// Bind the configured port and serve until shutdown.
    pub async fn run(&self) -> HostResult<()> {
        let listener = self.server.bind().await?;
        self.run_on(listener).await
    }

    /// Serve on `listener` and forward in the background until shutdown or
    /// a storage failure in the forwarder.
    pub async fn run_on(&self, listener: TcpListener) -> HostResult<()> {
        let forwarder = self.forwarder.clone();
        let shutdown = self.server.shutdown_receiver();
        let mut forwarder_task = tokio::spawn(async move { forwarder.run(shutdown).await });

        tokio::select! {
            served = self.server.run_on(listener) => {
                self.server.shutdown();
                let forwarded = forwarder_task.await;
                served?;
                flatten(forwarded)
            }
            forwarded = &mut forwarder_task => {
                self.server.shutdown();
                let result = flatten(forwarded);
                if let Err(e) = &result {
                    error!(error = %e, "Forwarder stopped, shutting down host");
                }
                result
            }
        }
    }

    /// Stop serving and forwarding.
    pub fn shutdown(&self) {
        info!("Host shutdown requested");
        self.server.shutdown();
    }
}

fn flatten(
    joined: Result<news_outbox::OutboxResult<()>, tokio::task::JoinError>,
) -> HostResult<()> {
    match joined {
        Ok(result) => Ok(result?),
        Err(e) => Err(HostError::Internal(format!("forwarder task failed: {}", e))),
    }
}
