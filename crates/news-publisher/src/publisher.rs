//! Publisher process: registration and publication servers.

use crate::{Fanout, PublisherConfig, PublisherResult, SubscriptionRegistry};
use news_protocol::{AcceptedResult, PublishParams, RegisterParams, RegisterResult};
use news_rpc::{error_codes, Method, Response, RpcServer, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Accepts subscriber registrations on one port and host publications on
/// another.
pub struct Publisher {
    registry: Arc<SubscriptionRegistry>,
    register_server: RpcServer,
    publish_server: RpcServer,
}

impl Publisher {
    pub async fn new(config: PublisherConfig) -> PublisherResult<Self> {
        let registry = Arc::new(SubscriptionRegistry::new());
        let fanout = Arc::new(Fanout::bind(registry.clone()).await?);

        let register_server = RpcServer::new(
            "register",
            ServerConfig {
                max_connections: config.max_connections,
                ..ServerConfig::on_port(config.register_port)
            },
        );
        let publish_server = RpcServer::new(
            "publish",
            ServerConfig {
                max_connections: config.max_connections,
                ..ServerConfig::on_port(config.publish_port)
            },
        );

        register_handler(&register_server, registry.clone()).await;
        publish_handler(&publish_server, fanout).await;

        Ok(Self {
            registry,
            register_server,
            publish_server,
        })
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Bind both configured ports and serve until shutdown.
    pub async fn run(&self) -> PublisherResult<()> {
        let register_listener = self.register_server.bind().await?;
        let publish_listener = self.publish_server.bind().await?;
        self.run_on(register_listener, publish_listener).await
    }

    /// Serve on already bound listeners until shutdown.
    pub async fn run_on(
        &self,
        register_listener: TcpListener,
        publish_listener: TcpListener,
    ) -> PublisherResult<()> {
        info!("Publisher starting");
        tokio::try_join!(
            self.register_server.run_on(register_listener),
            self.publish_server.run_on(publish_listener),
        )?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.register_server.shutdown();
        self.publish_server.shutdown();
    }
}

async fn register_handler(server: &RpcServer, registry: Arc<SubscriptionRegistry>) {
    server
        .register_handler(Method::Register, move |req| {
            let registry = registry.clone();
            async move {
                let params = match req.parse_params::<RegisterParams>() {
                    Ok(params) => params,
                    Err(e) => {
                        return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string())
                    }
                };

                registry.register(params.address).await;
                Response::success_with(
                    &req.id,
                    &RegisterResult {
                        registered: true,
                        address: params.address,
                    },
                )
            }
        })
        .await;
}

async fn publish_handler(server: &RpcServer, fanout: Arc<Fanout>) {
    server
        .register_handler(Method::Publish, move |req| {
            let fanout = fanout.clone();
            async move {
                let params = match req.parse_params::<PublishParams>() {
                    Ok(params) => params,
                    Err(e) => {
                        return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string())
                    }
                };
                if let Err(e) = params.payload.validate() {
                    return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string());
                }

                match fanout.send(&params.payload).await {
                    Ok(_) => Response::success_with(&req.id, &AcceptedResult { accepted: true }),
                    Err(e) => {
                        error!(id = ?params.id, error = %e, "Fan-out failed");
                        Response::error(&req.id, error_codes::INTERNAL_ERROR, &e.to_string())
                    }
                }
            }
        })
        .await;
}
