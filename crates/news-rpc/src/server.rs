//! RPC server implementation.

use crate::{error_codes, Method, Request, Response, RpcError, RpcResult};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock, Semaphore};
use tracing::{debug, error, info, warn};

/// Handler function type for RPC methods.
pub type HandlerFn =
    Box<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

type HandlerMap = Arc<RwLock<HashMap<Method, HandlerFn>>>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// Connections served at once; further clients wait in the accept queue.
    pub max_connections: usize,
    /// A connection that sends no request for this long is closed and its
    /// slot freed.
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Listen on all interfaces at `port`.
    pub fn on_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Default::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_connections: 64,
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// RPC server dispatching requests by method tag.
pub struct RpcServer {
    name: &'static str,
    config: ServerConfig,
    handlers: HandlerMap,
    shutdown_tx: broadcast::Sender<()>,
}

impl RpcServer {
    /// Create a new RPC server. `name` labels its log lines.
    pub fn new(name: &'static str, config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            name,
            config,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            shutdown_tx,
        }
    }

    /// Register a handler for a method.
    pub async fn register_handler<F, Fut>(&self, method: Method, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let boxed_handler: HandlerFn = Box::new(move |req| Box::pin(handler(req)));
        self.handlers.write().await.insert(method, boxed_handler);
    }

    /// Get a shutdown receiver.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> RpcResult<TcpListener> {
        Ok(TcpListener::bind(self.config.bind_addr).await?)
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> RpcResult<()> {
        let listener = self.bind().await?;
        self.run_on(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn run_on(&self, listener: TcpListener) -> RpcResult<()> {
        let local_addr = listener.local_addr()?;
        info!(
            server = self.name,
            addr = %local_addr,
            max_connections = self.config.max_connections,
            "RPC server listening"
        );

        let limit = Arc::new(Semaphore::new(self.config.max_connections.max(1)));
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!(server = self.name, error = %e, "Accept error");
                            continue;
                        }
                    };

                    if limit.available_permits() == 0 {
                        warn!(server = self.name, peer = %peer, "Connection limit reached, waiting for a free slot");
                    }
                    let permit = tokio::select! {
                        permit = limit.clone().acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                        _ = shutdown_rx.recv() => break,
                    };

                    let handlers = self.handlers.clone();
                    let name = self.name;
                    let idle_timeout = self.config.idle_timeout;
                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) = handle_connection(stream, handlers, idle_timeout).await {
                            debug!(server = name, peer = %peer, error = %e, "Connection error");
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!(server = self.name, "RPC server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Handle a single client connection.
///
/// Requests on one connection are answered strictly in order. The
/// connection is dropped once it stays silent for `idle_timeout`.
async fn handle_connection(
    stream: TcpStream,
    handlers: HandlerMap,
    idle_timeout: Duration,
) -> RpcResult<()> {
    let peer = stream.peer_addr().ok();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    debug!(peer = ?peer, "Client connected");

    loop {
        line.clear();
        let bytes_read =
            match tokio::time::timeout(idle_timeout, reader.read_line(&mut line)).await {
                Ok(read) => read?,
                Err(_) => {
                    debug!(peer = ?peer, idle_timeout = ?idle_timeout, "Closing idle connection");
                    break;
                }
            };

        if bytes_read == 0 {
            debug!(peer = ?peer, "Client disconnected");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(request = %trimmed, "Received request");

        let response = match Request::from_json(trimmed) {
            Ok(request) => dispatch(request, trimmed, &handlers).await,
            Err(e) => {
                warn!(error = %e, "Failed to parse request");
                Response::error("", error_codes::PARSE_ERROR, &format!("Parse error: {}", e))
            }
        };

        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

async fn dispatch(request: Request, raw: &str, handlers: &HandlerMap) -> Response {
    let request_id = request.id.clone();
    let method = request.method;

    let pending = {
        let handlers = handlers.read().await;
        handlers
            .get(&method)
            .filter(|_| method != Method::Unknown)
            .map(|handler| handler(request))
    };

    match pending {
        Some(response) => response.await,
        None => {
            let name = method_name(raw).unwrap_or_else(|| method.to_string());
            warn!(method = %name, "Unknown method");
            Response::error(
                &request_id,
                error_codes::METHOD_NOT_FOUND,
                &RpcError::MethodNotFound(name).to_string(),
            )
        }
    }
}

/// The raw method tag, for requests whose tag did not match a known method.
fn method_name(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.get("method")?.as_str().map(String::from)
}

async fn write_response(writer: &mut OwnedWriteHalf, response: &Response) -> RpcResult<()> {
    let response_json = response.to_json()?;
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
