//! RPC client with bounded connect and response times.

use crate::{error_codes, Method, Request, Response, RpcError, RpcResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Client timeouts.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    /// Covers writing the request and reading the response line.
    pub response_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for one remote RPC endpoint. Each call uses a fresh connection.
#[derive(Debug, Clone)]
pub struct RpcClient {
    addr: String,
    config: ClientConfig,
}

impl RpcClient {
    /// Create a client for `host:port` with default timeouts.
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_config(addr, ClientConfig::default())
    }

    pub fn with_config(addr: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send a request and wait for its response.
    pub async fn call(&self, request: Request) -> RpcResult<Response> {
        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| RpcError::Timeout {
                stage: "connect",
                after: self.config.connect_timeout,
            })?
            .map_err(|source| RpcError::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        debug!(addr = %self.addr, method = %request.method, id = %request.id, "Sending request");

        timeout(self.config.response_timeout, exchange(stream, &request))
            .await
            .map_err(|_| RpcError::Timeout {
                stage: "response",
                after: self.config.response_timeout,
            })?
    }

    /// Send a method call with parameters.
    pub async fn call_method_with_params(
        &self,
        method: Method,
        params: serde_json::Value,
    ) -> RpcResult<Response> {
        self.call(Request::with_params(method, params)).await
    }

    /// Call `method` with typed parameters and decode a typed result.
    ///
    /// Error responses become [`RpcError::MethodNotFound`] or
    /// [`RpcError::Remote`].
    pub async fn invoke<P, R>(&self, method: Method, params: &P) -> RpcResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .call_method_with_params(method, serde_json::to_value(params)?)
            .await?;

        if let Some(error) = response.error {
            return Err(match error.code {
                error_codes::METHOD_NOT_FOUND => RpcError::MethodNotFound(method.to_string()),
                code => RpcError::Remote {
                    code,
                    message: error.message,
                },
            });
        }
        Ok(response.parse_result()?)
    }
}

async fn exchange(stream: TcpStream, request: &Request) -> RpcResult<Response> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let request_json = request.to_json()?;
    writer.write_all(request_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    let mut line = String::new();
    reader.read_line(&mut line).await?;

    if line.is_empty() {
        return Err(RpcError::ConnectionClosed);
    }

    Ok(Response::from_json(line.trim())?)
}
