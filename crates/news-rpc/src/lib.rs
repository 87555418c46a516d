//! RPC transport for the news services.
//!
//! Newline-delimited JSON over TCP: one `Request` per line in, one
//! `Response` per line out. Connections are served concurrently up to a
//! configured limit, and every outbound call is bounded by connect and
//! response timeouts.

mod client;
mod error;
mod server;

pub use client::{ClientConfig, RpcClient};
pub use error::{RpcError, RpcResult};
pub use news_protocol::{error_codes, Method, Request, Response};
pub use server::{HandlerFn, RpcServer, ServerConfig};
