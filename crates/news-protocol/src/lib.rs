//! Wire types shared by every news-relay process.
//!
//! This crate provides:
//! - `Request` / `Response` envelopes for the newline-delimited JSON RPC
//! - `Method` tags and standard `error_codes`
//! - Typed parameter and result payloads for each method
//! - `NewsItem`, the (source, headline) payload, with its XML form

mod error;
mod news;
mod params;
mod protocol;

pub use error::{ProtocolError, ProtocolResult};
pub use news::NewsItem;
pub use params::{
    AddPostParams, AddPostResult, AcceptedResult, PublishParams, PublishResultParams,
    RegisterParams, RegisterResult,
};
pub use protocol::{error_codes, ErrorInfo, Method, Request, Response};
