//! Delivery confirmation handler.

use crate::{HostError, HostState};
use news_protocol::{AcceptedResult, PublishResultParams};
use news_rpc::{error_codes, Method, Response, RpcServer};
use tracing::error;

/// Register the publish_result handler.
pub async fn register(server: &RpcServer, state: HostState) {
    server
        .register_handler(Method::PublishResult, move |req| {
            let state = state.clone();
            async move {
                let params = match req.parse_params::<PublishResultParams>() {
                    Ok(params) => params,
                    Err(e) => {
                        return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string())
                    }
                };

                match state.confirm_published(params.id).await {
                    Ok(accepted) => Response::success_with(&req.id, &AcceptedResult { accepted }),
                    Err(e) => {
                        error!(id = params.id, error = %e, "Confirmation not stored");
                        let code = match e {
                            HostError::Database(_) => error_codes::STORAGE_ERROR,
                            _ => error_codes::INTERNAL_ERROR,
                        };
                        Response::error(&req.id, code, &e.to_string())
                    }
                }
            }
        })
        .await;
}
