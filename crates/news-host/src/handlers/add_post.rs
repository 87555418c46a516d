//! Reporter submission handler.

use crate::{HostError, HostState};
use news_protocol::{AddPostParams, AddPostResult};
use news_rpc::{error_codes, Method, Response, RpcServer};
use tracing::{error, warn};

/// Register the add_post handler.
pub async fn register(server: &RpcServer, state: HostState) {
    server
        .register_handler(Method::AddPost, move |req| {
            let state = state.clone();
            async move {
                let item = match req
                    .parse_params::<AddPostParams>()
                    .and_then(AddPostParams::into_item)
                {
                    Ok(item) => item,
                    Err(e) => {
                        warn!(error = %e, "Rejecting malformed submission");
                        return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string());
                    }
                };

                match state.submit(item).await {
                    Ok(record) => Response::success_with(
                        &req.id,
                        &AddPostResult {
                            accepted: true,
                            id: record.id,
                        },
                    ),
                    Err(e @ HostError::Database(_)) => {
                        error!(error = %e, "Submission not stored");
                        Response::error(&req.id, error_codes::STORAGE_ERROR, &e.to_string())
                    }
                    Err(e) => {
                        error!(error = %e, "Submission failed");
                        Response::error(&req.id, error_codes::INTERNAL_ERROR, &e.to_string())
                    }
                }
            }
        })
        .await;
}
