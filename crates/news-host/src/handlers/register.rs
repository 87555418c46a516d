//! Subscriber registration proxy.

use crate::HostState;
use news_protocol::{RegisterParams, RegisterResult};
use news_rpc::{error_codes, Method, Response, RpcError, RpcServer};
use tracing::{info, warn};

/// Register the register handler, forwarding to the publisher.
pub async fn register(server: &RpcServer, state: HostState) {
    server
        .register_handler(Method::Register, move |req| {
            let registrar = state.registrar.clone();
            async move {
                let Some(registrar) = registrar else {
                    return Response::error(
                        &req.id,
                        error_codes::METHOD_NOT_FOUND,
                        &RpcError::MethodNotFound(Method::Register.to_string()).to_string(),
                    );
                };

                let params = match req.parse_params::<RegisterParams>() {
                    Ok(params) => params,
                    Err(e) => {
                        return Response::error(&req.id, error_codes::INVALID_PARAMS, &e.to_string())
                    }
                };

                match registrar
                    .invoke::<_, RegisterResult>(Method::Register, &params)
                    .await
                {
                    Ok(result) => {
                        info!(address = %params.address, publisher = registrar.addr(), "Registration forwarded");
                        Response::success_with(&req.id, &result)
                    }
                    Err(RpcError::Remote { code, message }) => Response::error(&req.id, code, &message),
                    Err(e) => {
                        warn!(address = %params.address, error = %e, "Registration not forwarded");
                        Response::error(&req.id, error_codes::INTERNAL_ERROR, &e.to_string())
                    }
                }
            }
        })
        .await;
}
