//! RPC handlers exposed by the host.

mod add_post;
mod publish_result;
mod register;

use crate::HostState;
use news_rpc::RpcServer;
use tracing::info;

/// Register all host handlers.
///
/// `register` is only served when a registration endpoint is configured;
/// otherwise the server answers it with `METHOD_NOT_FOUND`.
pub async fn register_handlers(server: &RpcServer, state: HostState) {
    add_post::register(server, state.clone()).await;
    publish_result::register(server, state.clone()).await;
    if state.registrar.is_some() {
        register::register(server, state).await;
    }

    info!("All RPC handlers registered");
}
