//! Axum-based RPC server.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use powdist_distributor::WorkDistributor;

use crate::error::RpcError;
use crate::handlers;

/// State shared by every handler.
#[derive(Clone)]
pub struct RpcState {
    pub distributor: Arc<WorkDistributor>,
    /// Serve `GET /metrics`. When false the route is not mounted.
    pub metrics_enabled: bool,
}

/// Build the router: `POST /pow` and, when enabled, `GET /metrics`.
pub fn router(state: RpcState) -> Router {
    let mut app = Router::new().route("/pow", post(handlers::pow));
    if state.metrics_enabled {
        app = app.route("/metrics", get(handlers::metrics));
    }
    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub struct RpcServer {
    pub addr: String,
    pub state: RpcState,
}

impl RpcServer {
    pub fn new(addr: impl Into<String>, state: RpcState) -> Self {
        Self {
            addr: addr.into(),
            state,
        }
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.addr).await?;
        serve(listener, self.state.clone(), shutdown).await
    }
}

/// Serve on an already-bound listener. Once `shutdown` resolves no new
/// connections are accepted, and in-flight work requests run to completion.
pub async fn serve<F>(listener: TcpListener, state: RpcState, shutdown: F) -> Result<(), RpcError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "RPC server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("RPC server stopped");
    Ok(())
}
