//! HTTP endpoint of a chord node: inbound commands and the status snapshot.
#![warn(missing_docs)]
mod http_error;

use std::net::TcpListener;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;

use self::http_error::HttpError;
use crate::client::CHORD_PATH;
use crate::client::STATUS_PATH;
use crate::error::Error;
use crate::error::Result;
use crate::prelude::http;
use crate::prelude::Address;
use crate::prelude::Command;
use crate::prelude::PeerRing;
use crate::prelude::Response;
use crate::prelude::TopoInfo;

/// Shared state of the handlers.
#[derive(Clone)]
pub struct ChordState {
    dht: Arc<PeerRing>,
}

/// Bind the listening socket of the node at `address`.
pub fn bind(address: &Address) -> Result<TcpListener> {
    TcpListener::bind(address.to_string()).map_err(|e| Error::BindError(e.to_string()))
}

/// Routes of the node, see [CHORD_PATH] and [STATUS_PATH].
pub fn router(dht: Arc<PeerRing>) -> Router {
    let state = Arc::new(ChordState { dht });
    Router::new()
        .route(CHORD_PATH, post(chord_handler).with_state(state.clone()))
        .route(STATUS_PATH, get(status_handler).with_state(state))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(node_info_header))
}

/// Serve the node on an already bound listener until the server fails.
pub async fn run_http_api(listener: TcpListener, dht: Arc<PeerRing>) -> anyhow::Result<()> {
    listener.set_nonblocking(true)?;
    let local = listener.local_addr()?;
    tracing::info!("Chord endpoint: http://{}{}", local, CHORD_PATH);
    axum::Server::from_tcp(listener)?
        .serve(router(dht).into_make_service())
        .await?;
    Ok(())
}

async fn chord_handler(
    State(state): State<Arc<ChordState>>,
    body: String,
) -> std::result::Result<axum::Json<Response>, HttpError> {
    let command: Command = serde_json::from_str(&body)?;
    let resp = state.dht.handle_command(command).await?;
    Ok(axum::Json(resp))
}

async fn status_handler(
    State(state): State<Arc<ChordState>>,
) -> std::result::Result<axum::Json<TopoInfo>, HttpError> {
    Ok(axum::Json(state.dht.topo_info()?))
}

async fn node_info_header<B>(
    req: http::Request<B>,
    next: axum::middleware::Next<B>,
) -> axum::response::Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    if let Ok(version) = http::HeaderValue::from_str(crate::util::build_version().as_str()) {
        headers.insert("X-NODE-VERSION", version);
    }
    res
}
