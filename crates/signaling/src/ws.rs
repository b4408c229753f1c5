//! WebSocket-Endpunkt `GET /ws`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};

use crate::connection::ClientConnection;
use crate::state::SignalingState;

/// Axum-Router mit dem Signaling-Endpunkt
pub fn ws_router(state: Arc<SignalingState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    peer: Option<ConnectInfo<SocketAddr>>,
    State(state): State<Arc<SignalingState>>,
) -> Response {
    // Grob uebergrosse Frames trennen den Kanal bereits beim Lesen
    let frame_limit = state.config.max_nachricht_bytes.saturating_mul(4);
    let peer_addr = peer.map(|ConnectInfo(addr)| addr);

    ws.max_message_size(frame_limit)
        .on_upgrade(move |socket| ClientConnection::neu(state, peer_addr).verarbeiten(socket))
}
