//! WebSocket-Interface (`/ws`)

pub mod connection;
pub mod dispatcher;

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};

pub use connection::WsVerbindung;
pub use dispatcher::BefehlsDispatcher;

use crate::state::GatewayState;

/// GET /ws – Upgrade auf eine Live-Verbindung
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| WsVerbindung::neu(state).verarbeiten(socket))
}
