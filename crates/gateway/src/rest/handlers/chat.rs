//! REST-Handler fuer den Chat-Verlauf

use axum::{extract::State, response::Json};
use hoersaal_protocol::rest::ChatMessagesResponse;

use crate::state::GatewayState;

/// GET /api/chat
pub async fn nachrichten(State(state): State<GatewayState>) -> Json<ChatMessagesResponse> {
    Json(ChatMessagesResponse {
        messages: state.engine.chat_nachrichten(),
    })
}
