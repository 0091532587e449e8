//! REST-Handler fuer Teilnehmer-Endpunkte

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use hoersaal_protocol::rest::{JoinRequest, JoinResult};

use crate::error::GatewayResult;
use crate::state::GatewayState;

/// POST /api/participants/join
///
/// Ohne Live-Verbindung gibt es kein `connectionEstablished`, nur den
/// Broadcast `participantJoined`.
pub async fn beitreten(
    State(state): State<GatewayState>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> GatewayResult<Json<JoinResult>> {
    let Json(body) = body?;
    let participant = state
        .engine
        .beitreten(None, body.participant_id, &body.participant_name)?;
    state.teilnehmer_metrik_aktualisieren();

    Ok(Json(JoinResult {
        message: "Erfolgreich beigetreten".to_string(),
        participant,
    }))
}
