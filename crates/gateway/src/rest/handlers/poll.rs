//! REST-Handler fuer Umfrage-Endpunkte

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use hoersaal_core::ParticipantId;
use hoersaal_protocol::rest::{
    CreatePollRequest, CurrentPollResponse, HistoryResponse, ParticipantResponseStatus,
    StartPollRequest, SubmitResponseRequest, SubmitResponseResult,
};
use hoersaal_protocol::PollView;
use hoersaal_session::NeueUmfrage;

use super::poll_id_parsen;
use crate::error::GatewayResult;
use crate::state::GatewayState;

/// GET /api/poll/current
pub async fn aktueller_zustand(State(state): State<GatewayState>) -> Json<CurrentPollResponse> {
    Json(state.engine.aktueller_zustand())
}

/// GET /api/poll/history/:creator_id
pub async fn history(
    State(state): State<GatewayState>,
    Path(creator_id): Path<String>,
) -> Json<HistoryResponse> {
    Json(state.engine.history(&ParticipantId::neu(creator_id)))
}

/// GET /api/poll/:poll_id/response/:participant_id
pub async fn antwort_status(
    State(state): State<GatewayState>,
    Path((poll_id, participant_id)): Path<(String, String)>,
) -> GatewayResult<Json<ParticipantResponseStatus>> {
    let poll_id = poll_id_parsen(&poll_id)?;
    let status = state
        .engine
        .antwort_status(&poll_id, &ParticipantId::neu(participant_id))?;
    Ok(Json(status))
}

/// POST /api/poll
pub async fn umfrage_erstellen(
    State(state): State<GatewayState>,
    body: Result<Json<CreatePollRequest>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<PollView>)> {
    let Json(body) = body?;
    let view = state.engine.umfrage_erstellen(NeueUmfrage {
        question: body.question,
        options: body.options,
        duration: body.duration,
        correct_answer_index: body.correct_answer_index,
        creator_id: body.creator_id,
        creator_name: body.creator_name,
    })?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/poll/:poll_id/start
pub async fn umfrage_starten(
    State(state): State<GatewayState>,
    Path(poll_id): Path<String>,
    body: Result<Json<StartPollRequest>, JsonRejection>,
) -> GatewayResult<Json<PollView>> {
    let Json(body) = body?;
    let poll_id = poll_id_parsen(&poll_id)?;
    let view = state.engine.umfrage_starten(poll_id, &body.requester_id)?;
    state.metriken.polls_started_total.inc();
    Ok(Json(view))
}

/// POST /api/poll/:poll_id/respond
pub async fn antwort_abgeben(
    State(state): State<GatewayState>,
    Path(poll_id): Path<String>,
    body: Result<Json<SubmitResponseRequest>, JsonRejection>,
) -> GatewayResult<Json<SubmitResponseResult>> {
    let Json(body) = body?;
    let poll_id = poll_id_parsen(&poll_id)?;
    let is_correct = state.engine.antwort_abgeben(
        poll_id,
        body.participant_id,
        &body.participant_name,
        &body.selected_option,
    )?;
    state.metriken.responses_total.inc();

    Ok(Json(SubmitResponseResult {
        message: "Antwort gespeichert".to_string(),
        is_correct,
    }))
}
