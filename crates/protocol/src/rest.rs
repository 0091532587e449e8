//! Antwort-Typen fuer die Request/Response-Schnittstelle

use chrono::{DateTime, Utc};
use hoersaal_core::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::views::{ChatMessageInfo, HistoryEntry, ParticipantInfo, PollView, ResponseInfo};

/// Health-Check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Aktueller Sitzungszustand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPollResponse {
    pub poll: Option<PollView>,
    pub participants: Vec<ParticipantInfo>,
    pub chat_messages: Vec<ChatMessageInfo>,
}

/// Archiv eines Erstellers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
    pub total: usize,
}

/// Antwortstatus eines einzelnen Teilnehmers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponseStatus {
    pub has_responded: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<ResponseInfo>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Ergebnis einer abgegebenen Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseResult {
    pub message: String,
    pub is_correct: bool,
}

/// Ergebnis eines Beitritts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResult {
    pub message: String,
    pub participant: ParticipantInfo,
}

/// Chat-Verlauf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagesResponse {
    pub messages: Vec<ChatMessageInfo>,
}

// ---------------------------------------------------------------------------
// Request-Bodies
// ---------------------------------------------------------------------------
//
// Fehlende Felder werden mit Default gefuellt, damit die Engine sie als
// Validierungsfehler meldet statt des JSON-Extraktors.

/// Body fuer `POST /api/poll`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub duration: Option<i64>,
    pub correct_answer_index: Option<i64>,
    pub creator_id: ParticipantId,
    pub creator_name: String,
}

/// Body fuer `POST /api/poll/{pollId}/start`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartPollRequest {
    pub requester_id: ParticipantId,
}

/// Body fuer `POST /api/poll/{pollId}/respond`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitResponseRequest {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub selected_option: String,
}

/// Body fuer `POST /api/participants/join`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub participant_id: ParticipantId,
    pub participant_name: String,
}
