//! View-Typen – Zustandsabbilder die an Clients gesendet werden
//!
//! Alle Typen serialisieren in camelCase. Reihenfolgen (Optionen, Tally,
//! Ergebnisse) entsprechen immer der Deklarationsreihenfolge der Optionen.

use chrono::{DateTime, Utc};
use hoersaal_core::{MessageId, ParticipantId, PollId, Rolle};
use serde::{Deserialize, Serialize};

/// Lebenszyklus-Zustand einer Umfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    /// Erstellt, nimmt noch keine Antworten an
    Draft,
    /// Nimmt Antworten an, Countdown laeuft
    Active,
    /// Terminal, Ergebnisse eingefroren
    Ended,
}

/// Vollstaendige Sicht auf eine Umfrage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    /// Dauer in Sekunden
    pub duration: u32,
    pub correct_answer_index: usize,
    pub status: PollStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Verbleibende Sekunden, nur im Zustand `active` aussagekraeftig
    pub time_left: i64,
    pub creator_id: ParticipantId,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub total_responses: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub final_results: Option<Vec<OptionResult>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<ResultSummary>,
}

/// Ein Teilnehmer der eine bestimmte Option gewaehlt hat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    pub participant_id: ParticipantId,
    pub participant_name: String,
}

/// Live-Zaehlerstand einer Option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub option: String,
    pub count: u32,
    pub respondents: Vec<Respondent>,
}

/// Endergebnis einer Option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option: String,
    pub count: u32,
    pub percentage: u32,
    pub is_correct_option: bool,
}

/// Aggregierte Korrektheits-Statistik einer beendeten Umfrage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total_responses: u32,
    pub correct_responses: u32,
    pub incorrect_responses: u32,
    pub correct_percentage: u32,
    pub incorrect_percentage: u32,
}

/// Eine aufgezeichnete Antwort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub selected_option: String,
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
}

/// Ein Teilnehmer im Roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub role: Rolle,
    pub joined_at: DateTime<Utc>,
}

/// Eine Chat-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageInfo {
    pub id: MessageId,
    pub message: String,
    pub sender_id: ParticipantId,
    pub sender_name: String,
    pub sender_role: Rolle,
    pub timestamp: DateTime<Utc>,
}

/// Archiv-Eintrag einer beendeten Umfrage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub results: Vec<OptionResult>,
    pub summary: ResultSummary,
    pub total_votes: u32,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Roster zum Zeitpunkt des Umfrage-Endes
    pub participants: Vec<ParticipantInfo>,
}
