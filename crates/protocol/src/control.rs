//! Echtzeit-Protokoll (WebSocket)
//!
//! Definiert die Befehle die ein Client ueber die Live-Verbindung sendet
//! und die Events die der Server an verbundene Clients verteilt.
//!
//! ## Design
//! - JSON-Serialisierung via serde, Feldnamen in camelCase
//! - Befehle: internally tagged ueber `type`
//! - Events: adjacently tagged, Name in `event`, Nutzlast in `data`

use hoersaal_core::{FehlerKategorie, HoersaalError, ParticipantId, PollId, Rolle};
use serde::{Deserialize, Serialize};

use crate::views::{
    ChatMessageInfo, OptionResult, ParticipantInfo, PollView, ResponseInfo, ResultSummary,
    TallyEntry,
};

/// Standard-Grund wenn der Presenter beim Kick keinen angibt
pub const STANDARD_KICK_GRUND: &str = "Removed by presenter";

// ---------------------------------------------------------------------------
// Eingehende Befehle
// ---------------------------------------------------------------------------

/// Befehl eines Clients ueber die Live-Verbindung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Als Respondent beitreten
    Join {
        participant_id: ParticipantId,
        participant_name: String,
    },
    /// Verbindung als Presenter registrieren
    JoinAsPresenter {
        presenter_id: ParticipantId,
        presenter_name: String,
    },
    /// Chat-Nachricht posten
    ChatMessage {
        message: String,
        sender_id: ParticipantId,
        sender_name: String,
        sender_role: Rolle,
    },
    /// Teilnehmer dauerhaft entfernen (nur Presenter)
    KickParticipant {
        participant_id: ParticipantId,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Antwort auf die aktive Umfrage abgeben
    SubmitResponse {
        poll_id: PollId,
        participant_id: ParticipantId,
        participant_name: String,
        selected_option: String,
    },
}

impl ClientCommand {
    /// Deserialisiert einen Befehl aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Ausgehende Events
// ---------------------------------------------------------------------------

/// Event das an eine oder alle Verbindungen verteilt wird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Gezielt an die beitretende Verbindung
    ConnectionEstablished {
        role: Rolle,
        poll: Option<PollView>,
        participants: Vec<ParticipantInfo>,
        chat_messages: Vec<ChatMessageInfo>,
    },
    PollStarted {
        poll: PollView,
        participants: Vec<ParticipantInfo>,
    },
    TimerUpdate {
        poll_id: PollId,
        time_left: i64,
    },
    ResponseSubmitted {
        poll: PollView,
        tally: Vec<TallyEntry>,
        response: ResponseInfo,
    },
    PollEnded {
        poll: PollView,
        results: Vec<OptionResult>,
        summary: ResultSummary,
    },
    ParticipantJoined {
        participant: ParticipantInfo,
        participants: Vec<ParticipantInfo>,
    },
    ParticipantRemoved {
        participant_id: ParticipantId,
        reason: String,
        participants: Vec<ParticipantInfo>,
    },
    NewMessage(ChatMessageInfo),
    /// Gezielt an die entfernte Verbindung, danach wird sie geschlossen
    KickedOut {
        reason: String,
    },
    /// Gezielt an die Verbindung deren Befehl fehlgeschlagen ist
    Error {
        code: FehlerKategorie,
        message: String,
    },
}

impl ServerEvent {
    /// Erstellt ein Fehler-Event aus einem Engine-Fehler
    pub fn fehler(fehler: &HoersaalError) -> Self {
        Self::Error {
            code: fehler.kategorie(),
            message: fehler.client_nachricht(),
        }
    }

    /// Name des Events wie er auf dem Draht erscheint
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connectionEstablished",
            Self::PollStarted { .. } => "pollStarted",
            Self::TimerUpdate { .. } => "timerUpdate",
            Self::ResponseSubmitted { .. } => "responseSubmitted",
            Self::PollEnded { .. } => "pollEnded",
            Self::ParticipantJoined { .. } => "participantJoined",
            Self::ParticipantRemoved { .. } => "participantRemoved",
            Self::NewMessage(_) => "newMessage",
            Self::KickedOut { .. } => "kickedOut",
            Self::Error { .. } => "error",
        }
    }

    /// Serialisiert das Event als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
