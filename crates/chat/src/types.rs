//! Oeffentliche Typen fuer den Chat

use chrono::{DateTime, Utc};
use hoersaal_core::{MessageId, ParticipantId, Rolle};
use serde::{Deserialize, Serialize};

/// Eine Chat-Nachricht (Domain-Typ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNachricht {
    pub id: MessageId,
    pub text: String,
    pub sender_id: ParticipantId,
    pub sender_name: String,
    pub sender_rolle: Rolle,
    pub zeitstempel: DateTime<Utc>,
}
