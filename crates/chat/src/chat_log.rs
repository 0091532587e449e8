//! ChatLog – Begrenzter Nachrichtenpuffer einer Sitzung
//!
//! Neue Nachrichten werden angehaengt. Ist die Kapazitaet ueberschritten,
//! fallen die aeltesten Nachrichten zuerst heraus. Der Puffer wird bei
//! jedem Umfrage-Start geleert.

use std::collections::VecDeque;

use chrono::Utc;
use hoersaal_core::{MessageId, ParticipantId, Rolle};

use crate::{
    error::{ChatError, ChatResult},
    types::ChatNachricht,
};

/// Standard-Kapazitaet des Puffers
pub const STANDARD_KAPAZITAET: usize = 100;

/// Laengere Nachrichten werden auf diese Zeichenanzahl gekuerzt
pub const MAX_NACHRICHTEN_LAENGE: usize = 1000;

#[derive(Debug, Clone)]
pub struct ChatLog {
    nachrichten: VecDeque<ChatNachricht>,
    kapazitaet: usize,
}

impl ChatLog {
    /// Erstellt einen leeren Puffer. Eine Kapazitaet von 0 wird auf 1 angehoben.
    pub fn neu(kapazitaet: usize) -> Self {
        let kapazitaet = kapazitaet.max(1);
        Self {
            nachrichten: VecDeque::with_capacity(kapazitaet),
            kapazitaet,
        }
    }

    /// Haengt eine neue Nachricht an und gibt sie zurueck
    pub fn nachricht_posten(
        &mut self,
        text: &str,
        sender_id: ParticipantId,
        sender_name: &str,
        sender_rolle: Rolle,
    ) -> ChatResult<ChatNachricht> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Nachrichteninhalt darf nicht leer sein".into(),
            ));
        }

        let text: String = if text.chars().count() > MAX_NACHRICHTEN_LAENGE {
            text.chars().take(MAX_NACHRICHTEN_LAENGE).collect()
        } else {
            text.to_string()
        };

        let nachricht = ChatNachricht {
            id: MessageId::new(),
            text,
            sender_id,
            sender_name: sender_name.trim().to_string(),
            sender_rolle,
            zeitstempel: Utc::now(),
        };

        self.nachrichten.push_back(nachricht.clone());
        while self.nachrichten.len() > self.kapazitaet {
            self.nachrichten.pop_front();
        }

        tracing::debug!(
            sender_id = %nachricht.sender_id,
            anzahl = self.nachrichten.len(),
            "Chat-Nachricht angehaengt"
        );
        Ok(nachricht)
    }

    /// Leert den Puffer
    pub fn leeren(&mut self) {
        self.nachrichten.clear();
    }

    /// Alle Nachrichten, aelteste zuerst
    pub fn nachrichten(&self) -> impl Iterator<Item = &ChatNachricht> {
        self.nachrichten.iter()
    }

    pub fn len(&self) -> usize {
        self.nachrichten.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nachrichten.is_empty()
    }

    pub fn kapazitaet(&self) -> usize {
        self.kapazitaet
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::neu(STANDARD_KAPAZITAET)
    }
}
