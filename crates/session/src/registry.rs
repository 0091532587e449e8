//! Teilnehmer-Registry – Roster, Ausschlussliste und Verbindungs-Bindungen
//!
//! Wer ist beigetreten, wer wurde dauerhaft entfernt, und welche
//! Live-Verbindung gehoert zu welchem Teilnehmer. Die Ausschlussliste
//! (`EjectedSet`) waechst nur; es gibt keinen Weg eine ID wieder zu entfernen.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use hoersaal_core::{ConnectionId, HoersaalError, ParticipantId, Result, Rolle};
use hoersaal_protocol::ParticipantInfo;

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Ein beigetretener Teilnehmer im Roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub rolle: Rolle,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            participant_id: self.id.clone(),
            participant_name: self.name.clone(),
            role: self.rolle,
            joined_at: self.joined_at,
        }
    }
}

/// Welcher Teilnehmer in welcher Rolle hinter einer Verbindung steht
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindung {
    pub participant_id: ParticipantId,
    pub name: String,
    pub rolle: Rolle,
}

/// Menge dauerhaft ausgeschlossener Teilnehmer-IDs
pub type EjectedSet = HashSet<ParticipantId>;

// ---------------------------------------------------------------------------
// ParticipantRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    teilnehmer: HashMap<ParticipantId, Participant>,
    ausgeschlossen: EjectedSet,
    bindungen: HashMap<ConnectionId, Bindung>,
}

impl ParticipantRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn ist_ausgeschlossen(&self, participant_id: &ParticipantId) -> bool {
        self.ausgeschlossen.contains(participant_id)
    }

    /// Nimmt einen Respondent in den Roster auf
    ///
    /// Ein vorhandener Eintrag mit gleicher ID wird ueberschrieben,
    /// `joined_at` wird neu gesetzt.
    pub fn beitreten(
        &mut self,
        participant_id: ParticipantId,
        name: &str,
        jetzt: DateTime<Utc>,
    ) -> Result<Participant> {
        let name = name.trim();
        if participant_id.ist_leer() || name.is_empty() {
            return Err(HoersaalError::ungueltig("Teilnehmer-ID und -Name erforderlich"));
        }
        if self.ist_ausgeschlossen(&participant_id) {
            return Err(HoersaalError::verweigert(
                "Teilnehmer wurde aus der Sitzung entfernt",
            ));
        }

        let participant = Participant {
            id: participant_id.clone(),
            name: name.to_string(),
            rolle: Rolle::Respondent,
            joined_at: jetzt,
        };
        self.teilnehmer.insert(participant_id, participant.clone());
        Ok(participant)
    }

    /// Bindet einen Teilnehmer an eine Verbindung
    ///
    /// Aeltere Verbindungen mit derselben Teilnehmer-ID verlieren ihre
    /// Bindung; deren Trennung entfernt den Teilnehmer danach nicht mehr.
    pub fn verbindung_binden(&mut self, connection_id: ConnectionId, bindung: Bindung) {
        self.bindungen
            .retain(|cid, b| *cid == connection_id || b.participant_id != bindung.participant_id);
        self.bindungen.insert(connection_id, bindung);
    }

    pub fn bindung(&self, connection_id: &ConnectionId) -> Option<&Bindung> {
        self.bindungen.get(connection_id)
    }

    /// Verbindung an die ein Teilnehmer aktuell gebunden ist
    pub fn verbindung_von(&self, participant_id: &ParticipantId) -> Option<ConnectionId> {
        self.bindungen
            .iter()
            .find(|(_, b)| &b.participant_id == participant_id)
            .map(|(cid, _)| *cid)
    }

    /// Schliesst einen Teilnehmer dauerhaft aus
    ///
    /// Entfernt den Roster-Eintrag und die Respondent-Bindung. Gibt die
    /// Verbindung zurueck die der Teilnehmer als Respondent benutzt hat.
    /// Eine Presenter-Bindung mit derselben ID bleibt bestehen.
    pub fn ausschliessen(&mut self, participant_id: &ParticipantId) -> Option<ConnectionId> {
        self.ausgeschlossen.insert(participant_id.clone());
        self.teilnehmer.remove(participant_id);

        let verbindung = self
            .bindungen
            .iter()
            .find(|(_, b)| &b.participant_id == participant_id && b.rolle == Rolle::Respondent)
            .map(|(cid, _)| *cid);
        if let Some(cid) = verbindung {
            self.bindungen.remove(&cid);
        }
        verbindung
    }

    /// Loest die Bindung einer getrennten Verbindung
    ///
    /// War ein Respondent daran gebunden, wird er aus dem Roster entfernt und
    /// zurueckgegeben. Die Ausschlussliste bleibt unberuehrt.
    pub fn verbindung_trennen(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let bindung = self.bindungen.remove(connection_id)?;
        if bindung.rolle != Rolle::Respondent {
            return None;
        }
        self.teilnehmer.remove(&bindung.participant_id)
    }

    /// Aktueller Roster, sortiert nach Beitrittszeit
    pub fn roster(&self) -> Vec<ParticipantInfo> {
        let mut liste: Vec<&Participant> = self.teilnehmer.values().collect();
        liste.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
        liste.into_iter().map(Participant::info).collect()
    }

    pub fn teilnehmer_anzahl(&self) -> usize {
        self.teilnehmer.len()
    }

    pub fn ist_im_roster(&self, participant_id: &ParticipantId) -> bool {
        self.teilnehmer.contains_key(participant_id)
    }
}
