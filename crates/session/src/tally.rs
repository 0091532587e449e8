//! Tally – Stimmenzaehler einer einzelnen Option

use hoersaal_core::ParticipantId;
use hoersaal_protocol::{Respondent, TallyEntry};

/// Zaehlerstand und Liste der Teilnehmer die eine Option gewaehlt haben
///
/// `anzahl` ist immer gleich der Laenge von `respondenten`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    anzahl: u32,
    respondenten: Vec<(ParticipantId, String)>,
}

impl Tally {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Zaehlt eine Stimme und merkt sich den Teilnehmer
    pub fn stimme_zaehlen(&mut self, participant_id: ParticipantId, name: impl Into<String>) {
        self.anzahl += 1;
        self.respondenten.push((participant_id, name.into()));
    }

    pub fn anzahl(&self) -> u32 {
        self.anzahl
    }

    pub fn respondenten(&self) -> &[(ParticipantId, String)] {
        &self.respondenten
    }

    /// Wire-Darstellung fuer eine Option
    pub fn eintrag(&self, option: &str) -> TallyEntry {
        TallyEntry {
            option: option.to_string(),
            count: self.anzahl,
            respondents: self
                .respondenten
                .iter()
                .map(|(id, name)| Respondent {
                    participant_id: id.clone(),
                    participant_name: name.clone(),
                })
                .collect(),
        }
    }
}
