//! PollStore – Aktuelle Umfrage und Archiv beendeter Umfragen

use std::collections::HashMap;

use hoersaal_core::{ParticipantId, PollId};
use hoersaal_protocol::{HistoryEntry, PollStatus};

use crate::poll::Poll;

/// Archiv-Eintrag mit Ersteller, damit nach ihm gefiltert werden kann
#[derive(Debug, Clone)]
struct Archiviert {
    creator_id: ParticipantId,
    eintrag: HistoryEntry,
}

/// Haelt alle Umfragen der Sitzung nach ID, die aktuelle Umfrage und die History
#[derive(Debug, Default)]
pub struct PollStore {
    umfragen: HashMap<PollId, Poll>,
    aktuell: Option<PollId>,
    history: Vec<Archiviert>,
}

impl PollStore {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Speichert eine Umfrage und macht sie zur aktuellen
    ///
    /// Ein nie gestarteter Draft der bisher aktuell war wird verworfen.
    pub fn einfuegen(&mut self, poll: Poll) {
        if let Some(alt) = self.aktuell {
            if self.umfragen.get(&alt).map(Poll::status) == Some(PollStatus::Draft) {
                self.umfragen.remove(&alt);
            }
        }
        let id = poll.id();
        self.umfragen.insert(id, poll);
        self.aktuell = Some(id);
    }

    pub fn get(&self, id: &PollId) -> Option<&Poll> {
        self.umfragen.get(id)
    }

    pub fn get_mut(&mut self, id: &PollId) -> Option<&mut Poll> {
        self.umfragen.get_mut(id)
    }

    pub fn aktuelle(&self) -> Option<&Poll> {
        self.aktuell.and_then(|id| self.umfragen.get(&id))
    }

    pub fn aktuell_setzen(&mut self, id: PollId) {
        if self.umfragen.contains_key(&id) {
            self.aktuell = Some(id);
        }
    }

    /// Ob irgendeine Umfrage gerade aktiv ist
    pub fn hat_aktive(&self) -> bool {
        self.umfragen.values().any(Poll::ist_aktiv)
    }

    pub fn anzahl_aktive(&self) -> usize {
        self.umfragen.values().filter(|p| p.ist_aktiv()).count()
    }

    /// Haengt einen Eintrag an die History an
    pub fn archivieren(&mut self, creator_id: ParticipantId, eintrag: HistoryEntry) {
        self.history.push(Archiviert { creator_id, eintrag });
    }

    /// Alle archivierten Umfragen eines Erstellers in Archivierungsreihenfolge
    pub fn history_von(&self, creator_id: &ParticipantId) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .filter(|a| &a.creator_id == creator_id)
            .map(|a| a.eintrag.clone())
            .collect()
    }

    pub fn history_laenge(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::poll::NeueUmfrage;
    use chrono::Utc;

    fn umfrage(creator: &str) -> Poll {
        Poll::erstellen(
            NeueUmfrage {
                question: "Frage?".into(),
                options: vec!["Ja".into(), "Nein".into()],
                creator_id: ParticipantId::neu(creator),
                creator_name: creator.into(),
                ..Default::default()
            },
            &SessionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn einfuegen_ersetzt_aktuelle() {
        let mut store = PollStore::neu();
        let erste = umfrage("a");
        let erste_id = erste.id();
        store.einfuegen(erste);
        let zweite = umfrage("a");
        let zweite_id = zweite.id();
        store.einfuegen(zweite);

        assert_eq!(store.aktuelle().map(Poll::id), Some(zweite_id));
        assert!(store.get(&erste_id).is_none(), "ersetzter Draft wird verworfen");
    }

    #[test]
    fn beendete_umfrage_bleibt_nach_ersetzen_abrufbar() {
        let mut store = PollStore::neu();
        let mut erste = umfrage("a");
        let erste_id = erste.id();
        erste.aktivieren(Utc::now()).unwrap();
        erste.abschliessen(Utc::now()).unwrap();
        store.einfuegen(erste);
        store.einfuegen(umfrage("a"));

        assert_eq!(store.get(&erste_id).map(Poll::status), Some(PollStatus::Ended));
    }

    #[test]
    fn hat_aktive_erkennt_aktive_umfrage() {
        let mut store = PollStore::neu();
        let poll = umfrage("a");
        let id = poll.id();
        store.einfuegen(poll);
        assert!(!store.hat_aktive());

        store.get_mut(&id).unwrap().aktivieren(Utc::now()).unwrap();
        assert!(store.hat_aktive());
        assert_eq!(store.anzahl_aktive(), 1);
    }

    #[test]
    fn history_wird_nach_ersteller_gefiltert() {
        let mut store = PollStore::neu();
        for creator in ["a", "b", "a"] {
            let mut poll = umfrage(creator);
            poll.aktivieren(Utc::now()).unwrap();
            poll.abschliessen(Utc::now()).unwrap();
            let eintrag = poll.history_eintrag(vec![]).unwrap();
            store.archivieren(ParticipantId::neu(creator), eintrag);
        }

        assert_eq!(store.history_laenge(), 3);
        assert_eq!(store.history_von(&ParticipantId::neu("a")).len(), 2);
        assert_eq!(store.history_von(&ParticipantId::neu("b")).len(), 1);
        assert!(store.history_von(&ParticipantId::neu("c")).is_empty());
    }
}
