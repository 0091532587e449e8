//! Poll – Eine Frage mit Optionen und begrenztem Abstimmungsfenster
//!
//! ## Lebenszyklus
//! ```text
//! Draft --aktivieren--> Active --abschliessen--> Ended
//! ```
//! Aus `Ended` fuehrt kein Uebergang heraus.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hoersaal_core::{HoersaalError, ParticipantId, PollId, Result};
use hoersaal_protocol::{
    HistoryEntry, OptionResult, ParticipantInfo, PollStatus, PollView, ResponseInfo,
    ResultSummary, TallyEntry,
};

use crate::config::SessionConfig;
use crate::tally::Tally;

/// Eingabe fuer eine neue Umfrage, wie sie vom Client kommt
#[derive(Debug, Clone, Default)]
pub struct NeueUmfrage {
    pub question: String,
    pub options: Vec<String>,
    /// Sekunden, wird in die konfigurierten Grenzen geklemmt
    pub duration: Option<i64>,
    /// Wird in `[0, options.len() - 1]` geklemmt
    pub correct_answer_index: Option<i64>,
    pub creator_id: ParticipantId,
    pub creator_name: String,
}

/// Eine aufgezeichnete, unveraenderliche Antwort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub selected_option: String,
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
}

impl Response {
    pub fn info(&self) -> ResponseInfo {
        ResponseInfo {
            participant_id: self.participant_id.clone(),
            participant_name: self.participant_name.clone(),
            selected_option: self.selected_option.clone(),
            timestamp: self.timestamp,
            is_correct: self.is_correct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Poll {
    id: PollId,
    question: String,
    options: Vec<String>,
    duration: u32,
    correct_answer_index: usize,
    status: PollStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    time_left: i64,
    creator_id: ParticipantId,
    creator_name: String,
    created_at: DateTime<Utc>,
    responses: HashMap<ParticipantId, Response>,
    tally: HashMap<String, Tally>,
    final_results: Option<Vec<OptionResult>>,
    summary: Option<ResultSummary>,
}

impl Poll {
    /// Validiert die Eingabe und erstellt eine Umfrage im Zustand `Draft`
    pub fn erstellen(anfrage: NeueUmfrage, config: &SessionConfig) -> Result<Self> {
        let question = anfrage.question.trim().to_string();
        if question.is_empty() {
            return Err(HoersaalError::ungueltig("Frage darf nicht leer sein"));
        }

        let options: Vec<String> = anfrage
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if options.len() < 2 {
            return Err(HoersaalError::ungueltig(
                "Mindestens zwei nicht-leere Optionen erforderlich",
            ));
        }
        // Tally und Korrektheit haengen am Optionstext
        let mut gesehen = HashSet::new();
        if let Some(doppelt) = options.iter().find(|o| !gesehen.insert(o.as_str())) {
            return Err(HoersaalError::ungueltig(format!(
                "Option '{doppelt}' ist mehrfach vorhanden"
            )));
        }

        let creator_name = anfrage.creator_name.trim().to_string();
        if anfrage.creator_id.ist_leer() || creator_name.is_empty() {
            return Err(HoersaalError::ungueltig("Ersteller-ID und -Name erforderlich"));
        }

        let duration = config.dauer_klemmen(anfrage.duration);
        let hoechster_index = (options.len() - 1) as i64;
        let correct_answer_index =
            anfrage.correct_answer_index.unwrap_or(0).clamp(0, hoechster_index) as usize;

        Ok(Self {
            id: PollId::new(),
            question,
            options,
            duration,
            correct_answer_index,
            status: PollStatus::Draft,
            start_time: None,
            end_time: None,
            time_left: i64::from(duration),
            creator_id: anfrage.creator_id,
            creator_name,
            created_at: Utc::now(),
            responses: HashMap::new(),
            tally: HashMap::new(),
            final_results: None,
            summary: None,
        })
    }

    pub fn id(&self) -> PollId {
        self.id
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn ist_aktiv(&self) -> bool {
        self.status == PollStatus::Active
    }

    pub fn creator_id(&self) -> &ParticipantId {
        &self.creator_id
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn time_left(&self) -> i64 {
        self.time_left
    }

    /// Text der korrekten Option
    pub fn korrekte_antwort(&self) -> &str {
        &self.options[self.correct_answer_index]
    }

    pub fn antwort_von(&self, participant_id: &ParticipantId) -> Option<&Response> {
        self.responses.get(participant_id)
    }

    pub fn anzahl_antworten(&self) -> usize {
        self.responses.len()
    }

    /// Draft -> Active
    ///
    /// Setzt Antworten zurueck und legt fuer jede Option einen leeren
    /// Zaehler an.
    pub fn aktivieren(&mut self, jetzt: DateTime<Utc>) -> Result<()> {
        match self.status {
            PollStatus::Draft => {}
            PollStatus::Active => {
                return Err(HoersaalError::konflikt("Umfrage ist bereits aktiv"));
            }
            PollStatus::Ended => {
                return Err(HoersaalError::konflikt("Umfrage ist bereits beendet"));
            }
        }

        self.status = PollStatus::Active;
        self.start_time = Some(jetzt);
        self.end_time = Some(jetzt + ChronoDuration::seconds(i64::from(self.duration)));
        self.time_left = i64::from(self.duration);
        self.responses.clear();
        self.tally = self
            .options
            .iter()
            .map(|o| (o.clone(), Tally::neu()))
            .collect();
        Ok(())
    }

    /// Zeichnet eine Antwort auf und zaehlt sie
    pub fn antwort_erfassen(
        &mut self,
        participant_id: ParticipantId,
        participant_name: &str,
        selected_option: &str,
        jetzt: DateTime<Utc>,
    ) -> Result<Response> {
        if !self.ist_aktiv() {
            return Err(HoersaalError::ungueltig("Umfrage ist nicht aktiv"));
        }

        let Some(index) = self.options.iter().position(|o| o == selected_option) else {
            return Err(HoersaalError::ungueltig(format!(
                "Ungueltige Option: '{selected_option}'"
            )));
        };

        if self.responses.contains_key(&participant_id) {
            return Err(HoersaalError::konflikt(
                "Teilnehmer hat diese Umfrage bereits beantwortet",
            ));
        }

        let response = Response {
            participant_id: participant_id.clone(),
            participant_name: participant_name.to_string(),
            selected_option: selected_option.to_string(),
            timestamp: jetzt,
            is_correct: index == self.correct_answer_index,
        };

        self.tally
            .entry(response.selected_option.clone())
            .or_default()
            .stimme_zaehlen(participant_id.clone(), participant_name);
        self.responses.insert(participant_id, response.clone());
        Ok(response)
    }

    /// Zaehlt den Countdown um eine Sekunde herunter und gibt den neuen Wert zurueck
    pub fn sekunde_abziehen(&mut self) -> i64 {
        self.time_left -= 1;
        self.time_left
    }

    /// Active -> Ended, berechnet Endergebnis und Zusammenfassung
    pub fn abschliessen(&mut self, jetzt: DateTime<Utc>) -> Result<(Vec<OptionResult>, ResultSummary)> {
        if !self.ist_aktiv() {
            return Err(HoersaalError::konflikt("Nur aktive Umfragen koennen enden"));
        }

        let total: u32 = self.tally.values().map(Tally::anzahl).sum();

        let results: Vec<OptionResult> = self
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let count = self.tally.get(option).map(Tally::anzahl).unwrap_or(0);
                OptionResult {
                    option: option.clone(),
                    count,
                    percentage: prozent(count, total),
                    is_correct_option: index == self.correct_answer_index,
                }
            })
            .collect();

        let correct = results
            .get(self.correct_answer_index)
            .map(|r| r.count)
            .unwrap_or(0);
        let correct_percentage = prozent(correct, total);
        let summary = ResultSummary {
            total_responses: total,
            correct_responses: correct,
            incorrect_responses: total - correct,
            correct_percentage,
            incorrect_percentage: 100 - correct_percentage,
        };

        self.status = PollStatus::Ended;
        self.end_time = Some(jetzt);
        self.time_left = 0;
        self.final_results = Some(results.clone());
        self.summary = Some(summary.clone());
        Ok((results, summary))
    }

    /// Zaehlerstand aller Optionen in Deklarationsreihenfolge
    pub fn tally_view(&self) -> Vec<TallyEntry> {
        self.options
            .iter()
            .map(|o| match self.tally.get(o) {
                Some(t) => t.eintrag(o),
                None => Tally::neu().eintrag(o),
            })
            .collect()
    }

    pub fn view(&self) -> PollView {
        PollView {
            id: self.id,
            question: self.question.clone(),
            options: self.options.clone(),
            duration: self.duration,
            correct_answer_index: self.correct_answer_index,
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            time_left: self.time_left,
            creator_id: self.creator_id.clone(),
            creator_name: self.creator_name.clone(),
            created_at: self.created_at,
            total_responses: self.responses.len(),
            final_results: self.final_results.clone(),
            summary: self.summary.clone(),
        }
    }

    /// Archiv-Eintrag, nur fuer beendete Umfragen
    pub fn history_eintrag(&self, roster: Vec<ParticipantInfo>) -> Option<HistoryEntry> {
        let results = self.final_results.clone()?;
        let summary = self.summary.clone()?;
        Some(HistoryEntry {
            id: self.id,
            question: self.question.clone(),
            options: self.options.clone(),
            total_votes: summary.total_responses,
            results,
            summary,
            correct_answer: self.korrekte_antwort().to_string(),
            created_at: self.created_at,
            end_time: self.end_time,
            participants: roster,
        })
    }
}

/// Prozentanteil, kaufmaennisch gerundet (0.5 rundet auf). 0 wenn `gesamt` 0 ist.
fn prozent(teil: u32, gesamt: u32) -> u32 {
    if gesamt == 0 {
        return 0;
    }
    let (teil, gesamt) = (u64::from(teil), u64::from(gesamt));
    ((teil * 200 + gesamt) / (gesamt * 2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anfrage(options: &[&str]) -> NeueUmfrage {
        NeueUmfrage {
            question: "Hauptstadt von Frankreich?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            duration: Some(30),
            correct_answer_index: Some(0),
            creator_id: ParticipantId::neu("lehrer"),
            creator_name: "Frau Meier".into(),
        }
    }

    fn aktive_umfrage(options: &[&str]) -> Poll {
        let mut poll = Poll::erstellen(anfrage(options), &SessionConfig::default()).unwrap();
        poll.aktivieren(Utc::now()).unwrap();
        poll
    }

    #[test]
    fn erstellen_trimmt_und_filtert_optionen() {
        let poll =
            Poll::erstellen(anfrage(&[" Paris ", "", "  ", "Lyon"]), &SessionConfig::default())
                .unwrap();
        assert_eq!(poll.options(), &["Paris".to_string(), "Lyon".to_string()]);
        assert_eq!(poll.status(), PollStatus::Draft);
    }

    #[test]
    fn erstellen_lehnt_leere_frage_ab() {
        let mut a = anfrage(&["A", "B"]);
        a.question = "   ".into();
        let err = Poll::erstellen(a, &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));
    }

    #[test]
    fn erstellen_lehnt_zu_wenige_optionen_ab() {
        let err = Poll::erstellen(anfrage(&["A", " "]), &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));
    }

    #[test]
    fn erstellen_lehnt_doppelte_optionen_ab() {
        let err = Poll::erstellen(anfrage(&["A", " A ", "B"]), &SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));

        // Gross-/Kleinschreibung unterscheidet Optionen
        assert!(Poll::erstellen(anfrage(&["a", "A"]), &SessionConfig::default()).is_ok());
    }

    #[test]
    fn ergebnis_zaehlt_jede_antwort_einmal() {
        let mut poll = aktive_umfrage(&["A", "B", "C"]);
        poll.antwort_erfassen(ParticipantId::neu("p1"), "Anna", "B", Utc::now())
            .unwrap();
        let (ergebnisse, summary) = poll.abschliessen(Utc::now()).unwrap();

        let summe: u32 = ergebnisse.iter().map(|e| e.count).sum();
        assert_eq!(summe, 1);
        assert_eq!(summe, summary.total_responses);
    }

    #[test]
    fn erstellen_lehnt_fehlenden_ersteller_ab() {
        let mut a = anfrage(&["A", "B"]);
        a.creator_id = ParticipantId::neu("");
        let err = Poll::erstellen(a, &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));
    }

    #[test]
    fn korrekter_index_wird_geklemmt() {
        let mut a = anfrage(&["A", "B", "C"]);
        a.correct_answer_index = Some(-1);
        let poll = Poll::erstellen(a.clone(), &SessionConfig::default()).unwrap();
        assert_eq!(poll.view().correct_answer_index, 0);

        a.correct_answer_index = Some(3);
        let poll = Poll::erstellen(a, &SessionConfig::default()).unwrap();
        assert_eq!(poll.view().correct_answer_index, 2);
        assert_eq!(poll.korrekte_antwort(), "C");
    }

    #[test]
    fn aktivieren_setzt_zeiten_und_leere_zaehler() {
        let poll = aktive_umfrage(&["A", "B"]);
        let view = poll.view();
        assert_eq!(view.status, PollStatus::Active);
        assert_eq!(view.time_left, 30);
        let start = view.start_time.unwrap();
        assert_eq!(view.end_time.unwrap() - start, ChronoDuration::seconds(30));
        let tally = poll.tally_view();
        assert_eq!(tally.len(), 2);
        assert!(tally.iter().all(|t| t.count == 0));
    }

    #[test]
    fn doppeltes_aktivieren_ist_konflikt() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        let err = poll.aktivieren(Utc::now()).unwrap_err();
        assert!(matches!(err, HoersaalError::Konflikt(_)));
    }

    #[test]
    fn antwort_im_draft_ist_ungueltig() {
        let mut poll = Poll::erstellen(anfrage(&["A", "B"]), &SessionConfig::default()).unwrap();
        let err = poll
            .antwort_erfassen(ParticipantId::neu("p1"), "Anna", "A", Utc::now())
            .unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));
    }

    #[test]
    fn antwort_mit_unbekannter_option_ist_ungueltig() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        let err = poll
            .antwort_erfassen(ParticipantId::neu("p1"), "Anna", "Z", Utc::now())
            .unwrap_err();
        assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));
        assert_eq!(poll.anzahl_antworten(), 0);
    }

    #[test]
    fn zweite_antwort_ist_konflikt_und_aendert_tally_nicht() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        let erste = poll
            .antwort_erfassen(ParticipantId::neu("p1"), "Anna", "A", Utc::now())
            .unwrap();
        assert!(erste.is_correct);

        let err = poll
            .antwort_erfassen(ParticipantId::neu("p1"), "Anna", "B", Utc::now())
            .unwrap_err();
        assert!(matches!(err, HoersaalError::Konflikt(_)));

        let tally = poll.tally_view();
        assert_eq!(tally[0].count, 1);
        assert_eq!(tally[1].count, 0);
    }

    #[test]
    fn abschliessen_berechnet_ergebnisse() {
        let mut poll = aktive_umfrage(&["A", "B", "C"]);
        for (pid, option) in [("p1", "A"), ("p2", "B"), ("p3", "B")] {
            poll.antwort_erfassen(ParticipantId::neu(pid), pid, option, Utc::now())
                .unwrap();
        }

        let (results, summary) = poll.abschliessen(Utc::now()).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!((results[0].count, results[0].percentage), (1, 33));
        assert_eq!((results[1].count, results[1].percentage), (2, 67));
        assert_eq!((results[2].count, results[2].percentage), (0, 0));
        assert!(results[0].is_correct_option);
        assert!(!results[1].is_correct_option);

        assert_eq!(summary.total_responses, 3);
        assert_eq!(summary.correct_responses, 1);
        assert_eq!(summary.incorrect_responses, 2);
        assert_eq!(summary.correct_percentage, 33);
        assert_eq!(summary.incorrect_percentage, 67);
        assert_eq!(poll.status(), PollStatus::Ended);
        assert_eq!(poll.time_left(), 0);
    }

    #[test]
    fn abschliessen_ohne_antworten() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        let (results, summary) = poll.abschliessen(Utc::now()).unwrap();
        assert!(results.iter().all(|r| r.percentage == 0));
        assert_eq!(summary.correct_percentage, 0);
        assert_eq!(summary.incorrect_percentage, 100);
    }

    #[test]
    fn beendete_umfrage_bleibt_beendet() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        poll.abschliessen(Utc::now()).unwrap();
        assert!(poll.aktivieren(Utc::now()).is_err());
        assert!(poll.abschliessen(Utc::now()).is_err());
    }

    #[test]
    fn prozent_rundet_halb_auf() {
        assert_eq!(prozent(1, 8), 13); // 12.5
        assert_eq!(prozent(1, 3), 33);
        assert_eq!(prozent(2, 3), 67);
        assert_eq!(prozent(1, 2), 50);
        assert_eq!(prozent(0, 0), 0);
    }

    #[test]
    fn prozente_summieren_nicht_zwingend_zu_100() {
        // Drei gleich grosse Anteile runden unabhaengig voneinander
        let summe: u32 = [prozent(1, 3), prozent(1, 3), prozent(1, 3)].iter().sum();
        assert_eq!(summe, 99);
    }

    #[test]
    fn history_eintrag_nur_fuer_beendete() {
        let mut poll = aktive_umfrage(&["A", "B"]);
        assert!(poll.history_eintrag(vec![]).is_none());
        poll.abschliessen(Utc::now()).unwrap();
        let eintrag = poll.history_eintrag(vec![]).unwrap();
        assert_eq!(eintrag.correct_answer, "A");
        assert_eq!(eintrag.total_votes, 0);
    }
}
