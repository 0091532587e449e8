//! Integration-Tests: Invarianten der Sitzung

use std::time::Duration;

use hoersaal_core::{HoersaalError, ParticipantId};
use hoersaal_protocol::PollStatus;
use hoersaal_session::{NeueUmfrage, SessionConfig, SessionEngine};

fn pid(s: &str) -> ParticipantId {
    ParticipantId::neu(s)
}

fn umfrage(options: &[&str], dauer: Option<i64>, korrekt: Option<i64>) -> NeueUmfrage {
    NeueUmfrage {
        question: "Frage?".into(),
        options: options.iter().map(|s| s.to_string()).collect(),
        duration: dauer,
        correct_answer_index: korrekt,
        creator_id: pid("lehrer"),
        creator_name: "Frau Meier".into(),
    }
}

#[tokio::test(start_paused = true)]
async fn hoechstens_eine_aktive_umfrage() {
    let engine = SessionEngine::neu(SessionConfig::default());
    let erste = engine
        .umfrage_erstellen(umfrage(&["A", "B"], Some(10), None))
        .unwrap();
    engine.umfrage_starten(erste.id, &pid("lehrer")).unwrap();

    let err = engine
        .umfrage_erstellen(umfrage(&["C", "D"], Some(10), None))
        .unwrap_err();
    assert!(matches!(err, HoersaalError::Konflikt(_)));

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(engine.umfrage(&erste.id).unwrap().status, PollStatus::Ended);

    let zweite = engine
        .umfrage_erstellen(umfrage(&["C", "D"], Some(10), None))
        .unwrap();
    engine.umfrage_starten(zweite.id, &pid("lehrer")).unwrap();

    // Eine beendete Umfrage kann nicht erneut starten
    let err = engine.umfrage_starten(erste.id, &pid("lehrer")).unwrap_err();
    assert!(matches!(err, HoersaalError::Konflikt(_)));
    assert_eq!(engine.umfrage(&erste.id).unwrap().status, PollStatus::Ended);
    assert_eq!(engine.aktuelle_umfrage().unwrap().id, zweite.id);
}

#[tokio::test(start_paused = true)]
async fn tally_summe_entspricht_antworten() {
    let engine = SessionEngine::neu(SessionConfig::default());
    let poll = engine
        .umfrage_erstellen(umfrage(&["A", "B", "C"], Some(10), Some(2)))
        .unwrap();
    engine.umfrage_starten(poll.id, &pid("lehrer")).unwrap();

    let wahl = ["A", "C", "C", "B", "C", "A", "C"];
    for (i, option) in wahl.iter().enumerate() {
        let id = format!("p{i}");
        engine.antwort_abgeben(poll.id, pid(&id), &id, option).unwrap();
    }
    // Abgelehnte Versuche zaehlen nicht
    let _ = engine.antwort_abgeben(poll.id, pid("p0"), "p0", "B");
    let _ = engine.antwort_abgeben(poll.id, pid("neu"), "Neu", "Z");

    tokio::time::sleep(Duration::from_secs(11)).await;

    let view = engine.aktuelle_umfrage().unwrap();
    let ergebnisse = view.final_results.unwrap();
    let summe: u32 = ergebnisse.iter().map(|r| r.count).sum();
    assert_eq!(summe as usize, wahl.len());
    assert_eq!(view.total_responses, wahl.len());

    let summary = view.summary.unwrap();
    assert_eq!(summary.total_responses, 7);
    assert_eq!(summary.correct_responses, 4);
    assert_eq!(summary.incorrect_responses, 3);
    assert_eq!(summary.correct_percentage, 57);
    assert_eq!(summary.incorrect_percentage, 100 - summary.correct_percentage);
}

#[tokio::test(start_paused = true)]
async fn leere_umfrage_ergaenzt_sich_zu_100() {
    let engine = SessionEngine::neu(SessionConfig::default());
    let poll = engine
        .umfrage_erstellen(umfrage(&["A", "B"], Some(10), None))
        .unwrap();
    engine.umfrage_starten(poll.id, &pid("lehrer")).unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    let summary = engine.aktuelle_umfrage().unwrap().summary.unwrap();
    assert_eq!(summary.correct_percentage, 0);
    assert_eq!(summary.incorrect_percentage, 100);
}

#[tokio::test(start_paused = true)]
async fn ausschluss_ueberdauert_trennung() {
    let engine = SessionEngine::neu(SessionConfig::default());
    let (presenter, _rx) = engine.verbindung_oeffnen();
    engine
        .als_presenter_beitreten(presenter, pid("lehrer"), "Frau Meier")
        .unwrap();
    let (paul, _rx_paul) = engine.verbindung_oeffnen();
    engine.beitreten(Some(paul), pid("p"), "Paul").unwrap();

    let poll = engine
        .umfrage_erstellen(umfrage(&["A", "B"], Some(30), None))
        .unwrap();
    engine.umfrage_starten(poll.id, &pid("lehrer")).unwrap();

    engine.kicken(presenter, pid("p"), None).unwrap();
    engine.verbindung_getrennt(&paul);

    // Neue Verbindung, gleiche ID
    let (neu, _rx_neu) = engine.verbindung_oeffnen();
    let err = engine.beitreten(Some(neu), pid("p"), "Paul").unwrap_err();
    assert!(matches!(err, HoersaalError::ZugriffVerweigert(_)));

    let err = engine
        .antwort_abgeben(poll.id, pid("p"), "Paul", "A")
        .unwrap_err();
    assert!(matches!(err, HoersaalError::ZugriffVerweigert(_)));
    assert!(engine.ist_ausgeschlossen(&pid("p")));
}

#[test]
fn dauer_und_index_werden_geklemmt() {
    let engine = SessionEngine::neu(SessionConfig::default());

    let kurz = engine
        .umfrage_erstellen(umfrage(&["A", "B"], Some(5), Some(-1)))
        .unwrap();
    assert_eq!(kurz.duration, 10);
    assert_eq!(kurz.correct_answer_index, 0);

    let lang = engine
        .umfrage_erstellen(umfrage(&["A", "B"], Some(1000), Some(2)))
        .unwrap();
    assert_eq!(lang.duration, 300);
    assert_eq!(lang.correct_answer_index, 1);

    let standard = engine
        .umfrage_erstellen(umfrage(&["A", "B"], None, None))
        .unwrap();
    assert_eq!(standard.duration, 60);
    assert_eq!(standard.correct_answer_index, 0);
}

#[test]
fn antwort_auf_draft_ist_ungueltig() {
    let engine = SessionEngine::neu(SessionConfig::default());
    let poll = engine
        .umfrage_erstellen(umfrage(&["A", "B"], None, None))
        .unwrap();
    let err = engine
        .antwort_abgeben(poll.id, pid("p"), "Paul", "A")
        .unwrap_err();
    assert!(matches!(err, HoersaalError::UngueltigeEingabe(_)));

    let err = engine
        .antwort_abgeben(hoersaal_core::PollId::new(), pid("p"), "Paul", "A")
        .unwrap_err();
    assert!(matches!(err, HoersaalError::NichtGefunden(_)));
}

#[test]
fn unabhaengige_instanzen_teilen_nichts() {
    let a = SessionEngine::neu(SessionConfig::default());
    let b = SessionEngine::neu(SessionConfig::default());
    a.beitreten(None, pid("p"), "Paul").unwrap();
    assert_eq!(a.roster().len(), 1);
    assert!(b.roster().is_empty());
}
