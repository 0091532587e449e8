//! Unit-Tests fuer den ChatLog

use hoersaal_core::{ParticipantId, Rolle};

use crate::{
    chat_log::{ChatLog, MAX_NACHRICHTEN_LAENGE, STANDARD_KAPAZITAET},
    error::ChatError,
};

fn posten(log: &mut ChatLog, text: &str) {
    log.nachricht_posten(text, ParticipantId::neu("p1"), "Anna", Rolle::Respondent)
        .expect("Nachricht posten fehlgeschlagen");
}

#[test]
fn test_nachricht_posten_erfolgreich() {
    let mut log = ChatLog::default();

    let nachricht = log
        .nachricht_posten("  Hallo Welt!  ", ParticipantId::neu("p1"), "Anna", Rolle::Respondent)
        .expect("Nachricht posten fehlgeschlagen");

    assert_eq!(nachricht.text, "Hallo Welt!");
    assert_eq!(nachricht.sender_id.as_str(), "p1");
    assert_eq!(nachricht.sender_rolle, Rolle::Respondent);
    assert_eq!(log.len(), 1);
}

#[test]
fn test_leere_nachricht_abgelehnt() {
    let mut log = ChatLog::default();

    let result = log.nachricht_posten("   ", ParticipantId::neu("p1"), "Anna", Rolle::Respondent);

    assert!(matches!(result, Err(ChatError::UngueltigeEingabe(_))));
    assert!(log.is_empty());
}

#[test]
fn test_zu_lange_nachricht_gekuerzt() {
    let mut log = ChatLog::default();

    let zu_lang = "ä".repeat(MAX_NACHRICHTEN_LAENGE + 50);
    let nachricht = log
        .nachricht_posten(&zu_lang, ParticipantId::neu("p1"), "Anna", Rolle::Respondent)
        .expect("Lange Nachricht muss gekuerzt statt abgelehnt werden");

    assert_eq!(nachricht.text.chars().count(), MAX_NACHRICHTEN_LAENGE);
}

#[test]
fn test_kapazitaet_verwirft_aelteste_zuerst() {
    let mut log = ChatLog::default();

    for i in 0..105 {
        posten(&mut log, &format!("Nachricht {i}"));
    }

    assert_eq!(log.len(), STANDARD_KAPAZITAET);
    let texte: Vec<&str> = log.nachrichten().map(|n| n.text.as_str()).collect();
    assert_eq!(texte.first(), Some(&"Nachricht 5"));
    assert_eq!(texte.last(), Some(&"Nachricht 104"));
    // Reihenfolge bleibt erhalten
    for (idx, text) in texte.iter().enumerate() {
        assert_eq!(*text, format!("Nachricht {}", idx + 5));
    }
}

#[test]
fn test_leeren() {
    let mut log = ChatLog::neu(3);
    posten(&mut log, "a");
    posten(&mut log, "b");

    log.leeren();

    assert!(log.is_empty());
    assert_eq!(log.kapazitaet(), 3);
}

#[test]
fn test_kapazitaet_null_wird_angehoben() {
    let mut log = ChatLog::neu(0);
    posten(&mut log, "a");
    posten(&mut log, "b");

    assert_eq!(log.len(), 1);
    assert_eq!(log.nachrichten().next().map(|n| n.text.as_str()), Some("b"));
}
