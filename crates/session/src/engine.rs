//! SessionEngine – Orchestriert Umfragen, Teilnehmer, Chat und Countdown
//!
//! Die Engine ist der einzige Ort an dem der Sitzungszustand veraendert
//! wird. Jede Operation laeuft komplett unter einem Mutex:
//!
//! ```text
//! lock -> validieren -> mutieren -> Events einreihen -> unlock
//! ```
//!
//! Weil die Events noch unter dem Lock in die Send-Queues eingereiht werden,
//! sehen alle Verbindungen dieselbe Reihenfolge. Der Countdown-Task nimmt
//! denselben Lock fuer jeden Tick, kann also nie mit einem Befehl
//! ueberlappen.

use std::sync::{Arc, Weak};

use chrono::Utc;
use hoersaal_chat::{ChatLog, ChatNachricht};
use hoersaal_core::{ConnectionId, HoersaalError, ParticipantId, PollId, Result, Rolle};
use hoersaal_protocol::rest::{CurrentPollResponse, HistoryResponse, ParticipantResponseStatus};
use hoersaal_protocol::{ChatMessageInfo, ParticipantInfo, PollView, ServerEvent, STANDARD_KICK_GRUND};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::broadcast::EventBroadcaster;
use crate::config::SessionConfig;
use crate::countdown::{CountdownTimer, Fortsetzung};
use crate::poll::{NeueUmfrage, Poll};
use crate::registry::{Bindung, ParticipantRegistry};
use crate::store::PollStore;

/// Grund im `participantRemoved`-Event wenn eine Verbindung getrennt wurde
pub const GRUND_GETRENNT: &str = "disconnected";

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

struct SessionZustand {
    umfragen: PollStore,
    registry: ParticipantRegistry,
    chat: ChatLog,
    countdown: Option<CountdownTimer>,
}

struct EngineInner {
    config: SessionConfig,
    broadcaster: EventBroadcaster,
    zustand: Mutex<SessionZustand>,
}

// ---------------------------------------------------------------------------
// SessionEngine
// ---------------------------------------------------------------------------

/// Die Sitzung eines Hoersaals
///
/// Clone teilt den inneren Zustand. Es gibt genau eine Instanz pro Prozess,
/// Tests koennen beliebig viele unabhaengige Instanzen erzeugen.
#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<EngineInner>,
}

impl SessionEngine {
    pub fn neu(config: SessionConfig) -> Self {
        let zustand = SessionZustand {
            umfragen: PollStore::neu(),
            registry: ParticipantRegistry::neu(),
            chat: ChatLog::neu(config.chat_kapazitaet),
            countdown: None,
        };
        Self {
            inner: Arc::new(EngineInner {
                broadcaster: EventBroadcaster::neu(config.sende_queue_groesse),
                config,
                zustand: Mutex::new(zustand),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------------
    // Umfrage-Lebenszyklus
    // -----------------------------------------------------------------------

    /// Erstellt eine neue Umfrage im Zustand `Draft` und macht sie zur aktuellen
    ///
    /// Es wird kein Event verteilt; erst der Start ist fuer Clients sichtbar.
    pub fn umfrage_erstellen(&self, anfrage: NeueUmfrage) -> Result<PollView> {
        let poll = Poll::erstellen(anfrage, &self.inner.config)?;

        let mut zustand = self.inner.zustand.lock();
        if zustand.umfragen.hat_aktive() {
            return Err(HoersaalError::konflikt(
                "Es laeuft bereits eine aktive Umfrage",
            ));
        }

        let view = poll.view();
        tracing::info!(
            poll_id = %view.id,
            creator_id = %view.creator_id,
            optionen = view.options.len(),
            dauer_sek = view.duration,
            "Umfrage erstellt"
        );
        zustand.umfragen.einfuegen(poll);
        Ok(view)
    }

    /// Startet eine Umfrage: Draft -> Active
    ///
    /// Leert den Chat, startet den Countdown und verteilt `pollStarted`.
    pub fn umfrage_starten(&self, poll_id: PollId, requester_id: &ParticipantId) -> Result<PollView> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(HoersaalError::intern(
                "Countdown benoetigt eine laufende Tokio-Runtime",
            ));
        }

        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        let poll = zustand
            .umfragen
            .get(&poll_id)
            .ok_or_else(|| HoersaalError::nicht_gefunden(format!("Umfrage {poll_id}")))?;
        if poll.creator_id() != requester_id {
            return Err(HoersaalError::verweigert(
                "Nur der Ersteller darf die Umfrage starten",
            ));
        }
        if !poll.ist_aktiv() && zustand.umfragen.hat_aktive() {
            return Err(HoersaalError::konflikt(
                "Es laeuft bereits eine andere aktive Umfrage",
            ));
        }

        let poll = zustand
            .umfragen
            .get_mut(&poll_id)
            .ok_or_else(|| HoersaalError::nicht_gefunden(format!("Umfrage {poll_id}")))?;
        poll.aktivieren(Utc::now())?;
        let view = poll.view();

        zustand.umfragen.aktuell_setzen(poll_id);
        zustand.chat.leeren();
        zustand.countdown = Some(self.countdown_starten(poll_id));

        tracing::info!(poll_id = %poll_id, dauer_sek = view.duration, "Umfrage gestartet");
        self.inner.broadcaster.an_alle_senden(ServerEvent::PollStarted {
            poll: view.clone(),
            participants: zustand.registry.roster(),
        });
        Ok(view)
    }

    fn countdown_starten(&self, poll_id: PollId) -> CountdownTimer {
        let schwach: Weak<EngineInner> = Arc::downgrade(&self.inner);
        CountdownTimer::starten(poll_id, self.inner.config.tick, move || {
            match schwach.upgrade() {
                Some(inner) => inner.countdown_tick(poll_id),
                None => Fortsetzung::Stopp,
            }
        })
    }

    /// Nimmt eine Antwort auf die angegebene Umfrage an
    ///
    /// Gibt zurueck ob die gewaehlte Option die korrekte war.
    pub fn antwort_abgeben(
        &self,
        poll_id: PollId,
        participant_id: ParticipantId,
        participant_name: &str,
        selected_option: &str,
    ) -> Result<bool> {
        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        if zustand.registry.ist_ausgeschlossen(&participant_id) {
            return Err(HoersaalError::verweigert(
                "Teilnehmer wurde aus der Sitzung entfernt",
            ));
        }
        let poll = zustand
            .umfragen
            .get_mut(&poll_id)
            .ok_or_else(|| HoersaalError::nicht_gefunden(format!("Umfrage {poll_id}")))?;

        let participant_name = participant_name.trim();
        if participant_id.ist_leer() || participant_name.is_empty() {
            return Err(HoersaalError::ungueltig("Teilnehmer-ID und -Name erforderlich"));
        }

        let response =
            poll.antwort_erfassen(participant_id, participant_name, selected_option, Utc::now())?;

        tracing::debug!(
            poll_id = %poll_id,
            participant_id = %response.participant_id,
            korrekt = response.is_correct,
            "Antwort erfasst"
        );
        self.inner
            .broadcaster
            .an_alle_senden(ServerEvent::ResponseSubmitted {
                poll: poll.view(),
                tally: poll.tally_view(),
                response: response.info(),
            });
        Ok(response.is_correct)
    }

    // -----------------------------------------------------------------------
    // Teilnehmer
    // -----------------------------------------------------------------------

    /// Tritt als Respondent bei
    ///
    /// Mit Verbindung wird diese an den Teilnehmer gebunden und erhaelt
    /// `connectionEstablished`. Alle Verbindungen erhalten `participantJoined`.
    pub fn beitreten(
        &self,
        verbindung: Option<ConnectionId>,
        participant_id: ParticipantId,
        participant_name: &str,
    ) -> Result<ParticipantInfo> {
        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        let participant =
            zustand
                .registry
                .beitreten(participant_id, participant_name, Utc::now())?;
        let info = participant.info();

        if let Some(connection_id) = verbindung {
            zustand.registry.verbindung_binden(
                connection_id,
                Bindung {
                    participant_id: participant.id.clone(),
                    name: participant.name.clone(),
                    rolle: Rolle::Respondent,
                },
            );
            self.verbindung_begruessen(zustand, connection_id, Rolle::Respondent);
        }

        tracing::info!(
            participant_id = %info.participant_id,
            name = %info.participant_name,
            "Teilnehmer beigetreten"
        );
        self.inner
            .broadcaster
            .an_alle_senden(ServerEvent::ParticipantJoined {
                participant: info.clone(),
                participants: zustand.registry.roster(),
            });
        Ok(info)
    }

    /// Registriert eine Verbindung als Presenter
    ///
    /// Der Presenter erscheint nicht im Roster, es gibt keinen Broadcast.
    pub fn als_presenter_beitreten(
        &self,
        verbindung: ConnectionId,
        presenter_id: ParticipantId,
        presenter_name: &str,
    ) -> Result<()> {
        let presenter_name = presenter_name.trim();
        if presenter_id.ist_leer() || presenter_name.is_empty() {
            return Err(HoersaalError::ungueltig("Presenter-ID und -Name erforderlich"));
        }

        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        tracing::info!(
            connection_id = %verbindung,
            presenter_id = %presenter_id,
            "Presenter verbunden"
        );
        zustand.registry.verbindung_binden(
            verbindung,
            Bindung {
                participant_id: presenter_id,
                name: presenter_name.to_string(),
                rolle: Rolle::Presenter,
            },
        );
        self.verbindung_begruessen(zustand, verbindung, Rolle::Presenter);
        Ok(())
    }

    fn verbindung_begruessen(&self, zustand: &SessionZustand, verbindung: ConnectionId, role: Rolle) {
        let event = ServerEvent::ConnectionEstablished {
            role,
            poll: zustand.umfragen.aktuelle().map(Poll::view),
            participants: zustand.registry.roster(),
            chat_messages: zustand.chat.nachrichten().map(chat_info).collect(),
        };
        self.inner.broadcaster.an_verbindung_senden(&verbindung, event);
    }

    /// Entfernt einen Teilnehmer dauerhaft aus der Sitzung
    ///
    /// Nur eine als Presenter gebundene Verbindung darf kicken. Die Verbindung
    /// des Entfernten erhaelt `kickedOut` und wird aus dem Broadcaster
    /// genommen, alle anderen erhalten `participantRemoved`.
    pub fn kicken(
        &self,
        akteur: ConnectionId,
        participant_id: ParticipantId,
        grund: Option<String>,
    ) -> Result<()> {
        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        let ist_presenter = zustand
            .registry
            .bindung(&akteur)
            .is_some_and(|b| b.rolle == Rolle::Presenter);
        if !ist_presenter {
            return Err(HoersaalError::verweigert(
                "Nur der Presenter darf Teilnehmer entfernen",
            ));
        }
        if participant_id.ist_leer() {
            return Err(HoersaalError::ungueltig("Teilnehmer-ID erforderlich"));
        }

        let reason = grund
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| STANDARD_KICK_GRUND.to_string());

        if let Some(verbindung) = zustand.registry.ausschliessen(&participant_id) {
            self.inner.broadcaster.an_verbindung_senden(
                &verbindung,
                ServerEvent::KickedOut {
                    reason: reason.clone(),
                },
            );
            self.inner.broadcaster.verbindung_entfernen(&verbindung);
        }

        tracing::info!(
            participant_id = %participant_id,
            grund = %reason,
            "Teilnehmer entfernt"
        );
        self.inner
            .broadcaster
            .an_alle_senden(ServerEvent::ParticipantRemoved {
                participant_id,
                reason,
                participants: zustand.registry.roster(),
            });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Verbindungen
    // -----------------------------------------------------------------------

    /// Oeffnet eine Live-Verbindung und gibt ihre Event-Queue zurueck
    pub fn verbindung_oeffnen(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let connection_id = ConnectionId::new();
        let rx = self.inner.broadcaster.verbindung_registrieren(connection_id);
        (connection_id, rx)
    }

    /// Schickt ein Event nur an eine Verbindung, z.B. eine Fehlermeldung
    pub fn an_verbindung_senden(&self, verbindung: &ConnectionId, event: ServerEvent) -> bool {
        self.inner.broadcaster.an_verbindung_senden(verbindung, event)
    }

    /// Raeumt eine getrennte Verbindung auf
    ///
    /// War ein Respondent gebunden, wird er aus dem Roster entfernt und
    /// `participantRemoved` mit Grund "disconnected" verteilt.
    pub fn verbindung_getrennt(&self, verbindung: &ConnectionId) {
        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        self.inner.broadcaster.verbindung_entfernen(verbindung);
        let Some(participant) = zustand.registry.verbindung_trennen(verbindung) else {
            return;
        };

        tracing::info!(
            connection_id = %verbindung,
            participant_id = %participant.id,
            "Teilnehmer getrennt"
        );
        self.inner
            .broadcaster
            .an_alle_senden(ServerEvent::ParticipantRemoved {
                participant_id: participant.id,
                reason: GRUND_GETRENNT.to_string(),
                participants: zustand.registry.roster(),
            });
    }

    pub fn verbindung_anzahl(&self) -> usize {
        self.inner.broadcaster.verbindung_anzahl()
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Postet eine Chat-Nachricht und verteilt `newMessage`
    ///
    /// Nachrichten ausgeschlossener Respondents und leere Nachrichten werden
    /// still verworfen; dann ist die Rueckgabe `None`.
    pub fn nachricht_posten(
        &self,
        text: &str,
        sender_id: ParticipantId,
        sender_name: &str,
        sender_rolle: Rolle,
    ) -> Option<ChatMessageInfo> {
        let mut guard = self.inner.zustand.lock();
        let zustand = &mut *guard;

        if sender_rolle == Rolle::Respondent && zustand.registry.ist_ausgeschlossen(&sender_id) {
            tracing::debug!(sender_id = %sender_id, "Nachricht eines ausgeschlossenen Teilnehmers verworfen");
            return None;
        }

        let nachricht = match zustand
            .chat
            .nachricht_posten(text, sender_id, sender_name, sender_rolle)
        {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(fehler = %e, "Chat-Nachricht verworfen");
                return None;
            }
        };

        let info = chat_info(&nachricht);
        self.inner
            .broadcaster
            .an_alle_senden(ServerEvent::NewMessage(info.clone()));
        Some(info)
    }

    pub fn chat_nachrichten(&self) -> Vec<ChatMessageInfo> {
        self.inner.zustand.lock().chat.nachrichten().map(chat_info).collect()
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    /// Aktuelle Umfrage, Roster und Chat
    pub fn aktueller_zustand(&self) -> CurrentPollResponse {
        let zustand = self.inner.zustand.lock();
        CurrentPollResponse {
            poll: zustand.umfragen.aktuelle().map(Poll::view),
            participants: zustand.registry.roster(),
            chat_messages: zustand.chat.nachrichten().map(chat_info).collect(),
        }
    }

    pub fn aktuelle_umfrage(&self) -> Option<PollView> {
        self.inner.zustand.lock().umfragen.aktuelle().map(Poll::view)
    }

    pub fn umfrage(&self, poll_id: &PollId) -> Option<PollView> {
        self.inner.zustand.lock().umfragen.get(poll_id).map(Poll::view)
    }

    /// Archivierte Umfragen eines Erstellers
    pub fn history(&self, creator_id: &ParticipantId) -> HistoryResponse {
        let history = self.inner.zustand.lock().umfragen.history_von(creator_id);
        HistoryResponse {
            total: history.len(),
            history,
        }
    }

    /// Ob und wie ein Teilnehmer auf eine Umfrage geantwortet hat
    pub fn antwort_status(
        &self,
        poll_id: &PollId,
        participant_id: &ParticipantId,
    ) -> Result<ParticipantResponseStatus> {
        let zustand = self.inner.zustand.lock();
        let poll = zustand
            .umfragen
            .get(poll_id)
            .ok_or_else(|| HoersaalError::nicht_gefunden(format!("Umfrage {poll_id}")))?;

        Ok(match poll.antwort_von(participant_id) {
            Some(response) => ParticipantResponseStatus {
                has_responded: true,
                response: Some(response.info()),
                is_correct: Some(response.is_correct),
                correct_answer: Some(poll.korrekte_antwort().to_string()),
                timestamp: Some(response.timestamp),
            },
            None => ParticipantResponseStatus::default(),
        })
    }

    pub fn roster(&self) -> Vec<ParticipantInfo> {
        self.inner.zustand.lock().registry.roster()
    }

    /// Rolle unter der eine Verbindung beigetreten ist
    pub fn verbindungs_rolle(&self, verbindung: &ConnectionId) -> Option<Rolle> {
        self.inner
            .zustand
            .lock()
            .registry
            .bindung(verbindung)
            .map(|b| b.rolle)
    }

    pub fn ist_ausgeschlossen(&self, participant_id: &ParticipantId) -> bool {
        self.inner.zustand.lock().registry.ist_ausgeschlossen(participant_id)
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus
    // -----------------------------------------------------------------------

    /// Bricht einen laufenden Countdown ab
    ///
    /// Die Umfrage bleibt aktiv, es wird kein `pollEnded` verteilt.
    pub fn herunterfahren(&self) {
        let countdown = self.inner.zustand.lock().countdown.take();
        if let Some(timer) = countdown {
            timer.abbrechen();
            tracing::info!(poll_id = %timer.poll_id(), "Countdown beim Herunterfahren abgebrochen");
        }
        tracing::info!("Sitzung heruntergefahren");
    }
}

// ---------------------------------------------------------------------------
// Countdown-Pfad
// ---------------------------------------------------------------------------

impl EngineInner {
    /// Ein Tick des Countdowns: Restzeit senken, `timerUpdate` verteilen,
    /// bei 0 die Umfrage beenden
    fn countdown_tick(&self, poll_id: PollId) -> Fortsetzung {
        let mut guard = self.zustand.lock();
        let zustand = &mut *guard;

        let Some(poll) = zustand.umfragen.get_mut(&poll_id) else {
            return Fortsetzung::Stopp;
        };
        if !poll.ist_aktiv() {
            return Fortsetzung::Stopp;
        }

        let time_left = poll.sekunde_abziehen();
        tracing::trace!(poll_id = %poll_id, time_left, "Countdown-Tick");
        self.broadcaster
            .an_alle_senden(ServerEvent::TimerUpdate { poll_id, time_left });

        if time_left <= 0 {
            self.umfrage_beenden(zustand, poll_id);
            return Fortsetzung::Stopp;
        }
        Fortsetzung::Weiter
    }

    /// Active -> Ended, archiviert die Umfrage und verteilt `pollEnded`
    fn umfrage_beenden(&self, zustand: &mut SessionZustand, poll_id: PollId) {
        let roster = zustand.registry.roster();
        let Some(poll) = zustand.umfragen.get_mut(&poll_id) else {
            return;
        };

        let (results, summary) = match poll.abschliessen(Utc::now()) {
            Ok(ergebnis) => ergebnis,
            Err(e) => {
                tracing::error!(poll_id = %poll_id, fehler = %e, "Umfrage konnte nicht beendet werden");
                return;
            }
        };
        let view = poll.view();
        let creator_id = poll.creator_id().clone();
        if let Some(eintrag) = poll.history_eintrag(roster) {
            zustand.umfragen.archivieren(creator_id, eintrag);
        }

        // Der Timer ruft uns selbst auf; er endet nach diesem Tick ohnehin
        if zustand
            .countdown
            .as_ref()
            .is_some_and(|t| t.poll_id() == poll_id)
        {
            zustand.countdown = None;
        }

        tracing::info!(
            poll_id = %poll_id,
            antworten = summary.total_responses,
            korrekt_prozent = summary.correct_percentage,
            "Umfrage beendet"
        );
        self.broadcaster.an_alle_senden(ServerEvent::PollEnded {
            poll: view,
            results,
            summary,
        });
    }
}

fn chat_info(nachricht: &ChatNachricht) -> ChatMessageInfo {
    ChatMessageInfo {
        id: nachricht.id,
        message: nachricht.text.clone(),
        sender_id: nachricht.sender_id.clone(),
        sender_name: nachricht.sender_name.clone(),
        sender_role: nachricht.sender_rolle,
        timestamp: nachricht.zeitstempel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anfrage(creator: &str) -> NeueUmfrage {
        NeueUmfrage {
            question: "2 + 2?".into(),
            options: vec!["4".into(), "5".into()],
            duration: Some(10),
            correct_answer_index: Some(0),
            creator_id: ParticipantId::neu(creator),
            creator_name: "Lehrer".into(),
        }
    }

    #[test]
    fn starten_ohne_runtime_ist_interner_fehler() {
        let engine = SessionEngine::neu(SessionConfig::default());
        let view = engine.umfrage_erstellen(anfrage("lehrer")).unwrap();
        let err = engine
            .umfrage_starten(view.id, &ParticipantId::neu("lehrer"))
            .unwrap_err();
        assert!(matches!(err, HoersaalError::Intern(_)));
        assert_eq!(
            engine.aktuelle_umfrage().unwrap().status,
            hoersaal_protocol::PollStatus::Draft
        );
    }

    #[test]
    fn erstellen_verteilt_kein_event() {
        let engine = SessionEngine::neu(SessionConfig::default());
        let (_cid, mut rx) = engine.verbindung_oeffnen();
        engine.umfrage_erstellen(anfrage("lehrer")).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn kick_durch_respondent_ist_verboten() {
        let engine = SessionEngine::neu(SessionConfig::default());
        let (cid, _rx) = engine.verbindung_oeffnen();
        engine
            .beitreten(Some(cid), ParticipantId::neu("p1"), "Anna")
            .unwrap();
        let err = engine
            .kicken(cid, ParticipantId::neu("p2"), None)
            .unwrap_err();
        assert!(matches!(err, HoersaalError::ZugriffVerweigert(_)));
        assert!(!engine.ist_ausgeschlossen(&ParticipantId::neu("p2")));
    }

    #[test]
    fn getrennte_verbindung_wird_abgemeldet() {
        let engine = SessionEngine::neu(SessionConfig::default());
        let (cid, _rx) = engine.verbindung_oeffnen();
        assert_eq!(engine.verbindung_anzahl(), 1);
        engine.verbindung_getrennt(&cid);
        assert_eq!(engine.verbindung_anzahl(), 0);
    }
}
