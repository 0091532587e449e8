//! Befehls-Dispatcher – Routet Client-Befehle an die SessionEngine
//!
//! Jeder Text-Frame wird als `ClientCommand` gelesen und synchron
//! ausgefuehrt. Schlaegt ein Befehl fehl, erhaelt nur die ausloesende
//! Verbindung ein `error`-Event; es gibt keine weitere Antwort, die
//! Wirkung sehen alle ueber die Broadcasts der Engine.

use hoersaal_core::{ConnectionId, HoersaalError, Rolle};
use hoersaal_protocol::{ClientCommand, ServerEvent};

use crate::state::GatewayState;

/// Fuehrt die Befehle einer einzelnen Verbindung aus
pub struct BefehlsDispatcher {
    state: GatewayState,
    connection_id: ConnectionId,
}

impl BefehlsDispatcher {
    pub fn neu(state: GatewayState, connection_id: ConnectionId) -> Self {
        Self {
            state,
            connection_id,
        }
    }

    /// Verarbeitet einen rohen Text-Frame
    pub fn verarbeiten(&self, text: &str) {
        let befehl = match ClientCommand::from_json(text) {
            Ok(befehl) => befehl,
            Err(e) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    fehler = %e,
                    "Unlesbarer Befehl"
                );
                self.fehler_senden(&HoersaalError::ungueltig(format!("Ungueltiger Befehl: {e}")));
                return;
            }
        };

        if let Err(e) = self.dispatch(befehl) {
            self.fehler_senden(&e);
        }
    }

    /// Fuehrt einen gelesenen Befehl aus
    pub fn dispatch(&self, befehl: ClientCommand) -> Result<(), HoersaalError> {
        let engine = &self.state.engine;
        let metriken = &self.state.metriken;

        match befehl {
            ClientCommand::Join {
                participant_id,
                participant_name,
            } => {
                engine.beitreten(Some(self.connection_id), participant_id, &participant_name)?;
                self.state.teilnehmer_metrik_aktualisieren();
            }

            ClientCommand::JoinAsPresenter {
                presenter_id,
                presenter_name,
            } => {
                engine.als_presenter_beitreten(self.connection_id, presenter_id, &presenter_name)?;
            }

            ClientCommand::ChatMessage {
                message,
                sender_id,
                sender_name,
                sender_role,
            } => {
                // Presenter wird man nur ueber joinAsPresenter
                let rolle = engine
                    .verbindungs_rolle(&self.connection_id)
                    .unwrap_or(Rolle::Respondent);
                if rolle != sender_role {
                    tracing::debug!(
                        connection_id = %self.connection_id,
                        angegeben = ?sender_role,
                        gebunden = ?rolle,
                        "Absenderrolle aus Bindung uebernommen"
                    );
                }
                if engine
                    .nachricht_posten(&message, sender_id, &sender_name, rolle)
                    .is_some()
                {
                    metriken.chat_messages_total.inc();
                }
            }

            ClientCommand::KickParticipant {
                participant_id,
                reason,
            } => {
                engine.kicken(self.connection_id, participant_id, reason)?;
                self.state.teilnehmer_metrik_aktualisieren();
            }

            ClientCommand::SubmitResponse {
                poll_id,
                participant_id,
                participant_name,
                selected_option,
            } => {
                engine.antwort_abgeben(
                    poll_id,
                    participant_id,
                    &participant_name,
                    &selected_option,
                )?;
                metriken.responses_total.inc();
            }
        }
        Ok(())
    }

    fn fehler_senden(&self, fehler: &HoersaalError) {
        if matches!(fehler, HoersaalError::Intern(_)) {
            tracing::error!(
                connection_id = %self.connection_id,
                fehler = %fehler,
                "Interner Fehler bei Live-Befehl"
            );
        }
        self.state
            .engine
            .an_verbindung_senden(&self.connection_id, ServerEvent::fehler(fehler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoersaal_core::{FehlerKategorie, ParticipantId};
    use hoersaal_observability::HoersaalMetrics;
    use hoersaal_session::{SessionConfig, SessionEngine};
    use tokio::sync::mpsc;

    fn state() -> GatewayState {
        GatewayState::neu(
            SessionEngine::neu(SessionConfig::default()),
            HoersaalMetrics::neu().unwrap(),
        )
    }

    fn verbinden(state: &GatewayState) -> (BefehlsDispatcher, mpsc::Receiver<ServerEvent>) {
        let (cid, rx) = state.engine.verbindung_oeffnen();
        (BefehlsDispatcher::neu(state.clone(), cid), rx)
    }

    fn naechstes(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
        rx.try_recv().expect("Event erwartet")
    }

    #[test]
    fn unlesbarer_frame_ergibt_validierungsfehler() {
        let state = state();
        let (dispatcher, mut rx) = verbinden(&state);

        dispatcher.verarbeiten("{kein json");

        match naechstes(&mut rx) {
            ServerEvent::Error { code, .. } => assert_eq!(code, FehlerKategorie::Validation),
            anderes => panic!("Unerwartetes Event: {anderes:?}"),
        }
    }

    #[test]
    fn unbekannter_typ_ergibt_validierungsfehler() {
        let state = state();
        let (dispatcher, mut rx) = verbinden(&state);

        dispatcher.verarbeiten(r#"{"type":"endPoll"}"#);

        assert!(matches!(naechstes(&mut rx), ServerEvent::Error { .. }));
    }

    #[test]
    fn join_ueber_socket() {
        let state = state();
        let (dispatcher, mut rx) = verbinden(&state);

        dispatcher.verarbeiten(r#"{"type":"join","participantId":"p1","participantName":"Anna"}"#);

        assert_eq!(naechstes(&mut rx).name(), "connectionEstablished");
        assert_eq!(naechstes(&mut rx).name(), "participantJoined");
        assert_eq!(state.engine.roster().len(), 1);
        assert_eq!(state.metriken.participants.get(), 1.0);
    }

    #[test]
    fn fehler_geht_nur_an_ausloeser() {
        let state = state();
        let (respondent, mut rx_respondent) = verbinden(&state);
        let (_anderer, mut rx_anderer) = verbinden(&state);

        respondent.verarbeiten(r#"{"type":"kickParticipant","participantId":"p2"}"#);

        match naechstes(&mut rx_respondent) {
            ServerEvent::Error { code, .. } => assert_eq!(code, FehlerKategorie::Forbidden),
            anderes => panic!("Unerwartetes Event: {anderes:?}"),
        }
        assert!(rx_anderer.try_recv().is_err());
        assert!(!state.engine.ist_ausgeschlossen(&ParticipantId::neu("p2")));
    }

    #[test]
    fn chat_zaehlt_nur_zugestellte_nachrichten() {
        let state = state();
        let (dispatcher, _rx) = verbinden(&state);

        dispatcher.verarbeiten(
            r#"{"type":"chatMessage","message":"Hallo","senderId":"p1","senderName":"Anna","senderRole":"respondent"}"#,
        );
        dispatcher.verarbeiten(
            r#"{"type":"chatMessage","message":"   ","senderId":"p1","senderName":"Anna","senderRole":"respondent"}"#,
        );

        assert_eq!(state.metriken.chat_messages_total.get(), 1);
        assert_eq!(state.engine.chat_nachrichten().len(), 1);
    }

    #[test]
    fn ausgeschlossener_kann_sich_nicht_als_presenter_ausgeben() {
        let state = state();
        let (presenter, _rx_presenter) = verbinden(&state);
        presenter.verarbeiten(
            r#"{"type":"joinAsPresenter","presenterId":"lehrer","presenterName":"Frau Meier"}"#,
        );
        presenter.verarbeiten(r#"{"type":"kickParticipant","participantId":"p1"}"#);

        let (rausgeworfen, _rx) = verbinden(&state);
        rausgeworfen.verarbeiten(
            r#"{"type":"chatMessage","message":"Hallo","senderId":"p1","senderName":"Anna","senderRole":"presenter"}"#,
        );
        assert!(state.engine.chat_nachrichten().is_empty());

        presenter.verarbeiten(
            r#"{"type":"chatMessage","message":"Ruhe bitte","senderId":"lehrer","senderName":"Frau Meier","senderRole":"presenter"}"#,
        );
        let nachrichten = state.engine.chat_nachrichten();
        assert_eq!(nachrichten.len(), 1);
        assert_eq!(nachrichten[0].sender_role, Rolle::Presenter);
    }
}
