//! WebSocket-Verbindung – Ein Task pro Socket
//!
//! Die Verbindung registriert sich beim Oeffnen im Broadcaster und
//! erhaelt ab dann alle Events. Eingehende Text-Frames gehen an den
//! `BefehlsDispatcher`, ausgehende Events kommen aus der eigenen Queue.
//!
//! ## Ende der Verbindung
//! - Client schliesst den Socket
//! - `kickedOut` wurde zugestellt (oder die Queue wurde entfernt)
//! - Shutdown ueber das Abbruch-Token

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use hoersaal_protocol::ServerEvent;

use crate::state::GatewayState;
use crate::ws::dispatcher::BefehlsDispatcher;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct WsVerbindung {
    state: GatewayState,
}

impl WsVerbindung {
    pub fn neu(state: GatewayState) -> Self {
        Self { state }
    }

    /// Startet die Verbindungs-Schleife
    ///
    /// Laeuft bis der Socket geschlossen, der Client entfernt oder der
    /// Server heruntergefahren wird.
    pub async fn verarbeiten(self, socket: WebSocket) {
        let (connection_id, mut event_rx) = self.state.engine.verbindung_oeffnen();
        self.state.metriken.connected_clients.inc();
        tracing::info!(connection_id = %connection_id, "Neue Live-Verbindung");

        let (mut sender, mut empfaenger) = socket.split();
        let dispatcher = BefehlsDispatcher::neu(self.state.clone(), connection_id);

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = empfaenger.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            tracing::trace!(connection_id = %connection_id, "Befehl empfangen");
                            dispatcher.verarbeiten(&text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(connection_id = %connection_id, "Verbindung vom Client getrennt");
                            break;
                        }
                        // Ping/Pong beantwortet axum selbst, Binaer-Frames werden ignoriert
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(
                                connection_id = %connection_id,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                    }
                }

                // Ausgehendes Event aus dem Broadcaster
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        // Queue wurde entfernt (Kick oder volle Queue), nichts mehr zuzustellen
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    };
                    let rausgeworfen = matches!(event, ServerEvent::KickedOut { .. });

                    match event.to_json() {
                        Ok(json) => {
                            if let Err(e) = sender.send(Message::Text(json)).await {
                                tracing::warn!(
                                    connection_id = %connection_id,
                                    fehler = %e,
                                    "Senden fehlgeschlagen"
                                );
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                connection_id = %connection_id,
                                event = event.name(),
                                fehler = %e,
                                "Event konnte nicht serialisiert werden"
                            );
                        }
                    }

                    if rausgeworfen {
                        tracing::info!(connection_id = %connection_id, "Verbindung nach Kick geschlossen");
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }

                // Shutdown-Signal
                _ = self.state.abbruch.cancelled() => {
                    tracing::info!(connection_id = %connection_id, "Shutdown-Signal – Verbindung wird getrennt");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        // Cleanup beim Verbindungsende
        self.state.engine.verbindung_getrennt(&connection_id);
        self.state.metriken.connected_clients.dec();
        self.state.teilnehmer_metrik_aktualisieren();
        tracing::info!(connection_id = %connection_id, "Verbindungs-Task beendet");
    }
}
