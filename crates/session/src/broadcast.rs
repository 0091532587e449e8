//! Event-Broadcaster – Verteilt Events an alle verbundenen Clients
//!
//! Jede Live-Verbindung besitzt eine eigene, begrenzte Send-Queue. Der
//! Broadcaster haelt die Sender-Seiten und stellt zwei Zustellarten bereit:
//! - An alle Verbindungen: `an_alle_senden`
//! - Gezielt an eine Verbindung: `an_verbindung_senden`
//!
//! Gesendet wird nicht-blockierend (`try_send`). Die Reihenfolge pro
//! Verbindung entspricht der Reihenfolge der Aufrufe. Laeuft die Queue einer
//! Verbindung voll, wird die Verbindung entfernt statt Events zu verwerfen:
//! ihr Receiver liefert die eingereihten Events und danach `None`, der
//! Client muss sich neu verbinden und erhaelt dann den vollen Zustand.

use dashmap::DashMap;
use hoersaal_core::ConnectionId;
use hoersaal_protocol::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standard-Groesse der Send-Queue pro Verbindung
pub const STANDARD_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub connection_id: ConnectionId,
    pub tx: mpsc::Sender<ServerEvent>,
}

/// Ergebnis eines Sendeversuchs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellung {
    Eingereiht,
    /// Queue voll, der Client liest nicht schnell genug
    QueueVoll,
    /// Receiver wurde bereits fallen gelassen
    Geschlossen,
}

impl ClientSender {
    /// Sendet ein Event nicht-blockierend
    pub fn senden(&self, event: ServerEvent) -> Zustellung {
        match self.tx.try_send(event) {
            Ok(()) => Zustellung::Eingereiht,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    event = event.name(),
                    "Send-Queue voll, Verbindung wird getrennt"
                );
                Zustellung::QueueVoll
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    "Send-Queue geschlossen (Client getrennt)"
                );
                Zustellung::Geschlossen
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Broadcaster fuer alle Live-Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    clients: DashMap<ConnectionId, ClientSender>,
    queue_groesse: usize,
}

impl EventBroadcaster {
    /// Erstellt einen Broadcaster mit der angegebenen Queue-Groesse pro Verbindung
    pub fn neu(queue_groesse: usize) -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                clients: DashMap::new(),
                queue_groesse: queue_groesse.max(1),
            }),
        }
    }

    /// Registriert eine Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die Verbindung erhaelt ab sofort alle Broadcasts.
    pub fn verbindung_registrieren(
        &self,
        connection_id: ConnectionId,
    ) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.inner.queue_groesse);
        let sender = ClientSender { connection_id, tx };
        self.inner.clients.insert(connection_id, sender);
        tracing::debug!(connection_id = %connection_id, "Verbindung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung
    ///
    /// Bereits eingereihte Events bleiben im Receiver und koennen noch
    /// ausgelesen werden, danach liefert er `None`.
    pub fn verbindung_entfernen(&self, connection_id: &ConnectionId) -> bool {
        let entfernt = self.inner.clients.remove(connection_id).is_some();
        if entfernt {
            tracing::debug!(connection_id = %connection_id, "Verbindung aus Broadcaster entfernt");
        }
        entfernt
    }

    /// Sendet ein Event an genau eine Verbindung
    ///
    /// Ist die Queue voll, wird die Verbindung entfernt.
    pub fn an_verbindung_senden(&self, connection_id: &ConnectionId, event: ServerEvent) -> bool {
        let zustellung = match self.inner.clients.get(connection_id) {
            Some(sender) => sender.senden(event),
            None => {
                tracing::debug!(connection_id = %connection_id, "Senden an unbekannte Verbindung");
                return false;
            }
        };
        if zustellung == Zustellung::QueueVoll {
            self.verbindung_entfernen(connection_id);
        }
        zustellung == Zustellung::Eingereiht
    }

    /// Sendet ein Event an alle registrierten Verbindungen
    ///
    /// Verbindungen mit voller Queue werden danach entfernt. Gibt die Anzahl
    /// der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, event: ServerEvent) -> usize {
        let mut gesendet = 0;
        let mut zu_langsam = Vec::new();
        self.inner.clients.iter().for_each(|entry| {
            match entry.value().senden(event.clone()) {
                Zustellung::Eingereiht => gesendet += 1,
                Zustellung::QueueVoll => zu_langsam.push(*entry.key()),
                Zustellung::Geschlossen => {}
            }
        });
        // Entfernen erst nach der Iteration, sonst blockiert die DashMap-Shard
        for connection_id in &zu_langsam {
            self.verbindung_entfernen(connection_id);
        }
        tracing::trace!(event = event.name(), empfaenger = gesendet, "Event verteilt");
        gesendet
    }

    pub fn verbindung_anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    pub fn ist_registriert(&self, connection_id: &ConnectionId) -> bool {
        self.inner.clients.contains_key(connection_id)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu(STANDARD_QUEUE_GROESSE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hoersaal_core::PollId;

    fn test_event(sekunden: i64) -> ServerEvent {
        ServerEvent::TimerUpdate {
            poll_id: PollId::new(),
            time_left: sekunden,
        }
    }

    #[tokio::test]
    async fn verbindung_registrieren_und_senden() {
        let broadcaster = EventBroadcaster::default();
        let cid = ConnectionId::new();

        let mut rx = broadcaster.verbindung_registrieren(cid);
        assert!(broadcaster.ist_registriert(&cid));

        assert!(broadcaster.an_verbindung_senden(&cid, test_event(5)));

        let empfangen = rx.try_recv().expect("Event muss vorhanden sein");
        assert!(matches!(empfangen, ServerEvent::TimerUpdate { time_left: 5, .. }));
    }

    #[tokio::test]
    async fn gezieltes_senden_erreicht_nur_eine_verbindung() {
        let broadcaster = EventBroadcaster::default();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let mut rx_a = broadcaster.verbindung_registrieren(a);
        let mut rx_b = broadcaster.verbindung_registrieren(b);

        broadcaster.an_verbindung_senden(&a, test_event(1));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err(), "b darf nichts empfangen");
    }

    #[tokio::test]
    async fn an_alle_senden() {
        let broadcaster = EventBroadcaster::default();

        let cids: Vec<ConnectionId> = (0..5).map(|_| ConnectionId::new()).collect();
        let mut receivers: Vec<_> = cids
            .iter()
            .map(|cid| broadcaster.verbindung_registrieren(*cid))
            .collect();

        assert_eq!(broadcaster.an_alle_senden(test_event(99)), 5);

        for rx in &mut receivers {
            assert!(rx.try_recv().is_ok());
        }
    }

    #[tokio::test]
    async fn reihenfolge_bleibt_erhalten() {
        let broadcaster = EventBroadcaster::default();
        let cid = ConnectionId::new();
        let mut rx = broadcaster.verbindung_registrieren(cid);

        for s in (0..10).rev() {
            broadcaster.an_alle_senden(test_event(s));
        }
        for erwartet in (0..10).rev() {
            match rx.try_recv().unwrap() {
                ServerEvent::TimerUpdate { time_left, .. } => assert_eq!(time_left, erwartet),
                anderes => panic!("Unerwartetes Event: {anderes:?}"),
            }
        }
    }

    #[tokio::test]
    async fn volle_queue_trennt_verbindung() {
        let broadcaster = EventBroadcaster::neu(2);
        let cid = ConnectionId::new();
        let mut rx = broadcaster.verbindung_registrieren(cid);

        assert!(broadcaster.an_verbindung_senden(&cid, test_event(3)));
        assert!(broadcaster.an_verbindung_senden(&cid, test_event(2)));
        assert!(!broadcaster.an_verbindung_senden(&cid, test_event(1)));
        assert!(!broadcaster.ist_registriert(&cid));

        // Eingereihte Events bleiben lesbar, danach ist die Queue zu
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn langsame_verbindung_bremst_andere_nicht() {
        let broadcaster = EventBroadcaster::neu(2);
        let langsam = ConnectionId::new();
        let schnell = ConnectionId::new();
        let _rx_langsam = broadcaster.verbindung_registrieren(langsam);
        let mut rx_schnell = broadcaster.verbindung_registrieren(schnell);

        for s in 0..5 {
            broadcaster.an_alle_senden(test_event(s));
            assert!(rx_schnell.try_recv().is_ok());
        }

        assert!(!broadcaster.ist_registriert(&langsam));
        assert!(broadcaster.ist_registriert(&schnell));
        assert_eq!(broadcaster.verbindung_anzahl(), 1);
    }

    #[tokio::test]
    async fn entfernen_laesst_eingereihte_events_lesbar() {
        let broadcaster = EventBroadcaster::default();
        let cid = ConnectionId::new();
        let mut rx = broadcaster.verbindung_registrieren(cid);

        broadcaster.an_verbindung_senden(&cid, test_event(7));
        assert!(broadcaster.verbindung_entfernen(&cid));
        assert!(!broadcaster.ist_registriert(&cid));

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
