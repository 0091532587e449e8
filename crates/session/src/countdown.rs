//! Countdown – Periodischer Task einer aktiven Umfrage
//!
//! Der Timer ruft pro Periode einen Callback auf. Liefert dieser
//! `Fortsetzung::Stopp`, endet der Task. Er kann jederzeit ueber
//! `abbrechen()` gestoppt werden; Drop bricht ebenfalls ab.

use std::time::Duration;

use hoersaal_core::PollId;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Rueckgabe des Tick-Callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fortsetzung {
    Weiter,
    Stopp,
}

/// Handle auf den laufenden Countdown-Task einer Umfrage
#[derive(Debug)]
pub struct CountdownTimer {
    poll_id: PollId,
    abbruch: CancellationToken,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// Startet den Countdown-Task
    ///
    /// Der erste Tick erfolgt nach einer vollen Periode. Muss innerhalb
    /// einer Tokio-Runtime aufgerufen werden.
    pub fn starten<F>(poll_id: PollId, periode: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fortsetzung + Send + 'static,
    {
        let abbruch = CancellationToken::new();
        let token = abbruch.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + periode, periode);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(poll_id = %poll_id, "Countdown abgebrochen");
                        break;
                    }
                    _ = ticker.tick() => {
                        if tick() == Fortsetzung::Stopp {
                            tracing::debug!(poll_id = %poll_id, "Countdown beendet");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            poll_id,
            abbruch,
            handle,
        }
    }

    pub fn poll_id(&self) -> PollId {
        self.poll_id
    }

    /// Stoppt den Task vor dem naechsten Tick
    pub fn abbrechen(&self) {
        self.abbruch.cancel();
    }

    pub fn ist_beendet(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.abbruch.cancel();
    }
}
