//! Konfiguration der Sitzungs-Engine

use std::time::Duration;

/// Konfiguration fuer die Sitzungs-Engine
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Untergrenze der Umfragedauer in Sekunden
    pub min_dauer_sek: u32,
    /// Obergrenze der Umfragedauer in Sekunden
    pub max_dauer_sek: u32,
    /// Dauer wenn beim Erstellen keine angegeben wird
    pub standard_dauer_sek: u32,
    /// Maximale Anzahl Nachrichten im Chat
    pub chat_kapazitaet: usize,
    /// Periode des Countdowns
    pub tick: Duration,
    /// Groesse der Send-Queue pro Verbindung
    pub sende_queue_groesse: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_dauer_sek: 10,
            max_dauer_sek: 300,
            standard_dauer_sek: 60,
            chat_kapazitaet: 100,
            tick: Duration::from_secs(1),
            sende_queue_groesse: 64,
        }
    }
}

impl SessionConfig {
    /// Klemmt eine angefragte Dauer in die konfigurierten Grenzen
    pub fn dauer_klemmen(&self, angefragt: Option<i64>) -> u32 {
        let min = self.min_dauer_sek.min(self.max_dauer_sek);
        let angefragt = angefragt.unwrap_or(i64::from(self.standard_dauer_sek));
        angefragt.clamp(i64::from(min), i64::from(self.max_dauer_sek)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.min_dauer_sek, 10);
        assert_eq!(cfg.max_dauer_sek, 300);
        assert_eq!(cfg.chat_kapazitaet, 100);
        assert_eq!(cfg.tick, Duration::from_secs(1));
    }

    #[test]
    fn dauer_wird_geklemmt() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.dauer_klemmen(Some(5)), 10);
        assert_eq!(cfg.dauer_klemmen(Some(1000)), 300);
        assert_eq!(cfg.dauer_klemmen(Some(-3)), 10);
        assert_eq!(cfg.dauer_klemmen(Some(45)), 45);
        assert_eq!(cfg.dauer_klemmen(None), 60);
    }
}
