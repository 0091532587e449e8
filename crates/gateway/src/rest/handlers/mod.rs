//! REST-Handler Module

pub mod chat;
pub mod health;
pub mod participants;
pub mod poll;

use hoersaal_core::{HoersaalError, PollId};

/// Parst eine Umfrage-ID aus dem Pfad; unlesbare IDs gelten als unbekannt
pub(crate) fn poll_id_parsen(roh: &str) -> Result<PollId, HoersaalError> {
    roh.parse()
        .map_err(|_| HoersaalError::nicht_gefunden(format!("Umfrage '{roh}'")))
}
