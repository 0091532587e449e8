//! hoersaal-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Hoersaal-Crates gemeinsam genutzt werden.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{FehlerKategorie, HoersaalError, Result};
pub use types::{ConnectionId, MessageId, ParticipantId, PollId, Rolle};
