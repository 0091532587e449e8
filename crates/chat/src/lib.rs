//! hoersaal-chat – Sitzungs-Chat
//!
//! Dieses Crate implementiert:
//! - ChatLog: begrenzter, nur anhaengender Nachrichtenpuffer
//! - ChatNachricht: Domain-Typ einer Nachricht
//!
//! # Beispiel
//!
//! ```
//! use hoersaal_chat::ChatLog;
//! use hoersaal_core::{ParticipantId, Rolle};
//!
//! let mut log = ChatLog::neu(100);
//! log.nachricht_posten("Hallo", ParticipantId::neu("p1"), "Anna", Rolle::Respondent)
//!     .unwrap();
//! assert_eq!(log.len(), 1);
//! ```

pub mod chat_log;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use chat_log::{ChatLog, MAX_NACHRICHTEN_LAENGE, STANDARD_KAPAZITAET};
pub use error::{ChatError, ChatResult};
pub use types::ChatNachricht;
