//! hoersaal-protocol – Protokoll-Definitionen
//!
//! Dieses Crate definiert alle Befehle, Events und View-Strukturen
//! die zwischen Clients und Server ausgetauscht werden.

pub mod control;
pub mod rest;
pub mod views;

pub use control::{ClientCommand, ServerEvent, STANDARD_KICK_GRUND};
pub use views::{
    ChatMessageInfo, HistoryEntry, OptionResult, ParticipantInfo, PollStatus, PollView,
    Respondent, ResponseInfo, ResultSummary, TallyEntry,
};
