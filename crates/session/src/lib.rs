//! hoersaal-session – Die Sitzungs-Engine
//!
//! Dieser Crate haelt den gesamten Zustand einer Live-Sitzung und ist
//! unabhaengig vom Transport. REST- und WebSocket-Bindungen sitzen im
//! Gateway und rufen nur die API der `SessionEngine` auf.
//!
//! ## Architektur
//!
//! ```text
//! SessionEngine (ein Mutex ueber den gesamten Zustand)
//!     |
//!     +-- PollStore           (aktuelle Umfrage, alle Umfragen, History)
//!     |     +-- Poll -> Tally (Stimmen pro Option)
//!     +-- ParticipantRegistry (Roster, EjectedSet, Verbindungs-Bindungen)
//!     +-- ChatLog             (begrenzt, wird beim Start geleert)
//!     +-- CountdownTimer      (ein Task pro aktiver Umfrage)
//!     |
//!     v
//! EventBroadcaster – Events an alle oder an eine Verbindung
//! ```

pub mod broadcast;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod poll;
pub mod registry;
pub mod store;
pub mod tally;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use config::SessionConfig;
pub use countdown::{CountdownTimer, Fortsetzung};
pub use engine::{SessionEngine, GRUND_GETRENNT};
pub use poll::{NeueUmfrage, Poll, Response};
pub use registry::{Bindung, EjectedSet, Participant, ParticipantRegistry};
pub use store::PollStore;
pub use tally::Tally;
