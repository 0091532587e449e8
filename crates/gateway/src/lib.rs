//! hoersaal-gateway – Transport-Bindungen fuer die Sitzungs-Engine
//!
//! Zwei Zugangsarten auf derselben `SessionEngine`:
//! - **REST** (`/api/...`): Axum JSON-API, zustandslos
//! - **WebSocket** (`/ws`): Live-Verbindung mit Befehlen und Events
//!
//! ## Architektur
//!
//! ```text
//! Axum Router (CORS, Trace, Timing)
//!     |
//!     +-- rest::handlers  -> SessionEngine
//!     +-- ws::WsVerbindung (pro Socket ein Task)
//!             |
//!             v
//!         BefehlsDispatcher -> SessionEngine
//! ```

pub mod error;
pub mod rest;
pub mod server;
pub mod state;
pub mod ws;

pub use error::{GatewayError, GatewayResult};
pub use server::{router, Gateway, GatewayKonfig};
pub use state::GatewayState;
