//! Fehlertypen fuer Hoersaal
//!
//! Zentraler Fehler-Enum der die Fehlerkategorien der Sitzungs-Engine
//! abdeckt. Transport-Schichten bilden die Kategorie auf ihre eigenen
//! Codes ab (HTTP-Status, Socket-Fehlerevent).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Globaler Result-Alias fuer Hoersaal
pub type Result<T> = std::result::Result<T, HoersaalError>;

/// Alle moeglichen Fehler der Sitzungs-Engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoersaalError {
    /// Fehlerhafte oder fehlende Eingabe, vom Client korrigierbar
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    /// Aktion widerspricht dem aktuellen Zustand
    #[error("Konflikt: {0}")]
    Konflikt(String),

    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),

    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Maschinenlesbare Fehlerkategorie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FehlerKategorie {
    Validation,
    Conflict,
    Forbidden,
    NotFound,
    Internal,
}

impl HoersaalError {
    pub fn ungueltig(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    pub fn konflikt(msg: impl Into<String>) -> Self {
        Self::Konflikt(msg.into())
    }

    pub fn verweigert(msg: impl Into<String>) -> Self {
        Self::ZugriffVerweigert(msg.into())
    }

    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::UngueltigeEingabe(_) => FehlerKategorie::Validation,
            Self::Konflikt(_) => FehlerKategorie::Conflict,
            Self::ZugriffVerweigert(_) => FehlerKategorie::Forbidden,
            Self::NichtGefunden(_) => FehlerKategorie::NotFound,
            Self::Intern(_) => FehlerKategorie::Internal,
        }
    }

    /// Nachricht fuer den Client. Interne Details werden nicht herausgegeben.
    pub fn client_nachricht(&self) -> String {
        match self {
            Self::Intern(_) => "Interner Serverfehler".to_string(),
            Self::UngueltigeEingabe(m)
            | Self::Konflikt(m)
            | Self::ZugriffVerweigert(m)
            | Self::NichtGefunden(m) => m.clone(),
        }
    }
}
