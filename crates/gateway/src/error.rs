//! Fehlertypen fuer das Gateway und ihre HTTP-Abbildung

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hoersaal_core::{FehlerKategorie, HoersaalError};
use serde_json::json;
use thiserror::Error;

/// Alle Fehler die ein Handler zurueckgeben kann
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Sitzung(#[from] HoersaalError),

    #[error("Ungueltiger Request-Body: {0}")]
    UngueltigerBody(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::Sitzung(e) => e.kategorie(),
            Self::UngueltigerBody(_) => FehlerKategorie::Validation,
        }
    }

    /// HTTP-Statuscode fuer REST-Fehler
    pub fn http_status(&self) -> StatusCode {
        match self.kategorie() {
            FehlerKategorie::Validation => StatusCode::BAD_REQUEST,
            FehlerKategorie::Conflict => StatusCode::CONFLICT,
            FehlerKategorie::Forbidden => StatusCode::FORBIDDEN,
            FehlerKategorie::NotFound => StatusCode::NOT_FOUND,
            FehlerKategorie::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text fuer den Client; interne Details werden nicht herausgegeben
    pub fn client_nachricht(&self) -> String {
        match self {
            Self::Sitzung(e) => e.client_nachricht(),
            Self::UngueltigerBody(_) => self.to_string(),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::UngueltigerBody(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(fehler = %self, "Interner Fehler bei REST-Anfrage");
        } else {
            tracing::debug!(status = status.as_u16(), fehler = %self, "REST-Anfrage abgelehnt");
        }

        (
            status,
            Json(json!({
                "error": {
                    "code": self.kategorie(),
                    "message": self.client_nachricht(),
                }
            })),
        )
            .into_response()
    }
}
