//! REST-Handler fuer den Health-Check

use axum::response::Json;
use chrono::Utc;
use hoersaal_protocol::rest::HealthResponse;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
