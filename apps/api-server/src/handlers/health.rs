//! Health check endpoint.

use actix_web::HttpResponse;
use mentorhub_shared::dto::HealthResponse;

/// GET /api/health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
