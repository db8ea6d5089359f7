use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;

/// Liveness probe. Sits outside the `/api` scope so it never passes through
/// the auth gate; load balancers hit it unauthenticated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub checked_at: chrono::DateTime<Utc>,
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        checked_at: Utc::now(),
    })
}
