use crate::storage::Storage;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::error;

/// Liveness banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain",
         example = json!("HRMS API is running"))
    ),
    tag = "Health"
)]
pub async fn index() -> impl Responder {
    "HRMS API is running"
}

/// Storage connectivity check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Storage reachable", body = Object, example = json!({
            "status": "ok",
            "storage": "mysql"
        })),
        (status = 503, description = "Storage unreachable", body = Object, example = json!({
            "status": "unavailable",
            "storage": "mysql"
        }))
    ),
    tag = "Health"
)]
pub async fn health(storage: web::Data<dyn Storage>) -> HttpResponse {
    let backend = storage.backend_name();
    match storage.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok", "storage": backend })),
        Err(e) => {
            error!(error = %e, backend, "Storage health check failed");
            HttpResponse::ServiceUnavailable()
                .json(json!({ "status": "unavailable", "storage": backend }))
        }
    }
}
