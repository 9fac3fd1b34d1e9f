use crate::{
    api::{employee, error::ApiError, health, leave},
    auth::handlers,
};
use actix_cors::Cors;
use actix_web::{http::header, web};
use tracing::error;

/// Any origin may call the API with JSON bodies.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_header(header::CONTENT_TYPE)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Body and path extraction failures use the same JSON error shape as handlers.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        error!(error = %err, path = %req.path(), "Rejected request body");
        ApiError::Validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        error!(error = %err, path = %req.path(), "Rejected path parameter");
        ApiError::Validation(err.to_string()).into()
    }));

    cfg.route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health));

    cfg.service(
        web::resource("/employees")
            .route(web::post().to(employee::create_employee))
            .route(web::get().to(employee::list_employees)),
    )
    .service(
        web::resource("/employees/{id}")
            .route(web::put().to(employee::update_employee))
            .route(web::delete().to(employee::delete_employee)),
    );

    cfg.service(
        web::resource("/leaves")
            .route(web::post().to(leave::create_leave))
            .route(web::get().to(leave::list_leaves)),
    )
    .service(web::resource("/leaves/{id}").route(web::put().to(leave::update_leave_status)));

    cfg.service(web::resource("/register").route(web::post().to(handlers::register)))
        .service(web::resource("/login").route(web::post().to(handlers::login)));
}
