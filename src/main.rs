use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod routes;
mod storage;
mod telemetry;
mod utils;

#[cfg(test)]
mod test_support;

use auth::jwt::TokenIssuer;
use config::Config;
use storage::Storage;

use crate::docs::ApiDoc;
use tracing::info;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = telemetry::init(&config.log_dir);

    info!("Server starting...");

    let storage = db::init_storage(&config).await?;
    let storage_data: Data<dyn Storage> = Data::from(storage.clone());
    let issuer_data = Data::new(TokenIssuer::new(&config.secret_key, config.token_ttl_secs));

    info!(
        host = %config.host,
        port = config.port,
        storage = storage.backend_name(),
        "Listening"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(routes::cors())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(storage_data.clone())
            .app_data(issuer_data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    storage.close().await;
    info!("Server stopped");

    Ok(())
}
