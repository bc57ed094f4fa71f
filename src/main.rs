use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Condition, Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::info;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use attendance_kiosk::api::AppState;
use attendance_kiosk::config::Config;
use attendance_kiosk::controller::AttendanceController;
use attendance_kiosk::docs::ApiDoc;
use attendance_kiosk::persistence::CsvFileStore;
use attendance_kiosk::{logging, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = logging::init(&config);
    info!("Server starting...");

    if let Some(dir) = config.csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    }

    let controller = AttendanceController::open(
        CsvFileStore::new(&config.csv_path),
        config.seed_default_roster,
    );
    info!(
        path = %config.csv_path.display(),
        students = controller.store().len(),
        "CSV file location"
    );

    let state = Data::new(AppState::new(controller));
    let limiter = Arc::new(routes::build_limiter(config.rate_write_per_min)?);
    let api_prefix = config.api_prefix.clone();
    let cors_permissive = config.cors_permissive;

    info!(addr = %config.server_addr, "Server running");

    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(cors_permissive, Cors::permissive()))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, limiter.clone()))
    })
    .bind(&config.server_addr)
    .with_context(|| format!("failed to bind {}", config.server_addr))?
    .run()
    .await
    .context("server stopped with an error")
}
