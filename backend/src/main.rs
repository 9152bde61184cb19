use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use std::sync::Arc;
use surat_backend::catalog::TemplateCatalog;
use surat_backend::config::Settings;
use surat_backend::render::Rasterizer;
use surat_backend::services;
use surat_backend::session_controller::state::{
    start_session_sweeper, start_session_updater, SessionsState,
};
use surat_backend::submission::{HttpSubmissionBoundary, SubmissionEncoder};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::load()?;
    let catalog = web::Data::new(TemplateCatalog::builtin().map_err(|e| {
        error!("Template catalog rejected: {}", e);
        e
    })?);

    let rasterizer = web::Data::new(Rasterizer::from_settings(&settings));
    if let Err(e) = rasterizer.prepare() {
        // Editing still works; rendering retries the fonts and answers 503 until they load.
        warn!("Rasterizer unavailable: {}", e);
    }

    // Initialize session state
    let (sessions, rx) = SessionsState::new();

    // Start session updater task
    let updater_state = sessions.clone();
    tokio::spawn(async move {
        start_session_updater(updater_state, rx).await;
    });
    tokio::spawn(start_session_sweeper(sessions.clone(), settings.session_idle()));

    let boundary = Arc::new(HttpSubmissionBoundary::new(settings.submit_url.clone()));
    let encoder = web::Data::new(SubmissionEncoder::new(boundary));

    let (host, port) = settings.bind_address();
    info!("Server running at http://{}:{}", host, port);
    info!("Submitting letters to {}", settings.submit_url);

    let json_limit = settings.json_limit_bytes;
    let settings = web::Data::new(settings);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(catalog.clone())
            .app_data(rasterizer.clone())
            .app_data(encoder.clone())
            .app_data(settings.clone())
            .app_data(web::Data::new(sessions.clone()))
            .service(services::templates::configure_routes())
            .service(services::sessions::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
