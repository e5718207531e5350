mod config;
mod inference;
mod render;
mod routes;
mod storage;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::ServerConfig;
use inference::model::Model;
use routes::{AppState, configure_routes};
use std::env;
use storage::upload_store::UploadStore;

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, e);
    std::io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServerConfig::load().map_err(|e| startup_error("Invalid configuration", e))?;
    log::info!("Configuration: {:?}", config);

    let store = UploadStore::new(&config.upload_dir)
        .map_err(|e| startup_error("Upload directory unavailable", e))?;
    log::info!(
        "Serving uploads from {} at {}",
        store.dir().display(),
        store.url_prefix()
    );

    log::info!("Loading model from {}", config.model_path.display());
    let model =
        Model::load(&config.model_path).map_err(|e| startup_error("Model loading failed", e))?;

    let state = web::Data::new(AppState { store, model });

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| configure_routes(cfg, &state.store))
    })
    .bind(&bind_address)?
    .run()
    .await
}
