use actix_web::{middleware, web, App, HttpServer};
use std::io;

use docvault::adapters::BlobStoreImpl;
use docvault::app_config::AppConfig;
use docvault::db;
use docvault::documents::DocumentEngine;
use docvault::http::{configure, AppState};
use docvault::users::PasswordAuthenticator;

fn other<E>(err: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::Other, err)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let config = AppConfig::from_env().map_err(other)?;

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .map_err(other)?;
    let blob_store = BlobStoreImpl::new(
        config.storage.root.clone(),
        config.storage.staging_root.clone(),
    )
    .await
    .map_err(other)?;

    let state = web::Data::new(AppState {
        engine: DocumentEngine::new(pool.clone(), blob_store),
        authenticator: PasswordAuthenticator::new(pool),
        request_timeout: config.request_timeout,
    });

    log::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
