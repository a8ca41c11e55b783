mod config;
mod endpoints;
mod error;
mod models;
mod services;

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{self, TrailingSlash};
use actix_web::web::Data;
use actix_web::{get, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::services::product_service::MySqlProductService;
use crate::services::SharedProductStore;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Bienvenido a la API de productos." }))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let service = MySqlProductService::connect(&config.database_url())
        .await
        .map_err(|err| {
            log::error!("Failed to connect to the database: {}", err);
            io::Error::new(io::ErrorKind::ConnectionRefused, err.to_string())
        })?;
    log::info!("Database connection established");

    let store: SharedProductStore = Arc::new(Mutex::new(service));
    let app_store = store.clone();
    let port = config.port;
    let cors_origin = config.cors_origin.clone();

    log::info!("Listening on port {}", port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allow_any_header(),
            )
            .wrap(middleware::NormalizePath::new(TrailingSlash::Always))
            .wrap(middleware::Logger::default())
            .app_data(endpoints::products::json_config())
            .app_data(Data::new(app_store.clone()))
            .service(index)
            .configure(endpoints::products::configure)
    })
    .bind(("0.0.0.0", port))?
    .run();

    let result = server.await;

    if let Err(err) = store.lock().await.close().await {
        log::error!("Failed to close the database connection: {}", err);
    }

    result
}
