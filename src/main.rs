// src/main.rs
mod config;
mod handlers;
mod models;
mod storage;
mod utils;
mod widget;

#[cfg(test)]
mod test_support;

use actix_web::{ web, App, HttpServer };
use env_logger::Env;
use std::sync::Arc;
use storage::memory::Document;
use widget::StatusWidget;
use crate::config::Config;
use log::{ info, warn };

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Load configuration
    let config = Config::from_env();
    let bind = config.bind();

    let client = utils::build_http_client(config.upstream_timeout()).map_err(|e| {
        log::error!("Failed to build HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Failed to build HTTP client: {}", e))
    })?;

    // The hosted page only carries the status container
    let document = Arc::new(Document::new());
    document.create_element(&config.widget_container_id);

    let widget = StatusWidget::new(client.clone(), document, &config)
        .map(Arc::new)
        .map_err(|e| {
            log::error!("Failed to set up status widget: {}", e);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?;

    let gateway_path = config.gateway_path.clone();
    let config_data = web::Data::new(config.clone());
    let client_data = web::Data::new(client);
    let widget_data = web::Data::from(widget.clone());

    info!("Starting server on {}", bind);
    info!("Proxying {} at {}", config.upstream_url, gateway_path);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(client_data.clone())
            .app_data(widget_data.clone())
            .route("/health", web::get().to(handlers::index::health))
            .service(handlers::status_resource(&gateway_path))
            .configure(handlers::widget_routes)
    })
        .bind(&bind)?
        .run();

    // Listeners are bound, so the first poll can reach our own gateway
    actix_web::rt::spawn(async move {
        if let Err(e) = widget.initialize().await {
            warn!("Status widget disabled: {}", e);
        }
    });

    server.await
}
