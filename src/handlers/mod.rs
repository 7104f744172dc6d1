// src/handlers/mod.rs
pub mod index;
pub mod status;
pub mod widget;

use actix_web::http::Method;
use actix_web::{web, Resource};

/// The gateway route, answering both GET and CORS preflight.
pub fn status_resource(path: &str) -> Resource {
    web::resource(path)
        .route(web::get().to(status::get_status))
        .route(web::method(Method::OPTIONS).to(status::status_preflight))
}

pub fn widget_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(widget::page))
        .route("/widget", web::get().to(widget::fragment))
        .route("/widget/refresh", web::post().to(widget::refresh))
        .route("/widget/endpoint", web::post().to(widget::set_endpoint));
}
