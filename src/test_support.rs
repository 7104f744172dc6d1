// src/test_support.rs
//! Loopback servers standing in for the game server API and the gateway.
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::config::Config;
use crate::handlers::status_resource;
use crate::utils::build_http_client;

pub fn test_client() -> reqwest::Client {
    build_http_client(Duration::from_secs(1)).expect("build test client")
}

/// Serves `body` with `status` on every path after `delay`; returns a status URL.
pub fn spawn_upstream(status: StatusCode, body: &'static str, delay: Duration) -> String {
    let server = HttpServer::new(move || {
        App::new().default_service(web::to(move || async move {
            tokio::time::sleep(delay).await;
            HttpResponse::build(status)
                .content_type("application/json")
                .body(body)
        }))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}/api/status", addr)
}

/// Like `spawn_upstream`, but counts the requests it receives.
pub fn spawn_counting_upstream(body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let server = HttpServer::new(move || {
        let counter = counter.clone();
        App::new().default_service(web::to(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                HttpResponse::Ok()
                    .content_type("application/json")
                    .body(body)
            }
        }))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{}/api/status", addr), hits)
}

/// Runs the real gateway route with `config`; returns its URL.
pub fn spawn_gateway(config: Config) -> String {
    let path = config.gateway_path.clone();
    let client = web::Data::new(test_client());
    let config = web::Data::new(config);

    let route = path.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .app_data(config.clone())
            .service(status_resource(&route))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind gateway");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}{}", addr, path)
}

/// A URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}/api/status", addr)
}
