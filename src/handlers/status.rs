// src/handlers/status.rs
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use log::{debug, warn};
use crate::config::Config;
use crate::models::status::OfflineStatus;
use crate::utils::UpstreamError;

/// Tells callers whether the body came from the game server or was synthesized.
pub const STATUS_SOURCE_HEADER: &str = "X-Status-Source";

/// Proxies the game server's status API. Always answers 200: when the upstream
/// can't be used, an offline payload takes its place.
pub async fn get_status(
    client: web::Data<reqwest::Client>,
    config: web::Data<Config>,
) -> HttpResponse {
    match fetch_upstream(&client, &config.upstream_url).await {
        Ok(body) => {
            debug!("Forwarding {} bytes of status from {}", body.len(), config.upstream_url);
            status_response("upstream").body(body)
        }
        Err(e) => {
            warn!("{} ({}), serving offline status", e, config.upstream_url);
            status_response("fallback").json(OfflineStatus::new(
                &config.fallback_name,
                &config.fallback_ip,
                &config.fallback_version,
            ))
        }
    }
}

/// CORS preflight for the status route.
pub async fn status_preflight(req: HttpRequest) -> HttpResponse {
    let requested = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let methods = requested("Access-Control-Request-Method").unwrap_or_else(|| "GET".to_string());
    let headers = requested("Access-Control-Request-Headers").unwrap_or_else(|| "Content-Type".to_string());

    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", methods))
        .insert_header(("Access-Control-Allow-Headers", headers))
        .body("OK")
}

async fn fetch_upstream(client: &reqwest::Client, url: &str) -> Result<web::Bytes, UpstreamError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(UpstreamError::Status(response.status().as_u16()));
    }

    Ok(response.bytes().await?)
}

fn status_response(source: &'static str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder
        .content_type("application/json")
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "GET"))
        .insert_header((STATUS_SOURCE_HEADER, source));
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderMap;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::time::Duration;
    use crate::handlers::status_resource;
    use crate::test_support::{spawn_upstream, test_client, unreachable_url};

    const FALLBACK_BODY: &str = r#"{"online":false,"name":"Survival","ip":"mc.example.net","port":25565,"version":"Paper 1.20+","maxPlayers":20,"onlinePlayers":0,"players":[]}"#;

    fn gateway_config(upstream_url: String) -> Config {
        Config {
            upstream_url,
            upstream_timeout_secs: 1,
            fallback_name: "Survival".to_string(),
            fallback_ip: "mc.example.net".to_string(),
            fallback_version: "Paper 1.20+".to_string(),
            ..Config::default()
        }
    }

    async fn call_gateway(config: Config) -> (StatusCode, HeaderMap, web::Bytes) {
        let path = config.gateway_path.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .app_data(web::Data::new(config))
                .service(status_resource(&path)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri(&path).to_request()).await;
        let status = resp.status();
        let headers = resp.headers().clone();
        (status, headers, test::read_body(resp).await)
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
        headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    #[actix_web::test]
    async fn forwards_upstream_body_byte_for_byte() {
        let body = "{\"online\": true,\n  \"name\":\"Test\", \"players\": [] }";
        let upstream = spawn_upstream(StatusCode::OK, body, Duration::ZERO);

        let (status, headers, bytes) = call_gateway(gateway_config(upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(body.as_bytes()));
        assert_eq!(header(&headers, "content-type"), "application/json");
        assert_eq!(header(&headers, "access-control-allow-origin"), "*");
        assert_eq!(header(&headers, STATUS_SOURCE_HEADER), "upstream");
    }

    #[actix_web::test]
    async fn forwards_invalid_json_untouched() {
        let upstream = spawn_upstream(StatusCode::OK, "not json {", Duration::ZERO);

        let (status, headers, bytes) = call_gateway(gateway_config(upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(b"not json {"));
        assert_eq!(header(&headers, "content-type"), "application/json");
    }

    #[actix_web::test]
    async fn unreachable_upstream_yields_fallback() {
        let (status, headers, bytes) = call_gateway(gateway_config(unreachable_url())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(FALLBACK_BODY.as_bytes()));
        assert_eq!(header(&headers, "content-type"), "application/json");
        assert_eq!(header(&headers, "access-control-allow-origin"), "*");
        assert_eq!(header(&headers, STATUS_SOURCE_HEADER), "fallback");
    }

    #[actix_web::test]
    async fn upstream_error_status_yields_fallback() {
        let upstream = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, r#"{"online":true}"#, Duration::ZERO);

        let (status, headers, bytes) = call_gateway(gateway_config(upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(FALLBACK_BODY.as_bytes()));
        assert_eq!(header(&headers, STATUS_SOURCE_HEADER), "fallback");
    }

    #[actix_web::test]
    async fn slow_upstream_times_out_to_fallback() {
        let upstream = spawn_upstream(StatusCode::OK, r#"{"online":true}"#, Duration::from_secs(3));

        let (status, _headers, bytes) = call_gateway(gateway_config(upstream)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(FALLBACK_BODY.as_bytes()));
    }

    #[actix_web::test]
    async fn malformed_upstream_url_yields_fallback() {
        let (status, _headers, bytes) = call_gateway(gateway_config("not a url".to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, web::Bytes::from_static(FALLBACK_BODY.as_bytes()));
    }

    #[actix_web::test]
    async fn preflight_echoes_requested_method_and_headers() {
        let config = Config::default();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .app_data(web::Data::new(config.clone()))
                .service(status_resource(&config.gateway_path)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/mc-proxy")
            .insert_header(("Access-Control-Request-Method", "GET"))
            .insert_header(("Access-Control-Request-Headers", "Authorization"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(resp.headers(), "access-control-allow-origin"), "*");
        assert_eq!(header(resp.headers(), "access-control-allow-methods"), "GET");
        assert_eq!(header(resp.headers(), "access-control-allow-headers"), "Authorization");
        assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"OK"));
    }

    #[actix_web::test]
    async fn preflight_defaults_without_request_headers() {
        let config = Config::default();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .app_data(web::Data::new(config.clone()))
                .service(status_resource(&config.gateway_path)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/mc-proxy")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(header(resp.headers(), "access-control-allow-methods"), "GET");
        assert_eq!(header(resp.headers(), "access-control-allow-headers"), "Content-Type");
    }
}
