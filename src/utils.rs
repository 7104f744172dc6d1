// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Why the gateway could not use the upstream's answer.
#[derive(Debug)]
pub enum UpstreamError {
    Request(reqwest::Error),
    Status(u16),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "Upstream request failed: {}", e),
            Self::Status(code) => write!(f, "Upstream answered with status {}", code),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

#[derive(Debug)]
pub enum WidgetError {
    ContainerNotFound(String),
    NotInitialized,
    InvalidEndpoint(String),
    InvalidPageUrl(String),
    Forbidden(String),
    HttpStatus(u16),
    Request(reqwest::Error),
    Decode(serde_json::Error),
    Render(askama::Error),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerNotFound(id) => write!(f, "Minecraft server status element '{}' not found", id),
            Self::NotInitialized => write!(f, "Status widget has not been initialized"),
            Self::InvalidEndpoint(e) => write!(f, "Invalid endpoint URL: {}", e),
            Self::InvalidPageUrl(e) => write!(f, "Invalid page URL: {}", e),
            Self::Forbidden(peer) => write!(f, "Widget settings can't be changed from {}", peer),
            Self::HttpStatus(code) => write!(f, "HTTP error! Status: {}", code),
            Self::Request(e) => write!(f, "{}", e),
            Self::Decode(e) => write!(f, "error decoding response body: {}", e),
            Self::Render(e) => write!(f, "Failed to render server status: {}", e),
        }
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}

impl From<askama::Error> for WidgetError {
    fn from(e: askama::Error) -> Self {
        Self::Render(e)
    }
}

impl ResponseError for WidgetError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::ContainerNotFound(_) | Self::NotInitialized => {
                HttpResponse::ServiceUnavailable().body(self.to_string())
            }
            Self::InvalidEndpoint(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            Self::Forbidden(_) => {
                HttpResponse::Forbidden().body(self.to_string())
            }
            _ => HttpResponse::BadGateway().body(self.to_string())
        }
    }
}

/// Client shared by the gateway and the widget. The timeout covers the whole
/// exchange so a stalled upstream can't hang a request.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// The widget is shared by every visitor, so changing it is reserved for
/// connections from this host.
pub fn require_loopback(req: &HttpRequest) -> Result<(), WidgetError> {
    let peer = match req.peer_addr() {
        Some(addr) => addr.ip(),
        None => return Err(WidgetError::Forbidden("an unknown peer".to_string())),
    };

    if peer.is_loopback() {
        Ok(())
    } else {
        Err(WidgetError::Forbidden(peer.to_string()))
    }
}

/// Only absolute http(s) URLs may be used as image sources.
pub fn is_web_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
