// src/handlers/widget.rs
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use crate::utils::{require_loopback, WidgetError};
use crate::widget::{render, StatusWidget};

/// The hosting page, with the status container's current contents inlined.
pub async fn page(widget: web::Data<StatusWidget>) -> Result<HttpResponse, WidgetError> {
    let contents = widget.contents().unwrap_or_default();
    let refresh_secs = widget
        .is_running()
        .then(|| widget.refresh_interval().as_secs().max(1));
    let html = render::status_page(widget.container_id(), refresh_secs, &contents)?;

    Ok(html_response(html))
}

pub async fn fragment(widget: web::Data<StatusWidget>) -> Result<HttpResponse, WidgetError> {
    let html = widget.contents().ok_or(WidgetError::NotInitialized)?;
    Ok(html_response(html))
}

pub async fn refresh(widget: web::Data<StatusWidget>) -> Result<HttpResponse, WidgetError> {
    widget.refresh().await?;
    fragment(widget).await
}

#[derive(Deserialize)]
pub struct EndpointUpdate {
    url: String,
}

pub async fn set_endpoint(
    req: HttpRequest,
    widget: web::Data<StatusWidget>,
    update: web::Json<EndpointUpdate>,
) -> Result<HttpResponse, WidgetError> {
    if let Err(e) = require_loopback(&req) {
        log::warn!("Rejected endpoint change to {}: {}", update.url, e);
        return Err(e);
    }
    if update.url.trim().is_empty() {
        return Err(WidgetError::InvalidEndpoint("empty URL".to_string()));
    }

    widget.set_endpoint(&update.url).await?;
    fragment(widget).await
}

fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
