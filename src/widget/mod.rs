// src/widget/mod.rs
pub mod render;

use chrono::Local;
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use crate::config::Config;
use crate::models::status::ServerStatus;
use crate::storage::memory::{Document, Element};
use crate::utils::WidgetError;

/// Polls the gateway and renders what it gets into a container element.
pub struct StatusWidget {
    client: reqwest::Client,
    document: Arc<Document>,
    container_id: String,
    page_url: Url,
    endpoint: RwLock<String>,
    refresh_interval: Duration,
    container: RwLock<Option<Arc<Element>>>,
    // Bumped by every cycle; a cycle only renders if it is still the latest
    generation: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl StatusWidget {
    pub fn new(client: reqwest::Client, document: Arc<Document>, config: &Config) -> Result<Self, WidgetError> {
        let page_url = Url::parse(&config.widget_page_url)
            .map_err(|e| WidgetError::InvalidPageUrl(e.to_string()))?;

        Ok(Self {
            client,
            document,
            container_id: config.widget_container_id.clone(),
            page_url,
            endpoint: RwLock::new(config.widget_endpoint.clone()),
            refresh_interval: config.refresh_interval(),
            container: RwLock::new(None),
            generation: AtomicU64::new(0),
            timer: Mutex::new(None),
        })
    }

    /// Attaches to the container, renders once, then keeps polling.
    pub async fn initialize(self: &Arc<Self>) -> Result<(), WidgetError> {
        let element = match self.document.get_element_by_id(&self.container_id) {
            Some(element) => element,
            None => {
                let e = WidgetError::ContainerNotFound(self.container_id.clone());
                error!("{}", e);
                return Err(e);
            }
        };
        debug!("Rendering server status into #{}", element.id());
        *self.container.write() = Some(element);

        // The first tick is a full period away, so this cycle still renders first
        self.start();
        self.fetch_and_render().await
    }

    pub async fn refresh(&self) -> Result<(), WidgetError> {
        self.fetch_and_render().await
    }

    /// Points the widget at another gateway and renders from it right away.
    /// The polling timer keeps its schedule.
    pub async fn set_endpoint(&self, url: &str) -> Result<(), WidgetError> {
        *self.endpoint.write() = url.to_string();
        info!("Status endpoint set to {}", url);
        self.fetch_and_render().await
    }

    pub fn start(self: &Arc<Self>) {
        let mut timer = self.timer.lock();
        if timer.as_ref().map_or(false, |handle| !handle.is_finished()) {
            return;
        }

        let widget = Arc::downgrade(self);
        let period = self.refresh_interval;
        debug!("Refreshing server status every {:?}", period);

        *timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(widget) = widget.upgrade() else { break };
                if let Err(e) = widget.fetch_and_render().await {
                    warn!("Scheduled status refresh failed: {}", e);
                }
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
            info!("Stopped refreshing server status");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.read().clone()
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Current contents of the container, if the widget is attached.
    pub fn contents(&self) -> Option<String> {
        self.container.read().as_ref().map(|element| element.inner_html())
    }

    async fn fetch_and_render(&self) -> Result<(), WidgetError> {
        let container = self.container.read().clone().ok_or(WidgetError::NotInitialized)?;
        let endpoint = self.endpoint();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.is_mixed_content(&endpoint) {
            warn!("Refusing to fetch {} from a page served over https", endpoint);
            container.set_inner_html(render::MIXED_CONTENT_NOTICE);
            return Ok(());
        }

        container.set_inner_html(render::FETCHING);

        let html = match self.fetch_status(&endpoint).await {
            Ok(status) => {
                if status.online == Some(false) {
                    debug!("Gateway reports the server as offline");
                }
                render::server_view(&status, Local::now().time())?
            }
            Err(e) => {
                error!("Error fetching server data: {}", e);
                render::error_block(&e.to_string())?
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding status from superseded refresh #{}", generation);
            return Ok(());
        }

        container.set_inner_html(html);
        Ok(())
    }

    async fn fetch_status(&self, endpoint: &str) -> Result<ServerStatus, WidgetError> {
        // Relative endpoints resolve against the page, like a browser would
        let url = self
            .page_url
            .join(endpoint)
            .map_err(|e| WidgetError::InvalidEndpoint(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(WidgetError::HttpStatus(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(ServerStatus::from_json(&body)?)
    }

    fn is_mixed_content(&self, endpoint: &str) -> bool {
        self.page_url.scheme() == "https" && endpoint.starts_with("http:")
    }
}
