use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    // Listener
    pub bind_address: String,
    pub port: u16,

    // Gateway
    pub gateway_path: String,
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,

    // Offline payload shown when the upstream can't be reached
    pub fallback_name: String,
    pub fallback_ip: String,
    pub fallback_version: String,

    // Widget
    pub widget_endpoint: String,
    pub widget_page_url: String,
    pub widget_container_id: String,
    pub refresh_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source, falling back to defaults
    /// for keys that are missing or fail to parse.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| parse_trimmed::<u64>(&v));
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = lookup("PORT")
            .and_then(|v| parse_trimmed::<u16>(&v))
            .unwrap_or(8000);

        Self {
            bind_address: text("BIND_ADDRESS", "0.0.0.0"),
            port,

            gateway_path: text("GATEWAY_PATH", "/mc-proxy"),
            upstream_url: text("UPSTREAM_URL", "http://127.0.0.1:8080/api/status"),
            upstream_timeout_secs: parsed("UPSTREAM_TIMEOUT_SECS").unwrap_or(5),

            fallback_name: text("FALLBACK_NAME", "Minecraft Server"),
            fallback_ip: text("FALLBACK_IP", "127.0.0.1"),
            fallback_version: text("FALLBACK_VERSION", "Unknown"),

            widget_endpoint: text("WIDGET_ENDPOINT", "/mc-proxy"),
            widget_page_url: lookup("WIDGET_PAGE_URL")
                .unwrap_or_else(|| format!("http://127.0.0.1:{}/", port)),
            widget_container_id: text("WIDGET_CONTAINER_ID", "minecraft-server-status"),
            // A zero period would make the ticker panic
            refresh_interval_ms: parsed("REFRESH_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(30_000),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn parse_trimmed<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}
