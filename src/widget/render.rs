// src/widget/render.rs
use askama::Template;
use chrono::NaiveTime;
use crate::models::status::{Player, Plugin, ServerStatus, DEFAULT_PORT};
use crate::utils::is_web_url;

pub const FETCHING: &str = "<p>Fetching server data...</p>";

pub const MIXED_CONTENT_NOTICE: &str = r#"<div class="server-error">
    <p>Cannot load server data due to security restrictions</p>
    <p class="error-details">Your website is using HTTPS but trying to access an HTTP API.</p>
    <p>Options to fix this:</p>
    <ul>
        <li>Enable HTTPS for your Minecraft server API</li>
        <li>Create a proxy on your web server to forward requests</li>
        <li>Visit this page using HTTP instead of HTTPS (for testing only)</li>
    </ul>
</div>"#;

#[derive(Template)]
#[template(path = "server_status.html")]
struct ServerStatusView {
    name: String,
    version: String,
    build: String,
    address: String,
    player_count: String,
    tps: String,
    tps_class: &'static str,
    memory: String,
    players: Vec<PlayerCard>,
    plugins: Vec<PluginEntry>,
    updated_at: String,
}

struct PlayerCard {
    name: String,
    display_name: String,
    skin_url: String,
    ping: String,
    ping_class: &'static str,
}

struct PluginEntry {
    name: String,
    version: String,
    authors: String,
    state_class: &'static str,
}

#[derive(Template)]
#[template(path = "server_error.html")]
struct ServerErrorView<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "status_page.html")]
struct StatusPage<'a> {
    container_id: &'a str,
    refresh_secs: Option<u64>,
    contents: &'a str,
}

/// Renders a snapshot. Output depends only on the snapshot and `rendered_at`.
pub fn server_view(status: &ServerStatus, rendered_at: NaiveTime) -> Result<String, askama::Error> {
    let tps = status.tps.filter(|tps| *tps != 0.0);

    ServerStatusView {
        name: text_or(&status.name, "Minecraft Server"),
        version: text_or(&status.version, ""),
        build: text_or(&status.bukkit_version, ""),
        address: format!(
            "{}:{}",
            text_or(&status.ip, "Unknown"),
            status.port.filter(|port| *port != 0).unwrap_or(DEFAULT_PORT)
        ),
        player_count: format!(
            "{}/{}",
            status.online_players.unwrap_or(0),
            status.max_players.unwrap_or(0)
        ),
        tps: tps.map_or_else(|| "N/A".to_string(), |tps| format!("{:.2}", tps)),
        tps_class: tps_class(tps),
        memory: format_memory(status.allocated_memory, status.max_memory),
        players: status.players.iter().flatten().map(player_card).collect(),
        plugins: status.plugins.iter().flatten().map(plugin_entry).collect(),
        updated_at: rendered_at.format("%H:%M:%S").to_string(),
    }
    .render()
}

pub fn error_block(message: &str) -> Result<String, askama::Error> {
    ServerErrorView { message }.render()
}

/// The hosting page. It reloads itself only while the widget is polling.
pub fn status_page(container_id: &str, refresh_secs: Option<u64>, contents: &str) -> Result<String, askama::Error> {
    StatusPage { container_id, refresh_secs, contents }.render()
}

/// CSS class for a TPS reading; unknown readings get no class.
pub fn tps_class(tps: Option<f64>) -> &'static str {
    match tps {
        None => "",
        Some(tps) if tps >= 18.0 => "good",
        Some(tps) if tps >= 15.0 => "warning",
        Some(_) => "critical",
    }
}

/// CSS class for a ping in milliseconds; negative means unknown.
pub fn ping_class(ping: i64) -> &'static str {
    match ping {
        p if p < 0 => "",
        p if p < 100 => "good",
        p if p < 300 => "warning",
        _ => "critical",
    }
}

pub fn format_memory(used: Option<i64>, max: Option<i64>) -> String {
    match (used, max) {
        (Some(used), Some(max)) if used != 0 && max != 0 => format!("{}MB / {}MB", used, max),
        _ => "N/A".to_string(),
    }
}

fn player_card(player: &Player) -> PlayerCard {
    let name = text_or(&player.name, "Unknown");
    let ping = player.ping.unwrap_or(-1);

    PlayerCard {
        display_name: player
            .display_name
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.clone()),
        skin_url: player
            .skin_url
            .clone()
            .filter(|url| is_web_url(url))
            .unwrap_or_default(),
        ping: if ping < 0 { "N/A".to_string() } else { format!("{}ms", ping) },
        ping_class: ping_class(ping),
        name,
    }
}

fn plugin_entry(plugin: &Plugin) -> PluginEntry {
    PluginEntry {
        name: text_or(&plugin.name, "Unknown"),
        version: text_or(&plugin.version, "unknown"),
        authors: text_or(&plugin.authors, ""),
        state_class: if plugin.enabled.unwrap_or(false) { "enabled" } else { "disabled" },
    }
}

fn text_or(value: &Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}
