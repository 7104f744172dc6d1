// src/models/status.rs
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_PORT: i64 = 25565;
pub const FALLBACK_MAX_PLAYERS: i64 = 20;

/// Snapshot reported by the game server's status API.
///
/// Every field is optional: the payload comes from an untrusted upstream and
/// defaults are applied when rendering, not here. A field with the wrong JSON
/// type is read as absent instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub port: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bukkit_version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_players: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub online_players: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub tps: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub allocated_memory: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_memory: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub players: Option<Vec<Player>>,
    #[serde(default, deserialize_with = "lenient")]
    pub plugins: Option<Vec<Plugin>>,
}

impl ServerStatus {
    /// Parses a gateway body. A JSON object is read field by field and a
    /// repeated key keeps its last value. Other non-null JSON carries no
    /// fields, so it reads as an empty snapshot. `null` and non-JSON fail.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Null => serde_json::from_value(Value::Null),
            value @ Value::Object(_) => serde_json::from_value(value),
            _ => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub skin_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ping: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Plugin {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub authors: Option<String>,
}

/// Payload the gateway synthesizes when the upstream is unreachable.
/// Field order is part of the wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineStatus {
    pub online: bool,
    pub name: String,
    pub ip: String,
    pub port: i64,
    pub version: String,
    pub max_players: i64,
    pub online_players: i64,
    pub players: Vec<Value>,
}

impl OfflineStatus {
    pub fn new(name: &str, ip: &str, version: &str) -> Self {
        Self {
            online: false,
            name: name.to_string(),
            ip: ip.to_string(),
            port: DEFAULT_PORT,
            version: version.to_string(),
            max_players: FALLBACK_MAX_PLAYERS,
            online_players: 0,
            players: Vec::new(),
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
