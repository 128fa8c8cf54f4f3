use anyhow::{anyhow, Context};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::http::DEFAULT_TIMEOUT_MS;
use crate::models::{track_prefix, Credentials};

/// Process configuration, built once at startup and passed by reference.
#[derive(Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub playlist_id: String,

    /// Raw desired likes count; interpreted by `tracks::resolve_likes_count`.
    #[serde(default, deserialize_with = "raw_scalar")]
    pub likes_count: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_timeout_ms")]
    pub http_timeout_ms: u64,
    #[serde(default = "default_track_namespace")]
    pub track_namespace: String,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_api_base() -> String { "https://api.spotify.com/v1".into() }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }
fn default_timeout_ms() -> u64 { DEFAULT_TIMEOUT_MS }
fn default_track_namespace() -> String { "spotify".into() }

// Accept `likes_count = 30`, `= 30.0` or `= "30"` alike.
fn raw_scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<toml::Value>::deserialize(d)?;
    Ok(v.map(|v| match v {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            playlist_id: String::new(),
            likes_count: None,
            api_base: default_api_base(),
            auth_base: default_auth_base(),
            http_timeout_ms: default_timeout_ms(),
            track_namespace: default_track_namespace(),
            log_dir: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("credentials", &self.credentials())
            .field("playlist_id", &self.playlist_id)
            .field("likes_count", &self.likes_count)
            .field("api_base", &self.api_base)
            .field("auth_base", &self.auth_base)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("track_namespace", &self.track_namespace)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Config::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (normally the environment). Empty values
    /// are ignored so an exported-but-blank variable does not wipe a file value.
    pub fn with_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SPOTIFY_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = get("SPOTIFY_CLIENT_SECRET") {
            self.client_secret = v;
        }
        if let Some(v) = get("SPOTIFY_REFRESH_TOKEN") {
            self.refresh_token = v;
        }
        if let Some(v) = get("SPOTIFY_PLAYLIST_ID") {
            self.playlist_id = v;
        }
        if let Some(v) = get("LIKES_COUNT") {
            self.likes_count = Some(v);
        }
        if let Some(v) = get("SPOTIFY_API_BASE") {
            self.api_base = v;
        }
        if let Some(v) = get("SPOTIFY_AUTH_BASE") {
            self.auth_base = v;
        }
        if let Some(v) = get("HTTP_TIMEOUT_MS") {
            self.http_timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_MS is not a number: {}", v))?;
        }
        if let Some(v) = get("TRACK_NAMESPACE") {
            self.track_namespace = v;
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        Ok(self)
    }

    /// Structural checks only. Blank credentials and playlist id are reported by
    /// [`Config::missing_required`] and surface at run time.
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.api_base).with_context(|| format!("invalid api_base: {}", self.api_base))?;
        url::Url::parse(&self.auth_base)
            .with_context(|| format!("invalid auth_base: {}", self.auth_base))?;
        if self.http_timeout_ms == 0 {
            return Err(anyhow!("http_timeout_ms must be greater than zero"));
        }
        if self.track_namespace.trim().is_empty() || self.track_namespace.contains(':') {
            return Err(anyhow!("invalid track_namespace: {:?}", self.track_namespace));
        }
        Ok(())
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = self.credentials().missing_fields();
        if self.playlist_id().is_none() {
            missing.push("playlist id");
        }
        missing
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Trimmed playlist id, or `None` when blank.
    pub fn playlist_id(&self) -> Option<&str> {
        let id = self.playlist_id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn track_prefix(&self) -> String {
        track_prefix(&self.track_namespace)
    }
}
