use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Long-lived credentials exchanged for an access token on every run.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    /// Names of the fields that are blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push("client id");
        }
        if self.client_secret.trim().is_empty() {
            missing.push("client secret");
        }
        if self.refresh_token.trim().is_empty() {
            missing.push("refresh token");
        }
        missing
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Short-lived bearer token. Held by a single run and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.as_str())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A `<namespace>:track:<id>` reference. Anything else never gets constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackUri(String);

impl TrackUri {
    /// Accept `raw` only if it starts with the track prefix (see [`track_prefix`]).
    pub fn parse(raw: &str, prefix: &str) -> Option<Self> {
        if raw.starts_with(prefix) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered; the same set in another order counts as different content.
pub type TrackList = Vec<TrackUri>;

pub fn track_prefix(namespace: &str) -> String {
    format!("{}:track:", namespace)
}

/// Subset of playlist details to write. Absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaylistMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaylistMetadata {
    /// Status written after a successful sync of `count` tracks.
    pub fn for_sync(count: usize, now: DateTime<Utc>) -> Self {
        Self {
            name: Some(format!("LAST{}LIKED", count)),
            description: Some(format!(
                "Last sync: {}",
                now.format("%Y-%m-%d %H:%M:%S UTC")
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Playlist details read back by `verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub name: String,
    pub description: Option<String>,
    pub track_total: Option<u64>,
}

/// Step at which a run gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Token,
    Likes,
    InvalidData,
    PlaylistWrite,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureStage::Token => "token acquisition",
            FailureStage::Likes => "likes fetch",
            FailureStage::InvalidData => "track validation",
            FailureStage::PlaylistWrite => "playlist write",
        };
        f.write_str(s)
    }
}

/// Terminal classification of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Changed { count: usize },
    Unchanged { count: usize },
    EmptyLikes,
    Failed(FailureStage),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncOutcome::Failed(_))
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
