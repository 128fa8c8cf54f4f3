//! Pure helpers shared by the likes and playlist readers.

use serde_json::Value;

use crate::error::SyncError;
use crate::models::{TrackList, TrackUri};

/// Hard page size limit of the saved-tracks endpoint.
pub const MAX_LIKES_LIMIT: u32 = 50;
pub const DEFAULT_LIKES_COUNT: u32 = 50;
/// Playlist read cap; matches the likes cap so both sides compare like for like.
pub const PLAYLIST_READ_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    Configured,
    Default,
    Clamped { requested: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikesCount {
    pub count: u32,
    pub source: CountSource,
}

/// Turn the raw configured count into the `limit` sent to the API.
///
/// Absent, non-numeric, fractional or < 1 values use the default; values above
/// the API limit are clamped to it.
pub fn resolve_likes_count(raw: Option<&str>) -> LikesCount {
    let parsed = raw
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 1.0);

    match parsed {
        None => LikesCount {
            count: DEFAULT_LIKES_COUNT,
            source: CountSource::Default,
        },
        Some(n) if n > MAX_LIKES_LIMIT as f64 => LikesCount {
            count: MAX_LIKES_LIMIT,
            source: CountSource::Clamped {
                requested: n as u64,
            },
        },
        Some(n) => LikesCount {
            count: n as u32,
            source: CountSource::Configured,
        },
    }
}

/// Collect `items[].track.uri` values that carry the track prefix, in order.
///
/// Items without a track, without a uri, with a non-string uri or from another
/// namespace are dropped. A body with no `items` array at all is an error.
pub fn extract_track_uris(body: &Value, prefix: &str) -> Result<TrackList, SyncError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SyncError::UnexpectedStructure("response has no items array".into()))?;

    Ok(items
        .iter()
        .filter_map(|item| item.get("track")?.get("uri")?.as_str())
        .filter_map(|uri| TrackUri::parse(uri, prefix))
        .collect())
}
