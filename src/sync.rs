use crate::api::MusicService;
use crate::error::SyncError;
use crate::models::{FailureStage, PlaylistMetadata, SyncOutcome, TrackUri};
use chrono::{DateTime, Utc};

/// Shortest track reference accepted after fetching. Anything shorter is
/// treated as truncated or corrupt.
pub const MIN_TRACK_URI_LEN: usize = 20;

/// What happened during a run, in order. Rendering is left to `report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    TokenFailed(SyncError),
    LikesFetched { count: usize },
    LikesFailed(SyncError),
    InvalidTracks(SyncError),
    EmptyLikes,
    PlaylistUnknown,
    PlaylistUnchanged { count: usize },
    PlaylistReplaced { count: usize },
    PlaylistWriteFailed { count: usize },
    MetadataUpdated { name: String },
    MetadataFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Name of the service the run talked to.
    pub service: String,
    pub outcome: SyncOutcome,
    pub events: Vec<SyncEvent>,
}

impl SyncReport {
    fn finish(service: &str, outcome: SyncOutcome, events: Vec<SyncEvent>) -> Self {
        Self {
            service: service.to_string(),
            outcome,
            events,
        }
    }
}

/// Count references shorter than [`MIN_TRACK_URI_LEN`].
pub fn count_invalid(tracks: &[TrackUri]) -> usize {
    tracks
        .iter()
        .filter(|t| t.as_str().len() < MIN_TRACK_URI_LEN)
        .count()
}

/// True when `current` is known and equals `likes` element for element.
pub fn is_unchanged(likes: &[TrackUri], current: Option<&[TrackUri]>) -> bool {
    current.map_or(false, |c| c == likes)
}

/// Run one sync against `service`.
///
/// Likes and current playlist contents are read concurrently; writes happen
/// strictly after both reads and one after the other. The playlist is never
/// written when the likes fetch failed or returned nothing.
pub async fn run_sync<S>(service: &S, now: DateTime<Utc>) -> SyncReport
where
    S: MusicService + ?Sized,
{
    let mut events = Vec::new();

    let token = match service.acquire_token().await {
        Ok(t) => t,
        Err(e) => {
            events.push(SyncEvent::TokenFailed(e));
            return SyncReport::finish(service.name(), SyncOutcome::Failed(FailureStage::Token), events);
        }
    };

    let (likes, current) = futures::join!(
        service.fetch_recent_likes(&token),
        service.fetch_playlist_tracks(&token)
    );

    let likes = match likes {
        Ok(l) => l,
        Err(e) => {
            events.push(SyncEvent::LikesFailed(e));
            return SyncReport::finish(service.name(), SyncOutcome::Failed(FailureStage::Likes), events);
        }
    };
    events.push(SyncEvent::LikesFetched { count: likes.len() });

    let invalid = count_invalid(&likes);
    if invalid > 0 {
        events.push(SyncEvent::InvalidTracks(SyncError::InvalidData {
            invalid,
            total: likes.len(),
        }));
        return SyncReport::finish(service.name(), SyncOutcome::Failed(FailureStage::InvalidData), events);
    }

    if likes.is_empty() {
        events.push(SyncEvent::EmptyLikes);
        return SyncReport::finish(service.name(), SyncOutcome::EmptyLikes, events);
    }

    let count = likes.len();
    if current.is_none() {
        events.push(SyncEvent::PlaylistUnknown);
    }

    let outcome = if is_unchanged(&likes, current.as_deref()) {
        events.push(SyncEvent::PlaylistUnchanged { count });
        SyncOutcome::Unchanged { count }
    } else if service.replace_playlist_tracks(&token, &likes).await {
        events.push(SyncEvent::PlaylistReplaced { count });
        SyncOutcome::Changed { count }
    } else {
        events.push(SyncEvent::PlaylistWriteFailed { count });
        return SyncReport::finish(service.name(), SyncOutcome::Failed(FailureStage::PlaylistWrite), events);
    };

    let metadata = PlaylistMetadata::for_sync(count, now);
    if service.update_playlist_metadata(&token, &metadata).await {
        events.push(SyncEvent::MetadataUpdated {
            name: metadata.name.unwrap_or_default(),
        });
    } else {
        events.push(SyncEvent::MetadataFailed);
    }

    SyncReport::finish(service.name(), outcome, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uris(raw: &[&str]) -> Vec<TrackUri> {
        raw.iter().filter_map(|u| TrackUri::parse(u, "")).collect()
    }

    #[test]
    fn comparison_is_order_sensitive() {
        let a = uris(&["spotify:track:aaaaaaaa", "spotify:track:bbbbbbbb"]);
        let b = uris(&["spotify:track:bbbbbbbb", "spotify:track:aaaaaaaa"]);
        assert!(is_unchanged(&a, Some(&a)));
        assert!(!is_unchanged(&a, Some(&b)));
        assert!(!is_unchanged(&a, Some(&a[..1])));
        assert!(!is_unchanged(&a, None));
    }

    #[test]
    fn short_references_are_invalid() {
        let list = uris(&["spotify:track:4uLU6hMCjMI75M1A2tKUQC", "spotify:track:", "spotify:track:ab"]);
        assert_eq!(count_invalid(&list), 2);
    }
}
