pub mod http;
pub mod mock;
pub mod spotify;
pub mod spotify_auth;

use crate::error::SyncError;
use crate::models::{AccessToken, PlaylistMetadata, TrackList, TrackUri};

/// The remote operations a sync run needs.
/// Implementations: spotify::SpotifyService and mock::MockService.
#[async_trait::async_trait]
pub trait MusicService: Send + Sync {
    /// Exchange long-lived credentials for a bearer token.
    async fn acquire_token(&self) -> Result<AccessToken, SyncError>;

    /// Most recently liked tracks, newest first. A failure is never an empty list.
    async fn fetch_recent_likes(&self, token: &AccessToken) -> Result<TrackList, SyncError>;

    /// Current target playlist contents, or `None` when they could not be read.
    /// Failures are logged, never propagated.
    async fn fetch_playlist_tracks(&self, token: &AccessToken) -> Option<TrackList>;

    /// Replace the whole playlist with `tracks`. Returns false on any failure.
    async fn replace_playlist_tracks(&self, token: &AccessToken, tracks: &[TrackUri]) -> bool;

    /// Write name and/or description in one request. Returns false on any failure.
    async fn update_playlist_metadata(&self, token: &AccessToken, metadata: &PlaylistMetadata) -> bool;

    /// Return the service's name (for logging)
    fn name(&self) -> &str;
}
