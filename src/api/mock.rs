use super::MusicService;
use crate::error::SyncError;
use crate::models::{AccessToken, PlaylistMetadata, TrackList, TrackUri};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// Calls recorded by [`MockService`], in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    AcquireToken,
    FetchLikes,
    FetchPlaylist,
    Replace(TrackList),
    UpdateMetadata(PlaylistMetadata),
}

/// A scripted in-memory service used in tests.
/// Successful replaces become the playlist contents seen by later reads, so
/// back-to-back runs behave like they would against the real service.
pub struct MockService {
    token: Result<AccessToken, SyncError>,
    likes: Result<TrackList, SyncError>,
    playlist: Mutex<Option<TrackList>>,
    playlist_readable: bool,
    replace_ok: bool,
    metadata_ok: bool,
    calls: Mutex<Vec<MockCall>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            token: Ok(AccessToken::new("mock-token")),
            likes: Ok(Vec::new()),
            playlist: Mutex::new(Some(Vec::new())),
            playlist_readable: true,
            replace_ok: true,
            metadata_ok: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token_error(mut self, err: SyncError) -> Self {
        self.token = Err(err);
        self
    }

    pub fn with_likes<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.likes = Ok(to_tracks(uris));
        self
    }

    pub fn with_likes_error(mut self, err: SyncError) -> Self {
        self.likes = Err(err);
        self
    }

    pub fn with_playlist<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.playlist.lock().unwrap_or_else(|p| p.into_inner()) = Some(to_tracks(uris));
        self
    }

    pub fn with_unreadable_playlist(mut self) -> Self {
        self.playlist_readable = false;
        self
    }

    pub fn failing_replace(mut self) -> Self {
        self.replace_ok = false;
        self
    }

    pub fn failing_metadata(mut self) -> Self {
        self.metadata_ok = false;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Track lists passed to `replace_playlist_tracks`.
    pub fn replaced(&self) -> Vec<TrackList> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Replace(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn metadata_updates(&self) -> Vec<PlaylistMetadata> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::UpdateMetadata(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).push(call);
    }
}

// Mock URIs are taken verbatim; tests choose the namespace.
fn to_tracks<I, S>(uris: I) -> TrackList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    uris.into_iter()
        .filter_map(|u| TrackUri::parse(u.as_ref(), ""))
        .collect()
}

#[async_trait]
impl MusicService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn acquire_token(&self) -> Result<AccessToken, SyncError> {
        self.record(MockCall::AcquireToken);
        self.token.clone()
    }

    async fn fetch_recent_likes(&self, _token: &AccessToken) -> Result<TrackList, SyncError> {
        self.record(MockCall::FetchLikes);
        self.likes.clone()
    }

    async fn fetch_playlist_tracks(&self, _token: &AccessToken) -> Option<TrackList> {
        self.record(MockCall::FetchPlaylist);
        if !self.playlist_readable {
            return None;
        }
        self.playlist.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    async fn replace_playlist_tracks(&self, _token: &AccessToken, tracks: &[TrackUri]) -> bool {
        info!("MockService: replace_playlist_tracks -> {} tracks", tracks.len());
        self.record(MockCall::Replace(tracks.to_vec()));
        if self.replace_ok {
            *self.playlist.lock().unwrap_or_else(|p| p.into_inner()) = Some(tracks.to_vec());
        }
        self.replace_ok
    }

    async fn update_playlist_metadata(&self, _token: &AccessToken, metadata: &PlaylistMetadata) -> bool {
        info!("MockService: update_playlist_metadata {:?}", metadata.name);
        self.record(MockCall::UpdateMetadata(metadata.clone()));
        self.metadata_ok
    }
}
