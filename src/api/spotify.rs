use super::http::{ApiResponse, HttpClient};
use super::MusicService;
use crate::config::Config;
use crate::error::{describe_write_failure, SyncError};
use crate::models::{AccessToken, Credentials, PlaylistInfo, PlaylistMetadata, TrackList, TrackUri};
use crate::tracks::{extract_track_uris, resolve_likes_count, CountSource, PLAYLIST_READ_LIMIT};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Spotify Web API backed service. Every call goes through [`HttpClient`]
/// exactly once; endpoints come from `Config::api_base`/`auth_base` so tests
/// can point them at a local mock server.
pub struct SpotifyService {
    http: HttpClient,
    api_base: String,
    auth_base: String,
    credentials: Credentials,
    playlist_id: Option<String>,
    likes_count: Option<String>,
    track_prefix: String,
    cancel: CancellationToken,
}

impl SpotifyService {
    pub fn new(cfg: &Config, cancel: CancellationToken) -> Self {
        Self {
            http: HttpClient::new(cfg.http_timeout()),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            auth_base: cfg.auth_base.clone(),
            credentials: cfg.credentials(),
            playlist_id: cfg.playlist_id().map(str::to_string),
            likes_count: cfg.likes_count.clone(),
            track_prefix: cfg.track_prefix(),
            cancel,
        }
    }

    fn playlist_url(&self, suffix: &str) -> Result<String, SyncError> {
        let id = self
            .playlist_id
            .as_deref()
            .ok_or(SyncError::MissingConfiguration("playlist id"))?;
        Ok(format!(
            "{}/playlists/{}{}",
            self.api_base,
            urlencoding::encode(id),
            suffix
        ))
    }

    async fn get(&self, token: &AccessToken, url: &str) -> Result<ApiResponse, SyncError> {
        let request = self
            .http
            .client()
            .get(url)
            .header(AUTHORIZATION, token.bearer());
        Ok(self.http.send(request, &self.cancel).await?)
    }

    async fn put_json(
        &self,
        token: &AccessToken,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse, SyncError> {
        let request = self
            .http
            .client()
            .put(url)
            .header(AUTHORIZATION, token.bearer())
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        Ok(self.http.send(request, &self.cancel).await?)
    }

    /// Reads at most the first 50 entries, so tracks beyond the likes window are not seen by the comparison.
    async fn try_fetch_playlist_tracks(&self, token: &AccessToken) -> Result<TrackList, SyncError> {
        let url = self.playlist_url(&format!(
            "/tracks?fields=items(track(uri))&limit={}",
            PLAYLIST_READ_LIMIT
        ))?;
        let resp = self.get(token, &url).await?;
        extract_track_uris(&resp.json()?, &self.track_prefix)
    }

    async fn try_replace_tracks(&self, token: &AccessToken, tracks: &[TrackUri]) -> Result<(), SyncError> {
        let url = self.playlist_url("/tracks")?;
        let resp = self.put_json(token, &url, &json!({ "uris": tracks })).await?;
        debug!("replace tracks answered {}", resp.status);
        Ok(())
    }

    async fn try_update_details(&self, token: &AccessToken, metadata: &PlaylistMetadata) -> Result<(), SyncError> {
        let url = self.playlist_url("")?;
        let body = serde_json::to_value(metadata)
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;
        self.put_json(token, &url, &body).await?;
        Ok(())
    }

    pub async fn acquire_token(&self) -> Result<AccessToken, SyncError> {
        super::spotify_auth::acquire_token(&self.http, &self.auth_base, &self.credentials, &self.cancel).await
    }

    /// Read back name, description and track total of the target playlist.
    pub async fn fetch_playlist_info(&self, token: &AccessToken) -> Result<PlaylistInfo, SyncError> {
        let url = self.playlist_url("?fields=name,description,tracks(total)")?;
        let j = self.get(token, &url).await?.json()?;
        let name = j["name"]
            .as_str()
            .ok_or_else(|| SyncError::UnexpectedStructure("playlist has no name".into()))?
            .to_string();
        Ok(PlaylistInfo {
            name,
            description: j["description"].as_str().map(|s| s.to_string()),
            track_total: j["tracks"]["total"].as_u64(),
        })
    }
}

#[async_trait]
impl MusicService for SpotifyService {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn acquire_token(&self) -> Result<AccessToken, SyncError> {
        SpotifyService::acquire_token(self).await
    }

    async fn fetch_recent_likes(&self, token: &AccessToken) -> Result<TrackList, SyncError> {
        let resolved = resolve_likes_count(self.likes_count.as_deref());
        if let CountSource::Clamped { requested } = resolved.source {
            info!(
                "requested {} liked tracks; the API returns at most {}, using {}",
                requested, resolved.count, resolved.count
            );
        }
        let url = format!("{}/me/tracks?limit={}", self.api_base, resolved.count);
        let resp = self.get(token, &url).await?;
        let likes = extract_track_uris(&resp.json()?, &self.track_prefix)?;
        debug!("fetched {} liked tracks (limit {})", likes.len(), resolved.count);
        Ok(likes)
    }

    async fn fetch_playlist_tracks(&self, token: &AccessToken) -> Option<TrackList> {
        match self.try_fetch_playlist_tracks(token).await {
            Ok(tracks) => Some(tracks),
            Err(e) => {
                warn!("could not read current playlist contents: {}", e);
                None
            }
        }
    }

    async fn replace_playlist_tracks(&self, token: &AccessToken, tracks: &[TrackUri]) -> bool {
        match self.try_replace_tracks(token, tracks).await {
            Ok(()) => true,
            Err(e) => {
                error!("replacing playlist tracks failed: {} ({})", describe_write_failure(&e), e);
                false
            }
        }
    }

    async fn update_playlist_metadata(&self, token: &AccessToken, metadata: &PlaylistMetadata) -> bool {
        if metadata.is_empty() {
            return true;
        }
        match self.try_update_details(token, metadata).await {
            Ok(()) => true,
            Err(e) => {
                warn!("updating playlist details failed: {}", e);
                false
            }
        }
    }
}
