use base64::{engine::general_purpose, Engine as _};
use log::debug;
use reqwest::header::AUTHORIZATION;
use tokio_util::sync::CancellationToken;

use super::http::HttpClient;
use crate::error::SyncError;
use crate::models::{AccessToken, Credentials};

/// Exchange the stored refresh token for a fresh access token.
///
/// Blank credentials fail before any request is made. The token endpoint lives
/// under `auth_base` (`<auth_base>/api/token`).
pub async fn acquire_token(
    http: &HttpClient,
    auth_base: &str,
    credentials: &Credentials,
    cancel: &CancellationToken,
) -> Result<AccessToken, SyncError> {
    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        return Err(SyncError::MissingCredentials { missing });
    }

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", credentials.refresh_token.as_str()),
    ];
    let auth_header = format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ))
    );
    let url = format!("{}/api/token", auth_base.trim_end_matches('/'));
    let request = http
        .client()
        .post(&url)
        .header(AUTHORIZATION, auth_header)
        .form(&params);

    let resp = http.send(request, cancel).await?;
    let j = resp.json()?;
    let access_token = j["access_token"]
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SyncError::UnexpectedStructure("token response has no access_token".into()))?;

    debug!(
        "acquired access token (expires_in={})",
        j["expires_in"].as_i64().unwrap_or(3600)
    );
    Ok(AccessToken::new(access_token))
}
