use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Outcome classes of a single remote call, success excluded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request cancelled")]
    Cancelled,
}

/// A completed call with a 2xx status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json(&self) -> Result<Value, SyncError> {
        serde_json::from_str(&self.body).map_err(|e| SyncError::MalformedResponse(e.to_string()))
    }
}

/// Performs exactly one request per `send`, bounded by a fixed timeout.
/// There is no retry here; callers own that policy.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and read its body. The request future is dropped (and the
    /// connection torn down) as soon as the timeout elapses or `cancel` fires.
    pub async fn send(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, CallError> {
        let exchange = async {
            let resp = request.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CallError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => return Err(CallError::Timeout(self.timeout)),
            res = exchange => res,
        };

        let (status, body) = result.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout(self.timeout)
            } else {
                CallError::Network(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(CallError::Api {
                status: status.as_u16(),
                message: extract_error_message(status, &body),
            });
        }
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Pull a message out of an error body.
///
/// Understands the Web API shape `{"error":{"status":..,"message":..}}` and the
/// accounts shape `{"error":"..","error_description":".."}`. Falls back to the
/// bare status code.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || format!("HTTP {}", status.as_u16());
    let v: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return fallback(),
    };
    let msg = match &v["error"] {
        Value::Object(o) => o.get("message").and_then(Value::as_str).map(str::to_string),
        Value::String(code) => Some(match v["error_description"].as_str() {
            Some(desc) if !desc.is_empty() => format!("{}: {}", code, desc),
            _ => code.clone(),
        }),
        _ => v["message"].as_str().map(str::to_string),
    };
    msg.filter(|m| !m.trim().is_empty()).unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_api_error_message() {
        let body = r#"{"error":{"status":404,"message":"Resource not found"}}"#;
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, body),
            "Resource not found"
        );
    }

    #[test]
    fn accounts_error_with_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#;
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, body),
            "invalid_grant: Refresh token revoked"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, r#"{"error":"invalid_client"}"#),
            "invalid_client"
        );
    }

    #[test]
    fn falls_back_to_status_code() {
        assert_eq!(extract_error_message(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
        assert_eq!(
            extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "HTTP 500"
        );
        assert_eq!(
            extract_error_message(StatusCode::FORBIDDEN, r#"{"error":{"status":403}}"#),
            "HTTP 403"
        );
    }
}
