#![allow(dead_code)]

use liked_playlist_sync::config::Config;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;

/// base64("test_id:test_secret")
pub const BASIC_AUTH: &str = "Basic dGVzdF9pZDp0ZXN0X3NlY3JldA==";
pub const ACCESS_TOKEN: &str = "new-access-token";

pub const TRACK_A: &str = "spotify:track:4uLU6hMCjMI75M1A2tKUQC";
pub const TRACK_B: &str = "spotify:track:7ouMYWpwJ422jRcDASZB7P";
pub const TRACK_C: &str = "spotify:track:0VjIjW4GlUZAMYd2vXMi3b";

/// Config with every endpoint pointed at `base`.
pub fn config_for(base: &str) -> Config {
    Config {
        client_id: "test_id".into(),
        client_secret: "test_secret".into(),
        refresh_token: "refresh-spotify".into(),
        playlist_id: "pl1".into(),
        api_base: base.to_string(),
        auth_base: base.to_string(),
        http_timeout_ms: 2_000,
        ..Config::default()
    }
}

pub fn items_body(uris: &[&str]) -> String {
    let items: Vec<_> = uris.iter().map(|u| json!({ "track": { "uri": u } })).collect();
    json!({ "items": items }).to_string()
}

pub async fn mock_token(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/api/token")
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access_token": ACCESS_TOKEN, "token_type": "Bearer", "expires_in": 3600 }).to_string())
        .create_async()
        .await
}

pub async fn mock_likes(server: &mut ServerGuard, limit: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/me/tracks".into()))
        .match_query(Matcher::UrlEncoded("limit".into(), limit.into()))
        .match_header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_playlist_read(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/playlists/pl1/tracks".into()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("fields".into(), "items(track(uri))".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Base URL of a server that accepts one connection and never answers.
pub fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((socket, _)) = listener.accept() {
            std::thread::sleep(Duration::from_secs(5));
            drop(socket);
        }
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
pub fn refused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
