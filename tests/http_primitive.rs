mod common;

use common::{refused_address, silent_server};
use liked_playlist_sync::api::http::{CallError, HttpClient};
use mockito::Server;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn success_returns_status_and_body() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/ok")
        .with_status(201)
        .with_body(r#"{"snapshot_id":"s1"}"#)
        .create_async()
        .await;

    let http = HttpClient::new(Duration::from_secs(2));
    let req = http.client().get(format!("{}/ok", server.url()));
    let resp = http.send(req, &CancellationToken::new()).await.expect("response");
    assert_eq!(resp.status, 201);
    assert_eq!(resp.json().unwrap()["snapshot_id"], "s1");
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body(r#"{"error":{"status":404,"message":"Not found."}}"#)
        .create_async()
        .await;

    let http = HttpClient::new(Duration::from_secs(2));
    let req = http.client().get(format!("{}/missing", server.url()));
    let err = http.send(req, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        CallError::Api {
            status: 404,
            message: "Not found.".into()
        }
    );
}

#[tokio::test]
async fn slow_server_times_out() {
    let base = silent_server();
    let http = HttpClient::new(Duration::from_millis(200));
    let req = http.client().get(format!("{}/slow", base));
    let err = http.send(req, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err, CallError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn cancellation_aborts_in_flight_call() {
    let base = silent_server();
    let http = HttpClient::new(Duration::from_secs(10));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let req = http.client().get(format!("{}/slow", base));
    let err = http.send(req, &cancel).await.unwrap_err();
    assert_eq!(err, CallError::Cancelled);
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let http = HttpClient::new(Duration::from_secs(2));
    let req = http.client().get(format!("{}/", refused_address()));
    let err = http.send(req, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, CallError::Network(_)), "got {:?}", err);
}
