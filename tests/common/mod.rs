//! Shared helpers: spin up a real server on a free port against a
//! throwaway data directory, and drive it over HTTP.

#![allow(dead_code)]

use std::sync::Arc;

use dreamd::{
    clock::{Clock, SystemClock},
    config::ServerConfig,
    rest,
    storage::Storage,
    AppContext,
};
use serde_json::{json, Value};

pub async fn start_test_server() -> (String, Arc<AppContext>) {
    start_test_server_with_clock(Arc::new(SystemClock)).await
}

/// Start a server with an injected clock and return (base URL, context).
/// The base URL already includes the `/api` prefix.
pub async fn start_test_server_with_clock(clock: Arc<dyn Clock>) -> (String, Arc<AppContext>) {
    let data_dir = tempfile::tempdir().unwrap().keep();
    let port = get_free_port();

    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(data_dir.clone()),
        Some("warn".to_string()),
        None,
    ));
    let storage = Arc::new(Storage::new(&data_dir).await.unwrap());
    let ctx = Arc::new(AppContext::new(config, storage, clock));

    let ctx_server = ctx.clone();
    tokio::spawn(async move {
        rest::start_rest_server(ctx_server).await.ok();
    });

    // Give the server a moment to bind
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}/api"), ctx)
}

pub fn get_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Register `<name>@example.com` and return the bearer token.
pub async fn register_user(base: &str, name: &str) -> String {
    let resp = reqwest::Client::new()
        .post(format!("{base}/auth/register"))
        .json(&json!({
            "username": name,
            "email": format!("{name}@example.com"),
            "password": "correct-horse-battery",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "register failed for {name}");
    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Create a dream over HTTP and return the response body.
pub async fn create_dream(
    base: &str,
    token: &str,
    title: &str,
    mood: Option<&str>,
    tags: &[&str],
    is_public: bool,
) -> Value {
    let resp = reqwest::Client::new()
        .post(format!("{base}/dreams"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "content": format!("content of {title}"),
            "mood": mood,
            "tags": tags,
            "is_public": is_public,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "create dream failed for {title}");
    resp.json().await.unwrap()
}

pub async fn get_json(base: &str, token: &str, path: &str) -> Value {
    let resp = reqwest::Client::new()
        .get(format!("{base}{path}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "GET {path} failed");
    resp.json().await.unwrap()
}
