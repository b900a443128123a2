//! Dream CRUD and the public feed over HTTP.

mod common;

use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_list_newest_first() {
    let (base, _ctx) = start_test_server().await;
    let token = register_user(&base, "lister").await;

    let first = create_dream(&base, &token, "first", Some("calm"), &["flying"], false).await;
    assert_eq!(first["title"], "first");
    assert_eq!(first["mood"], "calm");
    assert_eq!(first["tags"], json!(["flying"]));
    assert_eq!(first["is_public"], false);

    // Spread creation timestamps so the ordering is unambiguous.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_dream(&base, &token, "second", None, &[], true).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_dream(&base, &token, "third", None, &[], false).await;

    let list = get_json(&base, &token, "/dreams").await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn create_rejects_blank_title_and_content() {
    let (base, _ctx) = start_test_server().await;
    let token = register_user(&base, "strict").await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "title": "   ", "content": "something" }),
        json!({ "title": "ok", "content": "" }),
    ] {
        let resp = client
            .post(format!("{base}/dreams"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
}

#[tokio::test]
async fn partial_update_keeps_absent_fields_and_clears_empty_mood() {
    let (base, _ctx) = start_test_server().await;
    let token = register_user(&base, "editor").await;
    let client = reqwest::Client::new();

    let dream = create_dream(&base, &token, "original", Some("happy"), &["water"], false).await;
    let id = dream["id"].as_str().unwrap();

    // Only flip visibility; everything else must survive.
    let resp = client
        .put(format!("{base}/dreams/{id}"))
        .bearer_auth(&token)
        .json(&json!({ "is_public": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "original");
    assert_eq!(updated["mood"], "happy");
    assert_eq!(updated["tags"], json!(["water"]));
    assert_eq!(updated["is_public"], true);

    // Empty-string mood clears it to null.
    let resp = client
        .put(format!("{base}/dreams/{id}"))
        .bearer_auth(&token)
        .json(&json!({ "mood": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert!(updated["mood"].is_null());
    assert_eq!(updated["title"], "original");
}

#[tokio::test]
async fn other_users_dreams_answer_404() {
    let (base, _ctx) = start_test_server().await;
    let owner = register_user(&base, "owner").await;
    let intruder = register_user(&base, "intruder").await;
    let client = reqwest::Client::new();

    let dream = create_dream(&base, &owner, "secret", None, &[], true).await;
    let id = dream["id"].as_str().unwrap();

    let resp = client
        .put(format!("{base}/dreams/{id}"))
        .bearer_auth(&intruder)
        .json(&json!({ "title": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{base}/dreams/{id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Owner still sees it untouched.
    let list = get_json(&base, &owner, "/dreams").await;
    assert_eq!(list[0]["title"], "secret");
}

#[tokio::test]
async fn delete_answers_204_then_404() {
    let (base, _ctx) = start_test_server().await;
    let token = register_user(&base, "deleter").await;
    let client = reqwest::Client::new();

    let dream = create_dream(&base, &token, "gone soon", None, &[], false).await;
    let id = dream["id"].as_str().unwrap();

    let resp = client
        .delete(format!("{base}/dreams/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .delete(format!("{base}/dreams/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let list = get_json(&base, &token, "/dreams").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn public_feed_shows_only_public_dreams_with_author_profile() {
    let (base, _ctx) = start_test_server().await;
    let author = register_user(&base, "author").await;
    let reader = register_user(&base, "reader").await;
    let client = reqwest::Client::new();

    // Give the author a bio so the feed carries it.
    let resp = client
        .put(format!("{base}/auth/profile"))
        .bearer_auth(&author)
        .json(&json!({ "full_name": "An Author", "bio": "writes at night" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    create_dream(&base, &author, "hidden", None, &[], false).await;
    create_dream(&base, &author, "shared", Some("happy"), &["flying"], true).await;

    let feed = get_json(&base, &reader, "/dreams/public").await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    let entry = &feed[0];
    assert_eq!(entry["title"], "shared");
    assert_eq!(entry["profiles"]["username"], "author");
    assert_eq!(entry["profiles"]["full_name"], "An Author");
    assert_eq!(entry["profiles"]["bio"], "writes at night");
    assert_eq!(entry["reactions"][0]["count"], 0);
}
