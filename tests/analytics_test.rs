//! Per-user analytics report over HTTP, pinned to a fixed clock so the
//! month bucket and activity window are deterministic.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::*;
use dreamd::clock::FixedClock;
use serde_json::{json, Value};

fn fixed_now() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap(),
    ))
}

async fn user_id(base: &str, token: &str) -> String {
    get_json(base, token, "/auth/me").await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn empty_report_is_fully_populated() {
    let (base, _ctx) = start_test_server_with_clock(fixed_now()).await;
    let token = register_user(&base, "fresh").await;

    let report = get_json(&base, &token, "/analytics").await;
    assert_eq!(report["totalDreams"], 0);
    assert_eq!(report["thisMonth"], 0);
    assert!(report["mostCommonMood"].is_null());
    assert_eq!(report["topTags"], json!([]));
    assert_eq!(report["moodDistribution"], json!([]));

    let activity = report["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 14);
    assert_eq!(activity[0]["date"], "2026-08-02");
    assert_eq!(activity[13]["date"], "2026-08-15");
    for day in activity {
        assert_eq!(day["count"], 0);
    }
}

#[tokio::test]
async fn report_aggregates_month_moods_tags_and_activity() {
    let (base, ctx) = start_test_server_with_clock(fixed_now()).await;
    let token = register_user(&base, "dreamer").await;
    let uid = user_id(&base, &token).await;

    // Backdated entries go straight through storage; the two dated "today"
    // go over HTTP and pick up the fixed clock.
    let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap();
    ctx.storage
        .create_dream(&uid, "last month", "c", Some("calm"), &strings(&["flying"]), false, at(2026, 7, 31))
        .await
        .unwrap();
    ctx.storage
        .create_dream(&uid, "early august", "c", None, &strings(&["water"]), false, at(2026, 8, 3))
        .await
        .unwrap();
    ctx.storage
        .create_dream(&uid, "yesterday-ish", "c", Some("happy"), &strings(&["flying", "water"]), true, at(2026, 8, 14))
        .await
        .unwrap();
    create_dream(&base, &token, "today one", Some("happy"), &["water"], false).await;
    create_dream(&base, &token, "today two", None, &[], true).await;

    let report = get_json(&base, &token, "/analytics").await;

    assert_eq!(report["totalDreams"], 5);
    assert_eq!(report["thisMonth"], 4);

    // Two moodless entries tie with two "happy" ones; the absent group
    // orders first, so the top mood is null.
    assert!(report["mostCommonMood"].is_null());
    assert_eq!(
        report["moodDistribution"],
        json!([
            { "mood": null, "count": 2 },
            { "mood": "happy", "count": 2 },
            { "mood": "calm", "count": 1 },
        ])
    );

    assert_eq!(
        report["topTags"],
        json!([
            { "tag": "water", "count": 3 },
            { "tag": "flying", "count": 2 },
        ])
    );

    let activity = report["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 14);
    let count_for = |date: &str| {
        activity
            .iter()
            .find(|d| d["date"] == date)
            .map(|d| d["count"].as_u64().unwrap())
    };
    // 2026-07-31 falls outside the window entirely.
    assert_eq!(count_for("2026-07-31"), None);
    assert_eq!(count_for("2026-08-03"), Some(1));
    assert_eq!(count_for("2026-08-14"), Some(1));
    assert_eq!(count_for("2026-08-15"), Some(2));
    assert_eq!(
        activity.iter().map(|d| d["count"].as_u64().unwrap()).sum::<u64>(),
        4
    );
}

#[tokio::test]
async fn clear_mood_winner_and_tag_order() {
    let (base, _ctx) = start_test_server_with_clock(fixed_now()).await;
    let token = register_user(&base, "sunny").await;

    create_dream(&base, &token, "one", Some("happy"), &["flying", "water"], false).await;
    create_dream(&base, &token, "two", Some("happy"), &["water"], true).await;

    let report = get_json(&base, &token, "/analytics").await;
    assert_eq!(report["mostCommonMood"], "happy");
    assert_eq!(
        report["topTags"],
        json!([
            { "tag": "water", "count": 2 },
            { "tag": "flying", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn report_never_leaks_other_users_entries() {
    let (base, _ctx) = start_test_server_with_clock(fixed_now()).await;
    let quiet = register_user(&base, "quiet").await;
    let noisy = register_user(&base, "noisy").await;

    create_dream(&base, &noisy, "loud", Some("excited"), &["party"], true).await;

    let report = get_json(&base, &quiet, "/analytics").await;
    assert_eq!(report["totalDreams"], 0);
    assert_eq!(report["topTags"], json!([]));

    let report: Value = get_json(&base, &noisy, "/analytics").await;
    assert_eq!(report["totalDreams"], 1);
    assert_eq!(report["mostCommonMood"], "excited");
}
