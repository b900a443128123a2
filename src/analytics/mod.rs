//! Analytics aggregation engine.
//!
//! Scans one user's dreams and produces counts, distributions, and a fixed
//! 14-day activity series. "Now" comes from the injected [`Clock`] so the
//! whole report is deterministic under test. With zero dreams the report is
//! still fully populated (zero counts, empty lists, 14 zero days) — a partial
//! report is never produced: any query failure fails the whole request.

pub mod model;
pub mod storage;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::clock::Clock;
use model::{AnalyticsReport, DailyCount, MoodCount, TagCount};
use storage::AnalyticsStorage;

/// Length of the trailing activity window, in days (today inclusive).
pub const ACTIVITY_WINDOW_DAYS: i64 = 14;

/// Compute the full analytics report for `user_id`.
pub async fn build_report(
    analytics: &AnalyticsStorage,
    clock: &dyn Clock,
    user_id: &str,
) -> Result<AnalyticsReport> {
    let now = clock.now();
    let today = clock.today();

    let total_dreams = analytics.total_dreams(user_id).await?;

    let month = now.format("%Y-%m").to_string();
    let this_month = analytics.dreams_in_month(user_id, &month).await?;

    // Mood groups arrive pre-ordered (count DESC, mood ASC, NULL first);
    // the top group is the most common mood.
    let mood_rows = analytics.mood_counts(user_id).await?;
    let most_common_mood = mood_rows.first().and_then(|(mood, _)| mood.clone());
    let mood_distribution = mood_rows
        .into_iter()
        .map(|(mood, count)| MoodCount {
            mood,
            count: count as u64,
        })
        .collect();

    // Flatten tags across all dreams in first-seen order.
    let tag_lists = analytics
        .tag_columns(user_id)
        .await?
        .into_iter()
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw).unwrap_or_default());
    let top_tags = count_tags(tag_lists);

    let window_start = today - Duration::days(ACTIVITY_WINDOW_DAYS - 1);
    let day_rows = analytics
        .daily_counts(user_id, &window_start.format("%Y-%m-%d").to_string())
        .await?;
    let recent_activity = fill_activity_window(window_start, today, &day_rows);

    Ok(AnalyticsReport {
        total_dreams,
        this_month,
        most_common_mood,
        top_tags,
        mood_distribution,
        recent_activity,
    })
}

/// Count tag occurrences across dream tag lists.
///
/// Uses an insertion-ordered structure (vec + index map) so that the stable
/// sort by descending count keeps first-seen order for equal counts.
pub fn count_tags(tag_lists: impl Iterator<Item = Vec<String>>) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tags in tag_lists {
        for tag in tags {
            match index.get(&tag) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag.clone(), counts.len());
                    counts.push(TagCount { tag, count: 1 });
                }
            }
        }
    }

    // sort_by_key is stable: equal counts keep insertion (first-seen) order.
    counts.sort_by_key(|t| std::cmp::Reverse(t.count));
    counts
}

/// Expand sparse `(day, count)` rows into a contiguous window of
/// `[start, end]` inclusive, zero-filling missing days.
pub fn fill_activity_window(
    start: NaiveDate,
    end: NaiveDate,
    day_rows: &[(String, i64)],
) -> Vec<DailyCount> {
    let by_day: HashMap<&str, i64> = day_rows
        .iter()
        .map(|(day, count)| (day.as_str(), *count))
        .collect();

    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        let key = day.format("%Y-%m-%d").to_string();
        let count = by_day.get(key.as_str()).copied().unwrap_or(0).max(0) as u64;
        out.push(DailyCount { date: key, count });
        day += Duration::days(1);
    }
    out
}
