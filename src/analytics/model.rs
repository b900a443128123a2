//! Analytics report types — serialized camelCase to the dashboard contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCount {
    /// `None` is the absent-mood group; serialized as JSON null.
    pub mood: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

/// The full per-user analytics report. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_dreams: u64,
    pub this_month: u64,
    pub most_common_mood: Option<String>,
    pub top_tags: Vec<TagCount>,
    pub mood_distribution: Vec<MoodCount>,
    /// Exactly 14 entries, ascending consecutive dates, last = today.
    pub recent_activity: Vec<DailyCount>,
}
