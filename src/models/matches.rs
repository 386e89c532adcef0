use crate::models::player::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub winner_id: String,
    pub loser_id: String,
    pub winner_rating_before: i64,
    pub loser_rating_before: i64,
    pub winner_rating_after: i64,
    pub loser_rating_after: i64,
    pub rating_change: i64,
    pub score: String,
    pub match_time: DateTime<Utc>,
    pub confirmed_by_admin: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MatchDraft {
    pub winner_id: String,
    pub loser_id: String,
    pub winner_rating_before: i64,
    pub loser_rating_before: i64,
    pub winner_rating_after: i64,
    pub loser_rating_after: i64,
    pub rating_change: i64,
    pub score: String,
    pub match_time: DateTime<Utc>,
    pub confirmed_by_admin: bool,
    pub notes: Option<String>,
}

/// A match joined with both participants' display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    #[serde(flatten)]
    pub record: Match,
    pub winner_nickname: String,
    pub winner_avatar_url: Option<String>,
    pub loser_nickname: String,
    pub loser_avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMatchRequest {
    pub winner: String,
    pub loser: String,
    pub score: String,
}

#[derive(Debug, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "match")]
    pub record: Match,
    pub winner: Player,
    pub loser: Player,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentMatchesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub match_id: String,
    pub winner_applied: bool,
    pub loser_applied: bool,
}
