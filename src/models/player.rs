use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_RATING: i64 = 1500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub nickname: String,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: i64,
    pub total_matches: i64,
    pub wins: i64,
    pub losses: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub verified: bool,
    pub active: bool,
    pub last_match_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Aggregate changes for a won match ending on `rating`.
    pub fn win_update(&self, rating: i64, at: DateTime<Utc>) -> PlayerUpdate {
        let streak = self.current_streak + 1;
        PlayerUpdate {
            rating: Some(rating),
            total_matches: Some(self.total_matches + 1),
            wins: Some(self.wins + 1),
            current_streak: Some(streak),
            best_streak: Some(self.best_streak.max(streak)),
            last_match_at: Some(at),
            ..Default::default()
        }
    }

    /// Aggregate changes for a lost match ending on `rating`.
    pub fn loss_update(&self, rating: i64, at: DateTime<Utc>) -> PlayerUpdate {
        PlayerUpdate {
            rating: Some(rating),
            total_matches: Some(self.total_matches + 1),
            losses: Some(self.losses + 1),
            current_streak: Some(0),
            last_match_at: Some(at),
            ..Default::default()
        }
    }
}

/// Fields supplied at registration; everything else takes its default.
#[derive(Debug, Clone)]
pub struct PlayerDraft {
    pub nickname: String,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial update of a player row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerUpdate {
    pub rating: Option<i64>,
    pub total_matches: Option<i64>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub current_streak: Option<i64>,
    pub best_streak: Option<i64>,
    pub verified: Option<bool>,
    pub active: Option<bool>,
    pub last_match_at: Option<DateTime<Utc>>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PlayerUpdate::default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub nickname: String,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResult {
    pub player: Player,
    pub message: String,
}
