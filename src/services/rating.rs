//! Two-player Elo update.

use serde::Serialize;

pub const DEFAULT_K_FACTOR: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUpdate {
    pub winner_new_rating: i64,
    pub loser_new_rating: i64,
    pub rating_change: i64,
}

/// Expected score of `rating` against `opponent` on the logistic curve.
fn expected_score(rating: i64, opponent: i64) -> f64 {
    let exponent = (opponent - rating) as f64 / 400.0;
    1.0 / (1.0 + 10f64.powf(exponent))
}

/// Computes the rating exchange after `winner_rating` beats `loser_rating`.
///
/// The winner gains exactly what the loser gives up. The change lies in
/// `0..=k_factor`: `powf` saturates to infinity or zero for extreme gaps
/// instead of producing NaN.
pub fn compute_update(winner_rating: i64, loser_rating: i64, k_factor: u32) -> RatingUpdate {
    let expected = expected_score(winner_rating, loser_rating);
    let rating_change = (k_factor as f64 * (1.0 - expected)).round() as i64;
    RatingUpdate {
        winner_new_rating: winner_rating + rating_change,
        loser_new_rating: loser_rating - rating_change,
        rating_change,
    }
}
