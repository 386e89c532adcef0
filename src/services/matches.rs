use crate::error::AppError;
use crate::locks::PlayerLocks;
use crate::models::matches::*;
use crate::models::player::{Player, PlayerUpdate};
use crate::services::rating;
use crate::store::PlayerStore;
use crate::validation;
use chrono::Utc;

const MATCH_NOTES: &str = "Tournament match";

/// Records confirmed results and keeps both players' aggregates in step
/// with the match ledger.
///
/// The store offers no multi-row transaction, so a recording is three
/// independent writes: the match row, then the winner, then the loser.
/// Recordings that share a player are serialized through per-player locks,
/// taken only once both nicknames resolve, so their rating changes compound
/// instead of overwriting each other.
pub struct MatchRecorder {
    k_factor: u32,
    locks: PlayerLocks,
}

impl MatchRecorder {
    pub fn new(k_factor: u32) -> Self {
        MatchRecorder {
            k_factor,
            locks: PlayerLocks::new(),
        }
    }

    pub fn k_factor(&self) -> u32 {
        self.k_factor
    }

    pub fn record_match<S: PlayerStore + ?Sized>(
        &self,
        store: &S,
        req: RecordMatchRequest,
    ) -> Result<MatchRecord, AppError> {
        let winner_nickname = validation::validate_nickname(&req.winner)?;
        let loser_nickname = validation::validate_nickname(&req.loser)?;
        let score = validation::validate_score(&req.score)?;

        let (winner, loser) = resolve_pair(store, &winner_nickname, &loser_nickname)?;

        self.locks
            .run_exclusive(&[winner.id.as_str(), loser.id.as_str()], || {
                // Re-read under the lock; another recording may have moved the ratings.
                let winner = load_active(store, &winner)?;
                let loser = load_active(store, &loser)?;
                self.record_locked(store, winner, loser, score)
            })
    }

    fn record_locked<S: PlayerStore + ?Sized>(
        &self,
        store: &S,
        winner: Player,
        loser: Player,
        score: String,
    ) -> Result<MatchRecord, AppError> {
        let update = rating::compute_update(winner.rating, loser.rating, self.k_factor);
        let now = Utc::now();

        let record = store.insert_match(MatchDraft {
            winner_id: winner.id.clone(),
            loser_id: loser.id.clone(),
            winner_rating_before: winner.rating,
            loser_rating_before: loser.rating,
            winner_rating_after: update.winner_new_rating,
            loser_rating_after: update.loser_new_rating,
            rating_change: update.rating_change,
            score,
            match_time: now,
            confirmed_by_admin: true,
            notes: Some(MATCH_NOTES.into()),
        })?;

        let winner_changes = winner.win_update(update.winner_new_rating, now);
        let winner = apply_stats(store, &record, &winner, &winner_changes)?;
        let loser_changes = loser.loss_update(update.loser_new_rating, now);
        let loser = apply_stats(store, &record, &loser, &loser_changes)?;

        log::info!(
            "Match {}: {} ({} -> {}) beat {} ({} -> {}), score {}",
            record.id,
            winner.nickname,
            record.winner_rating_before,
            record.winner_rating_after,
            loser.nickname,
            record.loser_rating_before,
            record.loser_rating_after,
            record.score
        );

        let message = format!("Match saved! {} beat {}", winner.nickname, loser.nickname);
        Ok(MatchRecord {
            record,
            winner,
            loser,
            message,
        })
    }

    /// Finishes a match whose player updates did not all land.
    ///
    /// A side counts as applied when its `last_match_at` equals the match
    /// time. A pending side is only applied while the player's rating still
    /// equals the match's "before" snapshot. A player who has moved on to a
    /// later match makes the whole match stale, and nothing is written.
    /// Calling this again after success changes nothing.
    pub fn reconcile_match<S: PlayerStore + ?Sized>(
        &self,
        store: &S,
        match_id: &str,
    ) -> Result<ReconcileOutcome, AppError> {
        let record = store
            .find_match_by_id(match_id)?
            .ok_or_else(|| AppError::MatchNotFound(match_id.to_string()))?;

        self.locks
            .run_exclusive(&[record.winner_id.as_str(), record.loser_id.as_str()], || {
                let winner = load_participant(store, &record.winner_id)?;
                let loser = load_participant(store, &record.loser_id)?;

                let winner_pending = is_pending(&record, &winner, record.winner_rating_before)?;
                let loser_pending = is_pending(&record, &loser, record.loser_rating_before)?;

                if winner_pending {
                    let changes = winner.win_update(record.winner_rating_after, record.match_time);
                    apply_stats(store, &record, &winner, &changes)?;
                }
                if loser_pending {
                    let changes = loser.loss_update(record.loser_rating_after, record.match_time);
                    apply_stats(store, &record, &loser, &changes)?;
                }

                if winner_pending || loser_pending {
                    log::info!(
                        "Reconciled match {} (winner applied: {}, loser applied: {})",
                        record.id,
                        winner_pending,
                        loser_pending
                    );
                }
                Ok(ReconcileOutcome {
                    match_id: record.id.clone(),
                    winner_applied: winner_pending,
                    loser_applied: loser_pending,
                })
            })
    }
}

pub fn recent_matches<S: PlayerStore + ?Sized>(
    store: &S,
    limit: Option<i64>,
) -> Result<Vec<MatchSummary>, AppError> {
    Ok(store.list_recent_matches(validation::clamp_match_limit(limit))?)
}

/// Resolves both nicknames in one round trip. Nothing is written or locked
/// for a lookup that fails.
fn resolve_pair<S: PlayerStore + ?Sized>(
    store: &S,
    winner_nickname: &str,
    loser_nickname: &str,
) -> Result<(Player, Player), AppError> {
    let players = store.find_active_by_nicknames(&[winner_nickname, loser_nickname])?;
    let resolve = |nickname: &str| {
        players
            .iter()
            .find(|p| p.nickname == nickname)
            .cloned()
            .ok_or_else(|| {
                log::debug!("Match lookup failed for {}", nickname);
                AppError::PlayerNotFound(nickname.to_string())
            })
    };
    let winner = resolve(winner_nickname)?;
    let loser = resolve(loser_nickname)?;
    if winner.id == loser.id {
        return Err(AppError::SelfMatch(winner.nickname));
    }
    Ok((winner, loser))
}

fn load_active<S: PlayerStore + ?Sized>(store: &S, player: &Player) -> Result<Player, AppError> {
    store
        .find_player_by_id(&player.id)?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::PlayerNotFound(player.nickname.clone()))
}

fn load_participant<S: PlayerStore + ?Sized>(store: &S, id: &str) -> Result<Player, AppError> {
    store
        .find_player_by_id(id)?
        .ok_or_else(|| AppError::PlayerNotFound(id.to_string()))
}

fn is_pending(record: &Match, player: &Player, rating_before: i64) -> Result<bool, AppError> {
    match player.last_match_at {
        Some(at) if at == record.match_time => Ok(false),
        Some(at) if at > record.match_time => Err(AppError::StaleMatch(record.id.clone())),
        _ if player.rating != rating_before => Err(AppError::StaleMatch(record.id.clone())),
        _ => Ok(true),
    }
}

fn apply_stats<S: PlayerStore + ?Sized>(
    store: &S,
    record: &Match,
    player: &Player,
    changes: &PlayerUpdate,
) -> Result<Player, AppError> {
    let failure = match store.update_player(&player.id, changes) {
        Ok(Some(updated)) => return Ok(updated),
        Ok(None) => format!("player {} no longer exists", player.id),
        Err(e) => e.to_string(),
    };
    log::error!(
        "Match {} is recorded but stats for {} were not applied: {}",
        record.id,
        player.nickname,
        failure
    );
    Err(AppError::StoreUnavailable(format!(
        "match {} was recorded but stats for {} were not applied ({}); reconcile the match to finish it",
        record.id, player.nickname, failure
    )))
}
