//! Row store for players and matches.
//!
//! The ledger only talks to storage through [`PlayerStore`]. Each call is an
//! independent round trip; no multi-row transaction is exposed, so callers
//! sequencing several writes must tolerate a failure between them.

use crate::db::Db;
use crate::error::StoreError;
use crate::models::matches::{Match, MatchDraft, MatchSummary};
use crate::models::player::{Player, PlayerDraft, PlayerUpdate, INITIAL_RATING};
use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

pub trait PlayerStore {
    fn find_active_by_nickname(&self, nickname: &str) -> Result<Option<Player>, StoreError>;

    /// Fetches every active player whose nickname is in `nicknames`, in one round trip.
    fn find_active_by_nicknames(&self, nicknames: &[&str]) -> Result<Vec<Player>, StoreError>;

    fn find_player_by_id(&self, id: &str) -> Result<Option<Player>, StoreError>;

    /// Assigns the identifier and all defaults (rating, counters, flags).
    fn insert_player(&self, draft: PlayerDraft) -> Result<Player, StoreError>;

    /// Applies `changes` to one row and returns it, or `None` for an unknown id.
    fn update_player(&self, id: &str, changes: &PlayerUpdate)
        -> Result<Option<Player>, StoreError>;

    fn insert_match(&self, draft: MatchDraft) -> Result<Match, StoreError>;

    fn find_match_by_id(&self, id: &str) -> Result<Option<Match>, StoreError>;

    /// Most recent first.
    fn list_recent_matches(&self, limit: i64) -> Result<Vec<MatchSummary>, StoreError>;

    /// Active players, highest rating first.
    fn list_active_players(&self) -> Result<Vec<Player>, StoreError>;

    /// Active players awaiting verification, oldest registration first.
    fn list_unverified_players(&self) -> Result<Vec<Player>, StoreError>;

    fn count_active_players(&self) -> Result<i64, StoreError>;
}

const PLAYER_COLUMNS: &str = "id, nickname, contact, avatar_url, rating, total_matches, wins, \
     losses, current_streak, best_streak, verified, active, last_match_at, created_at";

const MATCH_COLUMNS: &str = "m.id, m.winner_id, m.loser_id, m.winner_rating_before, \
     m.loser_rating_before, m.winner_rating_after, m.loser_rating_after, m.rating_change, \
     m.score, m.match_time, m.confirmed_by_admin, m.notes";

const MATCH_COLUMN_COUNT: usize = 12;

fn player_from_row(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        nickname: row.get(1)?,
        contact: row.get(2)?,
        avatar_url: row.get(3)?,
        rating: row.get(4)?,
        total_matches: row.get(5)?,
        wins: row.get(6)?,
        losses: row.get(7)?,
        current_streak: row.get(8)?,
        best_streak: row.get(9)?,
        verified: row.get::<_, i64>(10)? != 0,
        active: row.get::<_, i64>(11)? != 0,
        last_match_at: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn match_from_row(row: &Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        winner_id: row.get(1)?,
        loser_id: row.get(2)?,
        winner_rating_before: row.get(3)?,
        loser_rating_before: row.get(4)?,
        winner_rating_after: row.get(5)?,
        loser_rating_after: row.get(6)?,
        rating_change: row.get(7)?,
        score: row.get(8)?,
        match_time: row.get(9)?,
        confirmed_by_admin: row.get::<_, i64>(10)? != 0,
        notes: row.get(11)?,
    })
}

fn query_players(
    db: &Db,
    sql: &str,
    args: &[&dyn ToSql],
) -> Result<Vec<Player>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, player_from_row)?;
        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    })
}

impl PlayerStore for Db {
    fn find_active_by_nickname(&self, nickname: &str) -> Result<Option<Player>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE nickname = ?1 AND active = 1"),
                params![nickname],
                player_from_row,
            )
            .optional()
        })
    }

    fn find_active_by_nicknames(&self, nicknames: &[&str]) -> Result<Vec<Player>, StoreError> {
        if nicknames.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=nicknames.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE active = 1 AND nickname IN ({})",
            placeholders.join(", ")
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(nicknames.iter()), player_from_row)?;
            let mut players = Vec::new();
            for row in rows {
                players.push(row?);
            }
            Ok(players)
        })
    }

    fn find_player_by_id(&self, id: &str) -> Result<Option<Player>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
                params![id],
                player_from_row,
            )
            .optional()
        })
    }

    fn insert_player(&self, draft: PlayerDraft) -> Result<Player, StoreError> {
        let player = Player {
            id: Uuid::new_v4().to_string(),
            nickname: draft.nickname,
            contact: draft.contact,
            avatar_url: draft.avatar_url,
            rating: INITIAL_RATING,
            total_matches: 0,
            wins: 0,
            losses: 0,
            current_streak: 0,
            best_streak: 0,
            verified: false,
            active: true,
            last_match_at: None,
            created_at: Utc::now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO players (id, nickname, contact, avatar_url, rating, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    player.id,
                    player.nickname,
                    player.contact,
                    player.avatar_url,
                    player.rating,
                    player.created_at,
                ],
            )
        })?;
        Ok(player)
    }

    fn update_player(
        &self,
        id: &str,
        changes: &PlayerUpdate,
    ) -> Result<Option<Player>, StoreError> {
        if changes.is_empty() {
            return self.find_player_by_id(id);
        }

        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        let mut set = |column: &'static str, value: Box<dyn ToSql>| {
            columns.push(column);
            values.push(value);
        };
        if let Some(v) = changes.rating {
            set("rating", Box::new(v));
        }
        if let Some(v) = changes.total_matches {
            set("total_matches", Box::new(v));
        }
        if let Some(v) = changes.wins {
            set("wins", Box::new(v));
        }
        if let Some(v) = changes.losses {
            set("losses", Box::new(v));
        }
        if let Some(v) = changes.current_streak {
            set("current_streak", Box::new(v));
        }
        if let Some(v) = changes.best_streak {
            set("best_streak", Box::new(v));
        }
        if let Some(v) = changes.verified {
            set("verified", Box::new(v as i64));
        }
        if let Some(v) = changes.active {
            set("active", Box::new(v as i64));
        }
        if let Some(v) = changes.last_match_at {
            set("last_match_at", Box::new(v));
        }

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE players SET {} WHERE id = ?{} RETURNING {PLAYER_COLUMNS}",
            assignments.join(", "),
            columns.len() + 1
        );
        values.push(Box::new(id.to_string()));

        self.with_conn(|conn| {
            let args: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.query_row(&sql, args.as_slice(), player_from_row)
                .optional()
        })
    }

    fn insert_match(&self, draft: MatchDraft) -> Result<Match, StoreError> {
        let record = Match {
            id: Uuid::new_v4().to_string(),
            winner_id: draft.winner_id,
            loser_id: draft.loser_id,
            winner_rating_before: draft.winner_rating_before,
            loser_rating_before: draft.loser_rating_before,
            winner_rating_after: draft.winner_rating_after,
            loser_rating_after: draft.loser_rating_after,
            rating_change: draft.rating_change,
            score: draft.score,
            match_time: draft.match_time,
            confirmed_by_admin: draft.confirmed_by_admin,
            notes: draft.notes,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO matches (id, winner_id, loser_id, winner_rating_before,
                 loser_rating_before, winner_rating_after, loser_rating_after, rating_change,
                 score, match_time, confirmed_by_admin, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    record.id,
                    record.winner_id,
                    record.loser_id,
                    record.winner_rating_before,
                    record.loser_rating_before,
                    record.winner_rating_after,
                    record.loser_rating_after,
                    record.rating_change,
                    record.score,
                    record.match_time,
                    record.confirmed_by_admin as i64,
                    record.notes,
                ],
            )
        })?;
        Ok(record)
    }

    fn find_match_by_id(&self, id: &str) -> Result<Option<Match>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MATCH_COLUMNS} FROM matches m WHERE m.id = ?1"),
                params![id],
                match_from_row,
            )
            .optional()
        })
    }

    fn list_recent_matches(&self, limit: i64) -> Result<Vec<MatchSummary>, StoreError> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS}, w.nickname, w.avatar_url, l.nickname, l.avatar_url
             FROM matches m
             JOIN players w ON w.id = m.winner_id
             JOIN players l ON l.id = m.loser_id
             ORDER BY m.match_time DESC, m.rowid DESC
             LIMIT ?1"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![limit], |row| {
                let n = MATCH_COLUMN_COUNT;
                Ok(MatchSummary {
                    record: match_from_row(row)?,
                    winner_nickname: row.get(n)?,
                    winner_avatar_url: row.get(n + 1)?,
                    loser_nickname: row.get(n + 2)?,
                    loser_avatar_url: row.get(n + 3)?,
                })
            })?;
            let mut summaries = Vec::new();
            for row in rows {
                summaries.push(row?);
            }
            Ok(summaries)
        })
    }

    fn list_active_players(&self) -> Result<Vec<Player>, StoreError> {
        query_players(
            self,
            &format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE active = 1
                 ORDER BY rating DESC, nickname ASC"
            ),
            &[],
        )
    }

    fn list_unverified_players(&self) -> Result<Vec<Player>, StoreError> {
        query_players(
            self,
            &format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE active = 1 AND verified = 0
                 ORDER BY created_at ASC, rowid ASC"
            ),
            &[],
        )
    }

    fn count_active_players(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM players WHERE active = 1",
                [],
                |row| row.get(0),
            )
        })
    }
}
