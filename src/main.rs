mod config;
mod db;
mod error;
mod handlers;
mod locks;
mod models;
mod services;
mod state;
mod store;
mod validation;

use config::Settings;
use db::Db;
use error::AppError;
use ntex::web;
use ntex_cors::Cors;
use state::AppState;
use std::sync::Arc;
use store::PlayerStore;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env();
    let db = Db::open(&settings.database_path).map_err(|e| {
        log::error!("Failed to open database {}: {}", settings.database_path, e);
        std::io::Error::other(e.to_string())
    })?;
    let bind = (settings.host.clone(), settings.port);
    let state = Arc::new(AppState::new(db, settings));

    log::info!(
        "BOX 1V1 server starting on {}:{} (K-factor {})",
        bind.0,
        bind.1,
        state.recorder.k_factor()
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(web::middleware::Logger::default())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", "If-None-Match"])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/api/health", web::get().to(health))
        // Roster
        .service(
            web::resource("/api/players")
                .route(web::get().to(handlers::players::get_leaderboard))
                .route(web::post().to(handlers::players::register_player)),
        )
        .route("/api/players/{nickname}", web::get().to(handlers::players::get_player))
        .route("/api/players/{id}/verify", web::post().to(handlers::players::verify_player))
        .route("/api/players/{id}/deactivate", web::post().to(handlers::players::deactivate_player))
        // Verification queue, kept off the nickname namespace
        .route("/api/admin/unverified", web::get().to(handlers::players::get_unverified))
        // Match ledger
        .service(
            web::resource("/api/matches")
                .route(web::get().to(handlers::matches::get_recent_matches))
                .route(web::post().to(handlers::matches::record_match)),
        )
        .route("/api/matches/{id}/reconcile", web::post().to(handlers::matches::reconcile_match))
        // Link previews
        .route("/p/{nickname}", web::get().to(handlers::preview::player_preview));
}

async fn health(state: web::types::State<Arc<AppState>>) -> Result<web::HttpResponse, AppError> {
    let players = state.db.count_active_players()?;
    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "players": players,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::matches::*;
    use crate::models::player::*;
    use crate::services::matches::{recent_matches, MatchRecorder};
    use crate::services::players;
    use ntex::http::{header, StatusCode};
    use ntex::web::test;

    fn register(db: &Db, nickname: &str) -> Player {
        players::register(
            db,
            RegisterRequest {
                nickname: nickname.into(),
                contact: None,
                avatar_url: None,
            },
        )
        .unwrap()
        .player
    }

    fn play(recorder: &MatchRecorder, store: &dyn PlayerStore, winner: &str, loser: &str, score: &str)
        -> Result<MatchRecord, AppError>
    {
        recorder.record_match(
            store,
            RecordMatchRequest {
                winner: winner.into(),
                loser: loser.into(),
                score: score.into(),
            },
        )
    }

    fn profile(db: &Db, nickname: &str) -> Player {
        players::player_profile(db, nickname).unwrap()
    }

    fn match_count(db: &Db) -> i64 {
        db.with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0)))
            .unwrap()
    }

    /// Delegates to a real store but fails player updates for one id.
    struct FailingStore<'a> {
        inner: &'a Db,
        fail_updates_for: String,
    }

    impl<'a> FailingStore<'a> {
        fn new(inner: &'a Db, player_id: &str) -> Self {
            FailingStore {
                inner,
                fail_updates_for: player_id.to_string(),
            }
        }
    }

    impl PlayerStore for FailingStore<'_> {
        fn find_active_by_nickname(&self, nickname: &str) -> Result<Option<Player>, StoreError> {
            self.inner.find_active_by_nickname(nickname)
        }
        fn find_active_by_nicknames(&self, nicknames: &[&str]) -> Result<Vec<Player>, StoreError> {
            self.inner.find_active_by_nicknames(nicknames)
        }
        fn find_player_by_id(&self, id: &str) -> Result<Option<Player>, StoreError> {
            self.inner.find_player_by_id(id)
        }
        fn insert_player(&self, draft: PlayerDraft) -> Result<Player, StoreError> {
            self.inner.insert_player(draft)
        }
        fn update_player(
            &self,
            id: &str,
            changes: &PlayerUpdate,
        ) -> Result<Option<Player>, StoreError> {
            if self.fail_updates_for == id {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.update_player(id, changes)
        }
        fn insert_match(&self, draft: MatchDraft) -> Result<Match, StoreError> {
            self.inner.insert_match(draft)
        }
        fn find_match_by_id(&self, id: &str) -> Result<Option<Match>, StoreError> {
            self.inner.find_match_by_id(id)
        }
        fn list_recent_matches(&self, limit: i64) -> Result<Vec<MatchSummary>, StoreError> {
            self.inner.list_recent_matches(limit)
        }
        fn list_active_players(&self) -> Result<Vec<Player>, StoreError> {
            self.inner.list_active_players()
        }
        fn list_unverified_players(&self) -> Result<Vec<Player>, StoreError> {
            self.inner.list_unverified_players()
        }
        fn count_active_players(&self) -> Result<i64, StoreError> {
            self.inner.count_active_players()
        }
    }

    #[test]
    fn test_db_open_in_memory() {
        let db = Db::open_in_memory().expect("Failed to open in-memory DB");
        db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('players', 'matches')",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_register_applies_defaults() {
        let db = Db::open_in_memory().unwrap();
        let result = players::register(
            &db,
            RegisterRequest {
                nickname: "  Nova ".into(),
                contact: Some(" @nova ".into()),
                avatar_url: Some("https://img.example/nova.png".into()),
            },
        )
        .unwrap();

        let player = result.player;
        assert_eq!(player.nickname, "Nova");
        assert_eq!(player.contact.as_deref(), Some("@nova"));
        assert_eq!(player.rating, INITIAL_RATING);
        assert_eq!(player.total_matches, 0);
        assert_eq!(player.best_streak, 0);
        assert!(!player.verified);
        assert!(player.active);
        assert!(result.message.contains("Awaiting"));
        assert_eq!(profile(&db, "Nova"), player);
    }

    #[test]
    fn test_duplicate_nickname_rejected() {
        let db = Db::open_in_memory().unwrap();
        register(&db, "Nova");

        let err = players::register(
            &db,
            RegisterRequest {
                nickname: "Nova".into(),
                contact: None,
                avatar_url: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "DuplicateNickname");

        let novas = db.find_active_by_nicknames(&["Nova"]).unwrap();
        assert_eq!(novas.len(), 1);

        // Nicknames are case-sensitive.
        register(&db, "nova");
    }

    #[test]
    fn test_unique_index_backs_up_lookup() {
        let db = Db::open_in_memory().unwrap();
        register(&db, "Nova");
        let err = db
            .insert_player(PlayerDraft {
                nickname: "Nova".into(),
                contact: None,
                avatar_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let db = Db::open_in_memory().unwrap();
        for (nickname, avatar) in [
            ("   ", None),
            ("A".repeat(33).as_str(), None),
            ("Nova", Some("ftp://img.example/nova.png")),
            ("Nova", Some("not a url")),
        ]
        .map(|(n, a)| (n.to_string(), a))
        {
            let err = players::register(
                &db,
                RegisterRequest {
                    nickname,
                    contact: None,
                    avatar_url: avatar.map(String::from),
                },
            )
            .unwrap_err();
            assert_eq!(err.kind(), "InvalidInput");
        }
        assert_eq!(db.count_active_players().unwrap(), 0);
    }

    #[test]
    fn test_deactivated_player_leaves_listings() {
        let db = Db::open_in_memory().unwrap();
        let nova = register(&db, "Nova");
        register(&db, "Orbit");

        let deactivated = players::deactivate_player(&db, &nova.id).unwrap();
        assert!(!deactivated.active);

        let board = players::leaderboard(&db).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].nickname, "Orbit");
        assert_eq!(players::player_profile(&db, "Nova").unwrap_err().kind(), "PlayerNotFound");

        // The nickname is free again; the old row is kept.
        let reborn = register(&db, "Nova");
        assert_ne!(reborn.id, nova.id);
        assert!(db.find_player_by_id(&nova.id).unwrap().is_some());
    }

    #[test]
    fn test_verification_queue() {
        let db = Db::open_in_memory().unwrap();
        let nova = register(&db, "Nova");
        let orbit = register(&db, "Orbit");

        let queue = players::unverified_players(&db).unwrap();
        assert_eq!(
            queue.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec![nova.id.as_str(), orbit.id.as_str()]
        );

        let verified = players::verify_player(&db, &nova.id).unwrap();
        assert!(verified.verified);
        assert_eq!(verified.rating, INITIAL_RATING);

        let queue = players::unverified_players(&db).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].nickname, "Orbit");

        let err = players::verify_player(&db, "no-such-id").unwrap_err();
        assert_eq!(err.kind(), "PlayerNotFound");
    }

    #[test]
    fn test_record_match_between_equals() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        register(&db, "B");

        let result = play(&recorder, &db, "A", "B", "2-1").unwrap();
        assert_eq!(result.record.rating_change, 16);
        assert_eq!(result.record.winner_rating_before, 1500);
        assert_eq!(result.record.winner_rating_after, 1516);
        assert_eq!(result.record.loser_rating_after, 1484);
        assert_eq!(result.record.score, "2-1");
        assert!(result.record.confirmed_by_admin);
        assert_eq!(result.message, "Match saved! A beat B");

        let a = profile(&db, "A");
        let b = profile(&db, "B");
        assert_eq!((a.rating, a.wins, a.losses, a.total_matches), (1516, 1, 0, 1));
        assert_eq!((b.rating, b.wins, b.losses, b.total_matches), (1484, 0, 1, 1));
        assert_eq!((a.current_streak, a.best_streak), (1, 1));
        assert_eq!(b.current_streak, 0);
        assert_eq!(a.last_match_at, Some(result.record.match_time));
        assert_eq!(b.last_match_at, Some(result.record.match_time));
        assert_eq!(result.winner, a);
        assert_eq!(result.loser, b);
        assert_eq!(match_count(&db), 1);
    }

    #[test]
    fn test_rematch_underdog_win() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        register(&db, "B");

        play(&recorder, &db, "A", "B", "2-1").unwrap();
        let rematch = play(&recorder, &db, "B", "A", "3-2").unwrap();
        assert_eq!(rematch.record.winner_rating_before, 1484);
        assert_eq!(rematch.record.loser_rating_before, 1516);
        assert_eq!(rematch.record.rating_change, 17);

        let a = profile(&db, "A");
        let b = profile(&db, "B");
        assert_eq!(b.rating, 1501);
        assert_eq!(a.rating, 1499);
        assert_eq!(b.current_streak, 1);
        assert_eq!(a.current_streak, 0);
        assert_eq!(a.best_streak, 1);
        assert_eq!(a.total_matches, a.wins + a.losses);
        assert_eq!(b.total_matches, b.wins + b.losses);

        let feed = recent_matches(&db, None).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].record.id, rematch.record.id);
        assert_eq!(feed[0].winner_nickname, "B");
        assert_eq!(feed[0].loser_nickname, "A");
    }

    #[test]
    fn test_unknown_player_writes_nothing() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        let a = register(&db, "A");

        let err = play(&recorder, &db, "Ghost", "A", "1-0").unwrap_err();
        assert_eq!(err.kind(), "PlayerNotFound");
        assert!(err.to_string().contains("Ghost"));
        assert_eq!(match_count(&db), 0);
        assert_eq!(profile(&db, "A"), a);
    }

    #[test]
    fn test_inactive_player_cannot_play() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        let b = register(&db, "B");
        players::deactivate_player(&db, &b.id).unwrap();

        let err = play(&recorder, &db, "A", "B", "1-0").unwrap_err();
        assert_eq!(err.kind(), "PlayerNotFound");
        assert_eq!(match_count(&db), 0);
    }

    #[test]
    fn test_self_match_rejected() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");

        let err = play(&recorder, &db, "A", " A ", "5-0").unwrap_err();
        assert_eq!(err.kind(), "SelfMatch");
        assert_eq!(match_count(&db), 0);
    }

    #[test]
    fn test_streaks_over_a_season() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        register(&db, "B");

        let results = [true, true, true, false, true, false, false, true, true];
        let mut expected_streak = 0;
        let mut expected_best = 0;
        for (i, a_wins) in results.iter().enumerate() {
            let score = format!("game {}", i + 1);
            if *a_wins {
                play(&recorder, &db, "A", "B", &score).unwrap();
                expected_streak += 1;
            } else {
                play(&recorder, &db, "B", "A", &score).unwrap();
                expected_streak = 0;
            }
            expected_best = expected_best.max(expected_streak);

            let a = profile(&db, "A");
            let b = profile(&db, "B");
            assert_eq!(a.current_streak, expected_streak);
            assert_eq!(a.best_streak, expected_best);
            for p in [&a, &b] {
                assert!(p.best_streak >= p.current_streak);
                assert_eq!(p.total_matches, p.wins + p.losses);
            }
            // Pairwise exchange keeps the pair's total constant.
            assert_eq!(a.rating + b.rating, 2 * INITIAL_RATING);
        }
        assert_eq!(profile(&db, "A").best_streak, 3);
        assert_eq!(match_count(&db), results.len() as i64);
    }

    #[test]
    fn test_loser_update_failure_is_reconciled() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        let b = register(&db, "B");

        let flaky = FailingStore::new(&db, &b.id);
        let err = play(&recorder, &flaky, "A", "B", "2-1").unwrap_err();
        assert_eq!(err.kind(), "StoreUnavailable");

        // The match row and the winner's update landed; the loser's did not.
        let feed = recent_matches(&db, Some(1)).unwrap();
        assert_eq!(feed.len(), 1);
        let record = feed[0].record.clone();
        assert!(err.to_string().contains(&record.id));
        assert_eq!(profile(&db, "A").rating, 1516);
        assert_eq!(profile(&db, "B").rating, 1500);

        let outcome = recorder.reconcile_match(&db, &record.id).unwrap();
        assert!(!outcome.winner_applied);
        assert!(outcome.loser_applied);

        let a = profile(&db, "A");
        let b = profile(&db, "B");
        assert_eq!((a.rating, a.wins, a.total_matches), (1516, 1, 1));
        assert_eq!((b.rating, b.losses, b.total_matches), (1484, 1, 1));
        assert_eq!(b.last_match_at, Some(record.match_time));

        let again = recorder.reconcile_match(&db, &record.id).unwrap();
        assert!(!again.winner_applied && !again.loser_applied);
        assert_eq!(profile(&db, "B"), b);
    }

    #[test]
    fn test_winner_update_failure_skips_loser() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        let a = register(&db, "A");
        register(&db, "B");

        let flaky = FailingStore::new(&db, &a.id);
        let err = play(&recorder, &flaky, "A", "B", "2-1").unwrap_err();
        assert_eq!(err.kind(), "StoreUnavailable");
        assert_eq!(match_count(&db), 1);
        assert_eq!(profile(&db, "A").total_matches, 0);
        assert_eq!(profile(&db, "B").total_matches, 0);

        let record = recent_matches(&db, None).unwrap().remove(0).record;
        let outcome = recorder.reconcile_match(&db, &record.id).unwrap();
        assert!(outcome.winner_applied && outcome.loser_applied);
        assert_eq!(profile(&db, "A").rating, record.winner_rating_after);
        assert_eq!(profile(&db, "B").rating, record.loser_rating_after);
    }

    #[test]
    fn test_reconcile_refuses_stale_match() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        let a = register(&db, "A");
        register(&db, "B");
        register(&db, "C");

        let flaky = FailingStore::new(&db, &a.id);
        play(&recorder, &flaky, "A", "B", "2-1").unwrap_err();
        let stuck = recent_matches(&db, None).unwrap().remove(0).record;

        // A plays on before anyone repairs the first match.
        play(&recorder, &db, "A", "C", "1-0").unwrap();
        let before = profile(&db, "B");

        let err = recorder.reconcile_match(&db, &stuck.id).unwrap_err();
        assert_eq!(err.kind(), "StaleMatch");
        assert_eq!(profile(&db, "B"), before);

        let err = recorder.reconcile_match(&db, "no-such-match").unwrap_err();
        assert_eq!(err.kind(), "MatchNotFound");
    }

    #[test]
    fn test_concurrent_matches_compound() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let recorder = Arc::new(MatchRecorder::new(32));
        register(&db, "Hub");
        let opponents: Vec<String> = (0..8).map(|i| format!("P{}", i)).collect();
        for name in &opponents {
            register(&db, name);
        }

        let handles: Vec<_> = opponents
            .iter()
            .cloned()
            .map(|name| {
                let db = db.clone();
                let recorder = recorder.clone();
                std::thread::spawn(move || {
                    play(&recorder, db.as_ref(), "Hub", &name, "1-0").unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let hub = profile(&db, "Hub");
        assert_eq!(hub.wins, 8);
        assert_eq!(hub.current_streak, 8);

        // Each match started from the rating the previous one left behind.
        let gained: i64 = recent_matches(db.as_ref(), Some(100))
            .unwrap()
            .iter()
            .map(|m| m.record.rating_change)
            .sum();
        assert_eq!(hub.rating, INITIAL_RATING + gained);
    }

    #[test]
    fn test_recent_matches_limit_clamped() {
        let db = Db::open_in_memory().unwrap();
        let recorder = MatchRecorder::new(32);
        register(&db, "A");
        register(&db, "B");
        for i in 0..12 {
            play(&recorder, &db, "A", "B", &format!("{}-0", i)).unwrap();
        }
        assert_eq!(recent_matches(&db, None).unwrap().len(), 10);
        assert_eq!(recent_matches(&db, Some(0)).unwrap().len(), 1);
        assert_eq!(recent_matches(&db, Some(500)).unwrap().len(), 12);
        assert_eq!(recent_matches(&db, Some(3)).unwrap()[0].record.score, "11-0");
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Db::open_in_memory().unwrap(), Settings::default()))
    }

    #[ntex::test]
    async fn test_http_register_and_record() {
        let state = test_state();
        let app = test::init_service(web::App::new().state(state.clone()).configure(routes)).await;

        for nickname in ["A", "B"] {
            let req = test::TestRequest::post()
                .uri("/api/players")
                .set_json(&serde_json::json!({ "nickname": nickname }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/api/players")
            .set_json(&serde_json::json!({ "nickname": "A" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["error"], "DuplicateNickname");

        let req = test::TestRequest::post()
            .uri("/api/matches")
            .set_json(&serde_json::json!({ "winner": "A", "loser": "B", "score": "2-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["match"]["ratingChange"], 16);
        assert_eq!(body["winner"]["rating"], 1516);
        assert_eq!(body["loser"]["currentStreak"], 0);

        let req = test::TestRequest::post()
            .uri("/api/matches")
            .set_json(&serde_json::json!({ "winner": "Ghost", "loser": "A", "score": "1-0" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["error"], "PlayerNotFound");

        let req = test::TestRequest::get().uri("/api/matches?limit=5").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["winnerNickname"], "A");
    }

    #[ntex::test]
    async fn test_http_leaderboard_etag() {
        let state = test_state();
        register(&state.db, "A");
        let app = test::init_service(web::App::new().state(state.clone()).configure(routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/players").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let etag = resp
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/players")
            .header(header::IF_NONE_MATCH, etag.as_str())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

        let listed = format!("\"stale\", W/{}", etag);
        let req = test::TestRequest::get()
            .uri("/api/players")
            .header(header::IF_NONE_MATCH, listed.as_str())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

        register(&state.db, "B");
        let req = test::TestRequest::get()
            .uri("/api/players")
            .header(header::IF_NONE_MATCH, etag.as_str())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_http_profile_named_like_admin_route() {
        let state = test_state();
        register(&state.db, "unverified");
        register(&state.db, "Nova");
        let app = test::init_service(web::App::new().state(state.clone()).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/players/unverified").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["nickname"], "unverified");

        let req = test::TestRequest::get().uri("/api/admin/unverified").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[ntex::test]
    async fn test_http_preview_and_health() {
        let state = test_state();
        register(&state.db, "Nova");
        let app = test::init_service(web::App::new().state(state.clone()).configure(routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/p/Nova").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("Nova [ELO 1500]"));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/p/Ghost").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/box1v1/")
        );

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["players"], 1);
    }
}
