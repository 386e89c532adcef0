use crate::error::AppError;
use crate::models::player::*;
use crate::services::players as service;
use crate::state::AppState;
use ntex::http::header;
use ntex::web::{self, HttpRequest, HttpResponse};
use sha2::{Digest, Sha256};
use std::sync::Arc;

fn etag_for(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!("\"{}\"", hex)
}

/// Weak comparison per RFC 9110: `*`, or any listed tag once `W/` is stripped.
fn if_none_match_hits(header: &str, etag: &str) -> bool {
    let etag = etag.trim_start_matches("W/");
    header
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}

pub async fn get_leaderboard(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let players = service::leaderboard(&state.db)?;
    let body = serde_json::to_vec(&players).map_err(|e| AppError::Internal(e.to_string()))?;
    let etag = etag_for(&body);

    let unchanged = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| if_none_match_hits(v, &etag));
    if unchanged {
        return Ok(HttpResponse::NotModified()
            .header(header::ETAG, etag.as_str())
            .finish());
    }

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .header(header::ETAG, etag.as_str())
        .body(body))
}

pub async fn register_player(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = service::register(&state.db, req)?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn get_unverified(
    state: web::types::State<Arc<AppState>>,
) -> Result<HttpResponse, AppError> {
    let players = service::unverified_players(&state.db)?;
    Ok(HttpResponse::Ok().json(&players))
}

pub async fn get_player(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let nickname = path.into_inner();
    let player = service::player_profile(&state.db, &nickname)?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn verify_player(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let player = service::verify_player(&state.db, &id)?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn deactivate_player(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let player = service::deactivate_player(&state.db, &id)?;
    Ok(HttpResponse::Ok().json(&player))
}
