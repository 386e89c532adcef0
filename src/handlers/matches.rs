use crate::error::AppError;
use crate::models::matches::*;
use crate::services::matches as service;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn record_match(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<RecordMatchRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = state.recorder.record_match(&state.db, req)?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn get_recent_matches(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<RecentMatchesQuery>,
) -> Result<HttpResponse, AppError> {
    let matches = service::recent_matches(&state.db, query.limit)?;
    Ok(HttpResponse::Ok().json(&matches))
}

pub async fn reconcile_match(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let match_id = path.into_inner();
    let outcome = state.recorder.reconcile_match(&state.db, &match_id)?;
    Ok(HttpResponse::Ok().json(&outcome))
}
