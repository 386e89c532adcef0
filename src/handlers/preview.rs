use crate::error::AppError;
use crate::services::preview as service;
use crate::state::AppState;
use ntex::http::header;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn player_preview(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let nickname = path.into_inner();
    let site_url = state.settings.site_url.as_str();
    match service::player_card(&state.db, &nickname, site_url)? {
        Some(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        None => Ok(HttpResponse::Found()
            .header(header::LOCATION, site_url)
            .finish()),
    }
}
