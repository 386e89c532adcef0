use crate::config::Settings;
use crate::db::Db;
use crate::services::matches::MatchRecorder;

/// Shared by every worker through an `Arc`.
pub struct AppState {
    pub db: Db,
    pub recorder: MatchRecorder,
    pub settings: Settings,
}

impl AppState {
    pub fn new(db: Db, settings: Settings) -> Self {
        AppState {
            recorder: MatchRecorder::new(settings.k_factor),
            db,
            settings,
        }
    }
}
