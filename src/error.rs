use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

/// Failures raised by a `PlayerStore` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("constraint violated: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Backend(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(e.to_string())
            }
            other => StoreError::Backend(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("A player cannot play against themselves: {0}")]
    SelfMatch(String),

    #[error("A player with nickname '{0}' already exists")]
    DuplicateNickname(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Match {0} cannot be reconciled, a later match already moved the ratings")]
    StaleMatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-checkable error kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::PlayerNotFound(_) => "PlayerNotFound",
            AppError::SelfMatch(_) => "SelfMatch",
            AppError::DuplicateNickname(_) => "DuplicateNickname",
            AppError::StoreUnavailable(_) => "StoreUnavailable",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::MatchNotFound(_) => "MatchNotFound",
            AppError::StaleMatch(_) => "StaleMatch",
            AppError::Internal(_) => "Internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::PlayerNotFound(_) | AppError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SelfMatch(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateNickname(_) | AppError::StaleMatch(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        HttpResponse::build(self.status()).json(&serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}
