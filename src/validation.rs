use crate::error::AppError;

const MAX_NICKNAME_LEN: usize = 32;
const MAX_CONTACT_LEN: usize = 64;
const MAX_SCORE_LEN: usize = 32;
const MAX_AVATAR_URL_LEN: usize = 512;
pub const DEFAULT_MATCH_LIMIT: i64 = 10;
const MAX_MATCH_LIMIT: i64 = 100;

pub fn validate_nickname(nickname: &str) -> Result<String, AppError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Nickname cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_NICKNAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Nickname must be at most {} characters",
            MAX_NICKNAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_contact(contact: Option<&str>) -> Result<Option<String>, AppError> {
    match contact.map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) if c.chars().count() > MAX_CONTACT_LEN => {
            Err(AppError::InvalidInput("Contact is too long".into()))
        }
        Some(c) => Ok(Some(c.to_string())),
    }
}

pub fn validate_avatar_url(avatar_url: Option<&str>) -> Result<Option<String>, AppError> {
    let raw = match avatar_url.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };
    if raw.len() > MAX_AVATAR_URL_LEN {
        return Err(AppError::InvalidInput("Avatar URL is too long".into()));
    }
    let parsed = url::Url::parse(raw)
        .map_err(|_| AppError::InvalidInput(format!("Invalid avatar URL: {}", raw)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(Some(parsed.to_string())),
        other => Err(AppError::InvalidInput(format!(
            "Avatar URL must use http or https, not {}",
            other
        ))),
    }
}

pub fn validate_score(score: &str) -> Result<String, AppError> {
    let trimmed = score.trim();
    if trimmed.is_empty() {
        Err(AppError::InvalidInput("Score cannot be empty".into()))
    } else if trimmed.chars().count() > MAX_SCORE_LEN {
        Err(AppError::InvalidInput("Score is too long".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn clamp_match_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_MATCH_LIMIT).clamp(1, MAX_MATCH_LIMIT)
}
