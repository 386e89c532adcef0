use crate::error::{AppError, StoreError};
use crate::models::player::*;
use crate::store::PlayerStore;
use crate::validation;

pub fn register<S: PlayerStore + ?Sized>(
    store: &S,
    req: RegisterRequest,
) -> Result<RegistrationResult, AppError> {
    let nickname = validation::validate_nickname(&req.nickname)?;
    let contact = validation::validate_contact(req.contact.as_deref())?;
    let avatar_url = validation::validate_avatar_url(req.avatar_url.as_deref())?;

    if store.find_active_by_nickname(&nickname)?.is_some() {
        return Err(AppError::DuplicateNickname(nickname));
    }

    let draft = PlayerDraft {
        nickname: nickname.clone(),
        contact,
        avatar_url,
    };
    // The lookup above races with concurrent registrations; the unique index
    // on active nicknames is the final arbiter.
    let player = store.insert_player(draft).map_err(|e| match e {
        StoreError::Conflict(_) => AppError::DuplicateNickname(nickname),
        other => AppError::from(other),
    })?;

    log::info!("Registered player {} ({})", player.nickname, player.id);
    Ok(RegistrationResult {
        player,
        message: "Profile created! Awaiting organizer confirmation.".into(),
    })
}

pub fn leaderboard<S: PlayerStore + ?Sized>(store: &S) -> Result<Vec<Player>, AppError> {
    Ok(store.list_active_players()?)
}

pub fn unverified_players<S: PlayerStore + ?Sized>(store: &S) -> Result<Vec<Player>, AppError> {
    Ok(store.list_unverified_players()?)
}

pub fn player_profile<S: PlayerStore + ?Sized>(
    store: &S,
    nickname: &str,
) -> Result<Player, AppError> {
    store
        .find_active_by_nickname(nickname)?
        .ok_or_else(|| AppError::PlayerNotFound(nickname.to_string()))
}

pub fn verify_player<S: PlayerStore + ?Sized>(store: &S, id: &str) -> Result<Player, AppError> {
    let changes = PlayerUpdate {
        verified: Some(true),
        ..Default::default()
    };
    let player = store
        .update_player(id, &changes)?
        .ok_or_else(|| AppError::PlayerNotFound(id.to_string()))?;
    log::info!("Verified player {} ({})", player.nickname, player.id);
    Ok(player)
}

/// Soft delete: the row stays for match history, but leaves listings and
/// frees the nickname.
pub fn deactivate_player<S: PlayerStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Player, AppError> {
    let changes = PlayerUpdate {
        active: Some(false),
        ..Default::default()
    };
    let player = store
        .update_player(id, &changes)?
        .ok_or_else(|| AppError::PlayerNotFound(id.to_string()))?;
    log::info!("Deactivated player {} ({})", player.nickname, player.id);
    Ok(player)
}
