//! HTTP request handlers, one module per API area.

pub mod admin;
pub mod auth;
pub mod game;
pub mod photos;
pub mod shop;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::Player;
use crate::error::AppError;
use crate::server::AppState;

/// Serialize a handler result value
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

/// Deserialize a JSON request body
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::Invalid(format!("Invalid request body: {e}")))
}

/// Resolve the bearer token to a player
pub(crate) fn authenticate(state: &AppState, auth: Option<&str>) -> Result<Player, AppError> {
    state.auth.authenticate(auth)
}

/// Resolve the bearer token and require the admin role
pub(crate) fn authenticate_admin(state: &AppState, auth: Option<&str>) -> Result<Player, AppError> {
    let player = authenticate(state, auth)?;
    if !player.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(player)
}

/// Parse the trailing path segment as an integer id, e.g. `/api/game/clue/3`
pub(crate) fn parse_trailing_id(path: &str) -> Result<u32, AppError> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::Invalid("Invalid id in path".to_string()))
}
