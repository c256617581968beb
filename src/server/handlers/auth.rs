//! Registration, login and session handlers.

use serde::Deserialize;

use super::{authenticate, parse_body, to_json};
use crate::domain::{Player, PlayerView};
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn register(state: &AppState, body: &str) -> Result<serde_json::Value, AppError> {
    let req: RegisterRequest = parse_body(body)?;
    let (player, token) = state.auth.register(&req.name, &req.email, &req.password)?;
    tracing::info!("[hunt:auth] Registered player {}", player.username);
    Ok(serde_json::json!({
        "token": token,
        "player": player_view(state, &player)?,
    }))
}

pub fn login(state: &AppState, body: &str) -> Result<serde_json::Value, AppError> {
    let req: LoginRequest = parse_body(body)?;
    let (player, token) = state.auth.login(&req.email, &req.password)?;
    Ok(serde_json::json!({
        "token": token,
        "player": player_view(state, &player)?,
    }))
}

pub fn logout(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    state.auth.logout(auth)?;
    Ok(serde_json::json!({ "message": "Logged out" }))
}

pub fn me(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    to_json(&player_view(state, &player)?)
}

/// The client-facing view of a player, progress included
pub(crate) fn player_view(state: &AppState, player: &Player) -> Result<PlayerView, AppError> {
    let progress = state.engine.progress(&player.username)?;
    Ok(PlayerView {
        username: player.username.clone(),
        name: player.name.clone(),
        email: player.email.clone(),
        role: player.role,
        total_score: player.total_score,
        available_points: player.available_points,
        game_progress: progress,
    })
}
