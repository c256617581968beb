//! Admin handlers: skip and reset for other players, roster listing.

use serde::Deserialize;

use super::{authenticate_admin, parse_body};
use crate::domain::StepId;
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipClueRequest {
    pub username: String,
    pub clue_id: StepId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResetRequest {
    pub username: String,
}

pub fn skip_clue(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let admin = authenticate_admin(state, auth)?;
    let req: SkipClueRequest = parse_body(body)?;
    let next = state.engine.skip_step(&req.username, req.clue_id)?;
    tracing::info!(
        "[hunt:admin] {} skipped clue {} for {}",
        admin.username,
        req.clue_id,
        req.username
    );
    Ok(serde_json::json!({
        "message": "Clue skipped",
        "nextClue": next,
    }))
}

pub fn reset_progress(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let admin = authenticate_admin(state, auth)?;
    let req: AdminResetRequest = parse_body(body)?;
    state.engine.reset(&req.username)?;
    tracing::info!(
        "[hunt:admin] {} reset progress for {}",
        admin.username,
        req.username
    );
    Ok(serde_json::json!({ "message": "Progress reset" }))
}

pub fn players(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    authenticate_admin(state, auth)?;
    let players = state.players.list().map_err(AppError::Internal)?;
    Ok(serde_json::json!({ "players": players }))
}
