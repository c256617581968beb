//! Progression handlers: progress snapshot, game/step/task completion,
//! multi-part validation, locations and self-service reset.

use serde::Deserialize;

use super::{authenticate, parse_body, parse_trailing_id, to_json};
use crate::domain::{GameId, StepId};
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteGameRequest {
    pub step_id: StepId,
    pub game_id: GameId,
    #[serde(default)]
    pub points: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteClueRequest {
    pub clue_id: StepId,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub clue_id: StepId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateGameStepRequest {
    pub step_id: StepId,
    pub game_id: GameId,
    pub part_index: usize,
    pub answer: String,
}

pub fn progress(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    to_json(&state.engine.snapshot(&player.username)?)
}

pub fn complete_game(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: CompleteGameRequest = parse_body(body)?;
    let done = state
        .engine
        .complete_game(&player.username, req.step_id, req.game_id, req.points)?;
    to_json(&done)
}

pub fn complete_clue(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: CompleteClueRequest = parse_body(body)?;
    let done = state
        .engine
        .complete_step(&player.username, req.clue_id, &req.answer)?;
    tracing::info!(
        "[hunt:game] {} passed clue {} (next: {:?})",
        player.username,
        req.clue_id,
        done.next_clue
    );
    to_json(&done)
}

pub fn complete_task(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: CompleteTaskRequest = parse_body(body)?;
    let done = state.engine.complete_task(&player.username, req.clue_id)?;
    to_json(&done)
}

pub fn validate_game_step(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: ValidateGameStepRequest = parse_body(body)?;
    let result = state.engine.validate_part(
        &player.username,
        req.step_id,
        req.game_id,
        req.part_index,
        &req.answer,
    )?;
    to_json(&result)
}

/// `GET /api/game/game-step-progress/{stepId}/{gameId}`
pub fn game_step_progress(
    state: &AppState,
    auth: Option<&str>,
    path: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let rest = path
        .strip_prefix("/api/game/game-step-progress/")
        .unwrap_or("");
    let mut parts = rest.trim_end_matches('/').split('/');
    let (step_id, game_id) = match (parts.next(), parts.next(), parts.next()) {
        (Some(s), Some(g), None) => (
            s.parse()
                .map_err(|_| AppError::Invalid("Invalid step id".to_string()))?,
            g.parse()
                .map_err(|_| AppError::Invalid("Invalid game id".to_string()))?,
        ),
        _ => return Err(AppError::Invalid("Invalid path".to_string())),
    };

    let progress = state
        .engine
        .part_progress(&player.username, step_id, game_id)?;
    Ok(serde_json::json!({ "progress": progress }))
}

/// `GET /api/game/clue/{id}`
pub fn clue(state: &AppState, auth: Option<&str>, path: &str) -> Result<serde_json::Value, AppError> {
    authenticate(state, auth)?;
    let id = parse_trailing_id(path)?;
    let step = state
        .engine
        .catalog()
        .step(id)
        .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;
    to_json(step)
}

pub fn locations(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let locations = state.engine.locations(&player.username)?;
    Ok(serde_json::json!({ "locations": locations }))
}

pub fn reset_progress(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    state.engine.reset(&player.username)?;
    tracing::info!("[hunt:game] {} reset their progress", player.username);
    Ok(serde_json::json!({ "message": "Progress reset" }))
}
