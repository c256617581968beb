//! Photo handlers: upload, listing, frame metadata and deletion.

use serde::Deserialize;

use super::{authenticate, parse_body, parse_trailing_id};
use crate::domain::StepId;
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub clue_number: StepId,
    /// Base64 payload, with or without a `data:image/...;base64,` prefix
    pub data: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

pub fn upload(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: UploadRequest = parse_body(body)?;
    let photo = state.photos.upload(
        &player.username,
        req.clue_number,
        &req.data,
        req.latitude,
        req.longitude,
    )?;

    let filter = state
        .engine
        .catalog()
        .step(req.clue_number)
        .and_then(|s| s.filter.clone());
    tracing::info!(
        "[hunt:photos] {} uploaded photo {} at clue {}",
        player.username,
        photo.id,
        req.clue_number
    );
    Ok(serde_json::json!({ "photo": photo, "filter": filter }))
}

pub fn my_photos(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let photos = state.photos.my_photos(&player.username)?;
    Ok(serde_json::json!({ "photos": photos }))
}

/// `GET /api/photos/frame/{clueNumber}`
pub fn frame(state: &AppState, path: &str) -> Result<serde_json::Value, AppError> {
    let clue_number = parse_trailing_id(path)?;
    let step = state
        .engine
        .catalog()
        .step(clue_number)
        .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;
    Ok(serde_json::json!({ "filter": step.filter }))
}

/// Every step's frame metadata, for the client's photo gallery
pub fn filters(state: &AppState) -> Result<serde_json::Value, AppError> {
    let filters: Vec<serde_json::Value> = state
        .engine
        .catalog()
        .steps()
        .iter()
        .map(|step| {
            serde_json::json!({
                "clueNumber": step.id,
                "locationName": step.location.name,
                "filter": step.filter,
            })
        })
        .collect();
    Ok(serde_json::json!({ "filters": filters }))
}

/// `DELETE /api/photos/{photoId}`
pub fn delete(
    state: &AppState,
    auth: Option<&str>,
    path: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let photo_id = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Invalid("Invalid photo id".to_string()))?;
    state.photos.delete(&player.username, photo_id)?;
    Ok(serde_json::json!({ "message": "Photo deleted" }))
}
