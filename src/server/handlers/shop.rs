//! Gift shop handlers.

use serde::Deserialize;

use super::{authenticate, parse_body};
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub gift_id: String,
}

pub fn gifts(state: &AppState) -> Result<serde_json::Value, AppError> {
    let gifts = state.shop.list_available().map_err(AppError::Internal)?;
    Ok(serde_json::json!({ "gifts": gifts }))
}

pub fn purchase(
    state: &AppState,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let req: PurchaseRequest = parse_body(body)?;
    let outcome = state.shop.purchase(&player.username, &req.gift_id)?;
    tracing::info!(
        "[hunt:shop] {} bought {} for {} points",
        player.username,
        outcome.gift_name,
        outcome.points_spent
    );
    Ok(serde_json::json!({
        "message": "Purchase successful",
        "giftName": outcome.gift_name,
        "giftDescription": outcome.gift_description,
        "pointsSpent": outcome.points_spent,
        "remainingPoints": outcome.remaining_points,
    }))
}

pub fn purchases(state: &AppState, auth: Option<&str>) -> Result<serde_json::Value, AppError> {
    let player = authenticate(state, auth)?;
    let purchases = state
        .shop
        .history(&player.username)
        .map_err(AppError::Internal)?;
    Ok(serde_json::json!({ "purchases": purchases }))
}

pub fn seed_gifts(state: &AppState) -> Result<serde_json::Value, AppError> {
    let seeded = state.shop.seed_defaults().map_err(AppError::Internal)?;
    let message = if seeded {
        "Gifts seeded"
    } else {
        "Gifts already seeded"
    };
    Ok(serde_json::json!({ "message": message, "seeded": seeded }))
}
