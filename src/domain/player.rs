use serde::{Deserialize, Serialize};

use super::{Progress, StepId};

/// Access role of a player account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            _ => Role::Player,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A player account as stored in the database
#[derive(Debug, Clone)]
pub struct Player {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
    pub total_score: i64,
    pub available_points: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Player {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Player data sent to clients (credentials stripped)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub total_score: i64,
    pub available_points: i64,
    pub game_progress: Progress,
}

/// Roster entry for the admin player list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub total_score: i64,
    pub available_points: i64,
    pub current_clue: Option<StepId>,
    pub completed_clues: usize,
}

/// A recorded gift purchase
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub gift_id: String,
    pub gift_name: String,
    pub cost: i64,
    pub purchased_at: i64,
}

/// A stored hunt photo
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub clue_number: StepId,
    #[serde(rename = "imageUrl")]
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "timestamp")]
    pub taken_at: i64,
}
