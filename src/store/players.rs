//! Player account repository

use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{Player, PlayerSummary, Role, StepId};
use crate::store::HuntDb;

/// Fields needed to insert a fresh account
pub struct NewPlayer {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
    pub starting_step: StepId,
}

/// Repository for player accounts
#[derive(Clone)]
pub struct PlayerStore {
    db: HuntDb,
}

impl PlayerStore {
    pub fn new(db: HuntDb) -> Self {
        Self { db }
    }

    /// Insert a new account; fails if username or email already exists
    pub fn create(&self, new: &NewPlayer) -> Result<Player> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO players (username, name, email, password_hash, password_salt, role,
                                  total_score, available_points, current_step, current_game_index,
                                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, 0, ?8, ?8)",
            params![
                new.username,
                new.name,
                new.email,
                new.password_hash,
                new.password_salt,
                new.role.as_str(),
                new.starting_step,
                now
            ],
        )?;
        drop(conn);

        self.get(&new.username)?
            .ok_or_else(|| anyhow::anyhow!("Player vanished after insert: {}", new.username))
    }

    /// Look up a player by username
    pub fn get(&self, username: &str) -> Result<Option<Player>> {
        let conn = self.db.conn();
        let player = conn
            .query_row(
                "SELECT username, name, email, password_hash, password_salt, role,
                        total_score, available_points, created_at, updated_at
                 FROM players WHERE username = ?1",
                params![username],
                row_to_player,
            )
            .optional()?;
        Ok(player)
    }

    /// Look up a player by email (login identifier)
    pub fn find_by_email(&self, email: &str) -> Result<Option<Player>> {
        let conn = self.db.conn();
        let player = conn
            .query_row(
                "SELECT username, name, email, password_hash, password_salt, role,
                        total_score, available_points, created_at, updated_at
                 FROM players WHERE email = ?1",
                params![email],
                row_to_player,
            )
            .optional()?;
        Ok(player)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.db.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM players WHERE username = ?1",
            params![username],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.db.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM players WHERE email = ?1",
            params![email],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    /// All accounts with progress counts, highest score first (admin roster)
    pub fn list(&self) -> Result<Vec<PlayerSummary>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT p.username, p.name, p.role, p.total_score, p.available_points, p.current_step,
                    (SELECT COUNT(*) FROM completed_steps cs WHERE cs.username = p.username)
             FROM players p ORDER BY p.total_score DESC, p.created_at ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let role: String = row.get(2)?;
            let completed: i64 = row.get(6)?;
            Ok(PlayerSummary {
                username: row.get(0)?,
                name: row.get(1)?,
                role: Role::parse(&role),
                total_score: row.get(3)?,
                available_points: row.get(4)?,
                current_clue: row.get(5)?,
                completed_clues: completed as usize,
            })
        })?;
        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// Promote (or demote) an account
    pub fn set_role(&self, username: &str, role: Role) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE players SET role = ?1, updated_at = ?2 WHERE username = ?3",
            params![role.as_str(), now, username],
        )?;
        Ok(changed > 0)
    }
}

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    let role: String = row.get(5)?;
    Ok(Player {
        username: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        password_salt: row.get(4)?,
        role: Role::parse(&role),
        total_score: row.get(6)?,
        available_points: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
