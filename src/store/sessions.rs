//! Bearer token session repository

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::store::HuntDb;

/// Repository for login sessions
#[derive(Clone)]
pub struct SessionStore {
    db: HuntDb,
}

impl SessionStore {
    pub fn new(db: HuntDb) -> Self {
        Self { db }
    }

    /// Record a fresh session token for a player
    pub fn insert(&self, token: &str, username: &str, ttl_millis: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO sessions (token, username, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![token, username, now, now + ttl_millis],
        )?;
        Ok(())
    }

    /// Resolve a token to its username, ignoring expired sessions
    pub fn lookup(&self, token: &str) -> Result<Option<String>> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.db.conn();
        let username = conn
            .query_row(
                "SELECT username FROM sessions WHERE token = ?1 AND expires_at > ?2",
                params![token, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(username)
    }

    /// Drop a single session (logout)
    pub fn delete(&self, token: &str) -> Result<bool> {
        let conn = self.db.conn();
        let changed = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(changed > 0)
    }

    /// Drop every session that has passed its expiry
    pub fn prune_expired(&self) -> Result<usize> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.db.conn();
        let pruned = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
        Ok(pruned)
    }
}
