//! SQLite database connection and schema management
//!
//! Manages the hunt database with automatic schema migration. One connection
//! behind a mutex; WAL mode so the CLI can inspect the database while the
//! server is running.

mod photos;
mod players;
mod sessions;
mod shop;

pub use photos::PhotoStore;
pub use players::{NewPlayer, PlayerStore};
pub use sessions::SessionStore;
pub use shop::{Gift, PurchaseOutcome, ShopStore};

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Database wrapper shared by all repositories
#[derive(Clone)]
pub struct HuntDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl HuntDb {
    /// Open or create the hunt database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open hunt db: {}", path.display()))?;

        // WAL so the CLI can read while the server holds the connection
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database for tests and throwaway runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a reference to the connection (for queries)
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Hunt DB lock poisoned")
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: per-part answers for multi-part games
        if version < 2 {
            let has_table: bool = conn
                .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'game_part_answers'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_table {
                conn.execute_batch(
                    r#"
                    CREATE TABLE IF NOT EXISTS game_part_answers (
                        username TEXT NOT NULL,
                        step_id INTEGER NOT NULL,
                        game_id INTEGER NOT NULL,
                        part_index INTEGER NOT NULL,
                        correct INTEGER NOT NULL DEFAULT 0,
                        answered_at INTEGER NOT NULL,
                        PRIMARY KEY (username, step_id, game_id, part_index)
                    );
                    "#,
                )?;
            }

            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }
}

/// SQL schema for the hunt database
const SCHEMA_SQL: &str = r#"
-- Player accounts (one row per player, progression columns embedded)
CREATE TABLE IF NOT EXISTS players (
    username TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'player',
    total_score INTEGER NOT NULL DEFAULT 0,
    available_points INTEGER NOT NULL DEFAULT 0,
    current_step INTEGER,
    current_game_index INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_players_email ON players(email);

-- Passed final-answer gates (one row per step per player)
CREATE TABLE IF NOT EXISTS completed_steps (
    username TEXT NOT NULL,
    step_id INTEGER NOT NULL,
    points_earned INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER NOT NULL,
    PRIMARY KEY (username, step_id)
);

-- Completed bonus tasks
CREATE TABLE IF NOT EXISTS completed_tasks (
    username TEXT NOT NULL,
    step_id INTEGER NOT NULL,
    points_earned INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER NOT NULL,
    PRIMARY KEY (username, step_id)
);

-- Completed games; the primary key is the duplicate-award guard
CREATE TABLE IF NOT EXISTS completed_games (
    username TEXT NOT NULL,
    step_id INTEGER NOT NULL,
    game_id INTEGER NOT NULL,
    points_earned INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER NOT NULL,
    PRIMARY KEY (username, step_id, game_id)
);

-- Per-part answers of multi-part games
CREATE TABLE IF NOT EXISTS game_part_answers (
    username TEXT NOT NULL,
    step_id INTEGER NOT NULL,
    game_id INTEGER NOT NULL,
    part_index INTEGER NOT NULL,
    correct INTEGER NOT NULL DEFAULT 0,
    answered_at INTEGER NOT NULL,
    PRIMARY KEY (username, step_id, game_id, part_index)
);

-- Bearer sessions
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(username);

-- Gift shop inventory (stock -1 means unlimited)
CREATE TABLE IF NOT EXISTS gifts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    cost INTEGER NOT NULL,
    category TEXT NOT NULL DEFAULT 'mystery',
    image_url TEXT,
    stock INTEGER NOT NULL DEFAULT -1,
    available INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

-- Purchase history
CREATE TABLE IF NOT EXISTS purchases (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    gift_id TEXT NOT NULL,
    gift_name TEXT NOT NULL,
    cost INTEGER NOT NULL,
    purchased_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases(username);

-- Uploaded hunt photos
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    step_id INTEGER NOT NULL,
    file_path TEXT NOT NULL,
    url TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    taken_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_photos_user ON photos(username);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (2);
"#;
