//! Direct database administration commands
//!
//! These bypass the HTTP API and work on the database file itself, so they
//! function whether or not the server is running (WAL mode allows both).

use std::sync::Arc;

use anyhow::{Context, Result};

use gifthunt::auth::AuthService;
use gifthunt::catalog::Catalog;
use gifthunt::config::Config;
use gifthunt::game::ProgressEngine;
use gifthunt::store::{HuntDb, PlayerStore, SessionStore};

/// Create an admin account directly in the database
pub fn create_admin_command(
    config: &Config,
    name: &str,
    email: &str,
    password: &str,
    username: Option<&str>,
) -> Result<()> {
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let db = HuntDb::open(&config.db_path())?;
    let auth = AuthService::new(
        PlayerStore::new(db.clone()),
        SessionStore::new(db),
        config.token_ttl_millis(),
        catalog.first_step_id(),
    );

    let admin = auth
        .create_admin(name, email, password, username)
        .map_err(|e| anyhow::anyhow!(e.client_message()))
        .context("Failed to create admin")?;
    println!("Created admin '{}' ({})", admin.username, admin.email);
    Ok(())
}

/// Wipe one player's progression back to the first step
pub fn reset_player_command(config: &Config, username: &str) -> Result<()> {
    let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref())?);
    let db = HuntDb::open(&config.db_path())?;
    let engine = ProgressEngine::new(db, catalog);

    engine
        .reset(username)
        .map_err(|e| anyhow::anyhow!(e.client_message()))
        .with_context(|| format!("Failed to reset player '{username}'"))?;
    println!("Reset progress for '{username}'");
    Ok(())
}
