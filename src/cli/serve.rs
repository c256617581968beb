//! Serve command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use gifthunt::auth::AuthService;
use gifthunt::catalog::Catalog;
use gifthunt::config::Config;
use gifthunt::game::ProgressEngine;
use gifthunt::photos::PhotoService;
use gifthunt::server::{AppState, HuntServer};
use gifthunt::store::{HuntDb, PhotoStore, PlayerStore, SessionStore, ShopStore};

/// Run the hunt server until interrupted
pub fn serve_command(config: &Config) -> Result<()> {
    let catalog = Arc::new(
        Catalog::load(config.catalog.path.as_deref()).context("Failed to load step catalog")?,
    );
    info!(
        "[hunt] Catalog loaded: {} steps ({})",
        catalog.steps().len(),
        config
            .catalog
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );

    let db_path = config.db_path();
    let db = HuntDb::open(&db_path)?;
    info!("[hunt] Database at {}", db_path.display());

    let players = PlayerStore::new(db.clone());
    let sessions = SessionStore::new(db.clone());
    let shop = ShopStore::new(db.clone());
    let photos = PhotoStore::new(db.clone());

    if shop.seed_defaults()? {
        info!("[hunt] Seeded default gifts");
    }
    match sessions.prune_expired() {
        Ok(0) => {}
        Ok(n) => info!("[hunt] Pruned {n} expired sessions"),
        Err(e) => warn!("[hunt] Session pruning failed: {e}"),
    }

    let state = AppState {
        auth: AuthService::new(
            players.clone(),
            sessions,
            config.token_ttl_millis(),
            catalog.first_step_id(),
        ),
        engine: ProgressEngine::new(db, catalog),
        shop,
        photos: PhotoService::new(
            photos,
            config.uploads_dir(),
            config.uploads.max_photo_bytes,
        ),
        players,
    };

    let addr = config.bind_addr();
    let server = HuntServer::bind(state, &addr)?;
    info!("[hunt] Serving on http://{addr}");
    server.run();
    Ok(())
}
