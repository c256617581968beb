//! Init command implementation

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::info;

use gifthunt::config::Config;

/// Default configuration content for gifthunt init
pub const DEFAULT_CONFIG: &str = r#"# Gifthunt Configuration
# ======================
#
# Every value below shows its default; delete a line to keep the default.

[server]
# Address and port the HTTP API binds to
bind = "127.0.0.1"
port = 3001

[database]
# Path to the SQLite database; defaults to ~/.gifthunt/hunt.db
# path = "/var/lib/gifthunt/hunt.db"

[catalog]
# Path to a step catalog TOML file; omit to play the built-in hunt
# path = "/etc/gifthunt/catalog.toml"

[uploads]
# Directory for uploaded photos; defaults to ~/.gifthunt/uploads
# dir = "/var/lib/gifthunt/uploads"
# Maximum decoded photo size in bytes
max_photo_bytes = 10485760

[auth]
# How long a login session stays valid, in hours
token_ttl_hours = 168
"#;

/// Write a default config file at the explicit path or the global location
pub fn init_command(config_override: Option<&Path>, force: bool) -> Result<()> {
    let path: PathBuf = match config_override {
        Some(p) => p.to_path_buf(),
        None => Config::global_config_path(),
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    info!("[hunt] Wrote default config to {}", path.display());
    println!("Created {}", path.display());
    Ok(())
}
