//! Status command implementation

use anyhow::{Context, Result};

use gifthunt::config::Config;

/// Ping a running server and report what it says
pub fn status_command(config: &Config) -> Result<()> {
    let url = format!("http://{}/api/health", config.bind_addr());

    let response = match ureq::get(&url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            anyhow::bail!("Server at {url} answered HTTP {code}: {}", body.trim());
        }
        Err(e) => {
            anyhow::bail!("No server reachable at {url}: {e}");
        }
    };

    let body: serde_json::Value = response
        .into_json()
        .context("Failed to parse health response")?;
    let version = body
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    println!("Server is up at {} (version {version})", config.bind_addr());
    Ok(())
}
