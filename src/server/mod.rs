//! HTTP server for the treasure hunt API
//!
//! A blocking `tiny_http` loop with `(method, path)` match routing. Handlers
//! return `Result<serde_json::Value, AppError>`; the router turns errors into
//! the uniform `{"message": ...}` JSON body with the taxonomy's status code.

mod handlers;

use std::io::Read;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tiny_http::{Response, Server};
use tracing::{error, info};

use crate::auth::AuthService;
use crate::error::AppError;
use crate::game::ProgressEngine;
use crate::photos::PhotoService;
use crate::store::{PlayerStore, ShopStore};

/// Largest accepted request body. Sized for a base64-encoded photo upload
/// plus its JSON envelope.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Everything the handlers need, shared across requests
pub struct AppState {
    pub auth: AuthService,
    pub engine: ProgressEngine,
    pub shop: ShopStore,
    pub photos: PhotoService,
    pub players: PlayerStore,
}

/// A bound, not-yet-running hunt server
pub struct HuntServer {
    server: Server,
    state: Arc<AppState>,
}

impl HuntServer {
    /// Bind the listener. Port 0 picks an ephemeral port (used by tests).
    pub fn bind(state: AppState, addr: &str) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))
            .context("Could not start HTTP server")?;
        Ok(Self {
            server,
            state: Arc::new(state),
        })
    }

    /// The port the listener actually bound to
    pub fn port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .unwrap_or(0)
    }

    /// Serve requests until the process exits
    pub fn run(self) {
        info!("[hunt:http] Listening on port {}", self.port());
        for request in self.server.incoming_requests() {
            handle_request(&self.state, request);
        }
    }

    /// Serve requests on a background thread (tests)
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}

fn handle_request(state: &AppState, mut request: tiny_http::Request) {
    let method = request.method().to_string();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(url.as_str()).to_string();
    let authorization = auth_header(&request);

    // Body first: tiny_http hands out the reader mutably
    let body = if matches!(method.as_str(), "POST" | "PUT" | "DELETE") {
        match read_request_body(&mut request) {
            Ok(body) => body,
            Err(response) => {
                let _ = request.respond(response);
                return;
            }
        }
    } else {
        String::new()
    };

    // Static photo files bypass the JSON pipeline
    if method == "GET" && path.starts_with("/uploads/") {
        serve_upload(state, &path, request);
        return;
    }

    let auth = authorization.as_deref();
    let result = route(state, &method, &path, auth, &body);
    respond_result(&method, &path, request, result);
}

fn route(
    state: &AppState,
    method: &str,
    path: &str,
    auth: Option<&str>,
    body: &str,
) -> Result<serde_json::Value, AppError> {
    match (method, path) {
        ("GET", "/api/health") => Ok(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),

        ("POST", "/api/auth/register") => handlers::auth::register(state, body),
        ("POST", "/api/auth/login") => handlers::auth::login(state, body),
        ("POST", "/api/auth/logout") => handlers::auth::logout(state, auth),
        ("GET", "/api/auth/me") => handlers::auth::me(state, auth),

        ("GET", "/api/game/progress") => handlers::game::progress(state, auth),
        ("POST", "/api/game/complete-game") => handlers::game::complete_game(state, auth, body),
        ("POST", "/api/game/complete-clue") => handlers::game::complete_clue(state, auth, body),
        ("POST", "/api/game/complete-task") => handlers::game::complete_task(state, auth, body),
        ("POST", "/api/game/validate-game-step") => {
            handlers::game::validate_game_step(state, auth, body)
        }
        ("GET", p) if p.starts_with("/api/game/game-step-progress/") => {
            handlers::game::game_step_progress(state, auth, p)
        }
        ("GET", p) if p.starts_with("/api/game/clue/") => handlers::game::clue(state, auth, p),
        ("GET", "/api/game/locations") => handlers::game::locations(state, auth),
        ("POST", "/api/game/reset-progress") => handlers::game::reset_progress(state, auth),

        ("POST", "/api/game/admin/skip-clue") => handlers::admin::skip_clue(state, auth, body),
        ("POST", "/api/game/admin/reset-progress") => {
            handlers::admin::reset_progress(state, auth, body)
        }
        ("GET", "/api/admin/players") => handlers::admin::players(state, auth),

        ("GET", "/api/shop/gifts") => handlers::shop::gifts(state),
        ("POST", "/api/shop/purchase") => handlers::shop::purchase(state, auth, body),
        ("GET", "/api/shop/purchases") => handlers::shop::purchases(state, auth),
        ("POST", "/api/shop/seed-gifts") => handlers::shop::seed_gifts(state),

        ("POST", "/api/photos/upload") => handlers::photos::upload(state, auth, body),
        ("GET", "/api/photos/my-photos") => handlers::photos::my_photos(state, auth),
        ("GET", p) if p.starts_with("/api/photos/frame/") => handlers::photos::frame(state, p),
        ("GET", "/api/photos/filters") => handlers::photos::filters(state),
        ("DELETE", p) if p.starts_with("/api/photos/") => handlers::photos::delete(state, auth, p),

        _ => Err(AppError::NotFound("Route not found".to_string())),
    }
}

fn respond_result(
    method: &str,
    path: &str,
    request: tiny_http::Request,
    result: Result<serde_json::Value, AppError>,
) {
    match result {
        Ok(value) => respond_json(request, 200, value),
        Err(err) => {
            if let AppError::Internal(inner) = &err {
                error!("[hunt:http] {method} {path} failed: {inner:#}");
            }
            respond_json(
                request,
                err.status_code(),
                serde_json::json!({ "message": err.client_message() }),
            );
        }
    }
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: serde_json::Value) {
    let body =
        serde_json::to_string(&value).unwrap_or_else(|_| "{\"message\":\"Server error\"}".into());
    let response = Response::from_string(body)
        .with_status_code(status_code)
        .with_header(json_content_type());
    let _ = request.respond(response);
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn auth_header(request: &tiny_http::Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string())
}

fn read_request_body(
    request: &mut tiny_http::Request,
) -> Result<String, Response<std::io::Cursor<Vec<u8>>>> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[hunt:http] Failed to read body: {e}");
        let response = Response::from_string("{\"message\":\"Bad request\"}")
            .with_status_code(400)
            .with_header(json_content_type());
        return Err(response);
    }

    if body.len() > MAX_BODY_BYTES {
        let response = Response::from_string("{\"message\":\"Payload too large\"}")
            .with_status_code(413)
            .with_header(json_content_type());
        return Err(response);
    }

    Ok(body)
}

fn serve_upload(state: &AppState, path: &str, request: tiny_http::Request) {
    let Some(file_path) = state.photos.resolve_upload(path) else {
        respond_json(
            request,
            404,
            serde_json::json!({ "message": "File not found" }),
        );
        return;
    };

    let content_type: &[u8] = match file_path.extension().and_then(|e| e.to_str()) {
        Some("png") => b"image/png",
        Some("jpg") | Some("jpeg") => b"image/jpeg",
        _ => b"application/octet-stream",
    };

    match std::fs::File::open(&file_path) {
        Ok(file) => {
            let response = Response::from_file(file).with_header(
                tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type).unwrap(),
            );
            let _ = request.respond(response);
        }
        Err(e) => {
            error!("[hunt:http] Failed to open {}: {e}", file_path.display());
            respond_json(
                request,
                404,
                serde_json::json!({ "message": "File not found" }),
            );
        }
    }
}
