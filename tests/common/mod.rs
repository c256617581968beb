//! Shared fixture: an in-process hunt server on an ephemeral port.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use gifthunt::auth::AuthService;
use gifthunt::catalog;
use gifthunt::domain::Role;
use gifthunt::game::ProgressEngine;
use gifthunt::photos::PhotoService;
use gifthunt::server::{AppState, HuntServer};
use gifthunt::store::{HuntDb, PhotoStore, PlayerStore, SessionStore, ShopStore};

pub struct TestServer {
    pub base_url: String,
    /// Direct handles for test setup (admin accounts, DB poking)
    pub auth: AuthService,
    pub engine: ProgressEngine,
    pub shop: ShopStore,
    _uploads: TempDir,
}

impl TestServer {
    /// Spin up a server against a fresh in-memory database and the built-in
    /// catalog. The server thread lives until the process exits, which is
    /// fine for test binaries.
    pub fn start() -> Self {
        let uploads = TempDir::new().expect("tempdir");
        let catalog = Arc::new(catalog::builtin().clone());
        let db = HuntDb::open_in_memory().expect("open db");

        let players = PlayerStore::new(db.clone());
        let sessions = SessionStore::new(db.clone());
        let shop = ShopStore::new(db.clone());
        let auth = AuthService::new(
            players.clone(),
            sessions,
            60 * 60 * 1000,
            catalog.first_step_id(),
        );
        let photos = PhotoService::new(
            PhotoStore::new(db.clone()),
            uploads.path().to_path_buf(),
            1024 * 1024,
        );
        let engine = ProgressEngine::new(db, catalog);

        let state = AppState {
            auth: auth.clone(),
            engine: engine.clone(),
            shop: shop.clone(),
            photos,
            players,
        };

        let server = HuntServer::bind(state, "127.0.0.1:0").expect("bind server");
        let base_url = format!("http://127.0.0.1:{}", server.port());
        server.spawn();

        Self {
            base_url,
            auth,
            engine,
            shop,
            _uploads: uploads,
        }
    }

    /// Register a player and return their bearer token and username
    pub fn register(&self, name: &str, email: &str) -> (String, String) {
        let body = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({ "name": name, "email": email, "password": "longenough" }),
            )
            .1;
        let token = body["token"].as_str().expect("token").to_string();
        let username = body["player"]["username"]
            .as_str()
            .expect("username")
            .to_string();
        (token, username)
    }

    /// Create an admin directly and log in over HTTP for their token
    pub fn register_admin(&self, email: &str) -> String {
        let admin = self
            .auth
            .create_admin("The Boss", email, "longenough", None)
            .expect("create admin");
        assert_eq!(admin.role, Role::Admin);
        let body = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email, "password": "longenough" }),
            )
            .1;
        body["token"].as_str().expect("token").to_string()
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> (u16, serde_json::Value) {
        let req = with_auth(ureq::get(&format!("{}{path}", self.base_url)), token);
        into_result(req.call())
    }

    pub fn post(
        &self,
        path: &str,
        token: Option<&str>,
        payload: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let req = with_auth(ureq::post(&format!("{}{path}", self.base_url)), token);
        into_result(req.send_string(&payload.to_string()))
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> (u16, serde_json::Value) {
        let req = with_auth(ureq::delete(&format!("{}{path}", self.base_url)), token);
        into_result(req.call())
    }

    /// Raw GET for static files; returns status and body bytes
    pub fn get_raw(&self, path: &str) -> (u16, Vec<u8>) {
        match ureq::get(&format!("{}{path}", self.base_url)).call() {
            Ok(resp) => {
                let status = resp.status();
                let mut bytes = Vec::new();
                use std::io::Read;
                resp.into_reader().read_to_end(&mut bytes).expect("body");
                (status, bytes)
            }
            Err(ureq::Error::Status(code, _)) => (code, Vec::new()),
            Err(e) => panic!("transport error: {e}"),
        }
    }
}

fn with_auth(req: ureq::Request, token: Option<&str>) -> ureq::Request {
    match token {
        Some(token) => req.set("Authorization", &format!("Bearer {token}")),
        None => req,
    }
}

fn into_result(result: Result<ureq::Response, ureq::Error>) -> (u16, serde_json::Value) {
    match result {
        Ok(resp) => {
            let status = resp.status();
            let body = resp.into_string().expect("response body");
            (status, parse_json(&body))
        }
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            (code, parse_json(&body))
        }
        Err(e) => panic!("transport error: {e}"),
    }
}

fn parse_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or(serde_json::Value::Null)
}
