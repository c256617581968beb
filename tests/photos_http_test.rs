//! Photo upload, listing, frame metadata and static serving over HTTP.

mod common;

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::TestServer;

fn png_base64() -> String {
    let img = image::RgbImage::new(4, 4);
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[test]
fn upload_list_serve_and_delete() {
    let server = TestServer::start();
    let (token, username) = server.register("Carlos", "carlos@example.com");

    let (status, body) = server.post(
        "/api/photos/upload",
        Some(&token),
        serde_json::json!({
            "clueNumber": 1,
            "data": png_base64(),
            "latitude": 42.3515,
        }),
    );
    assert_eq!(status, 200);
    let photo = &body["photo"];
    assert_eq!(photo["clueNumber"], 1);
    assert_eq!(photo["latitude"], 42.3515);
    let url = photo["imageUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("/uploads/{username}/")));
    // Step 1 carries a frame in the built-in catalog
    assert!(body["filter"]["frameUrl"].is_string());

    let (status, body) = server.get("/api/photos/my-photos", Some(&token));
    assert_eq!(status, 200);
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);

    // The stored file is served back as a real PNG
    let (status, bytes) = server.get_raw(&url);
    assert_eq!(status, 200);
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

    let photo_id = photo["id"].as_str().unwrap();
    let (status, _) = server.delete(&format!("/api/photos/{photo_id}"), Some(&token));
    assert_eq!(status, 200);
    let (status, _) = server.get_raw(&url);
    assert_eq!(status, 404);
    let (status, _) = server.delete(&format!("/api/photos/{photo_id}"), Some(&token));
    assert_eq!(status, 404);
}

#[test]
fn upload_rejects_garbage_and_requires_auth() {
    let server = TestServer::start();
    let (token, _) = server.register("Carlos", "carlos@example.com");

    let (status, _) = server.post(
        "/api/photos/upload",
        Some(&token),
        serde_json::json!({ "clueNumber": 1, "data": STANDARD.encode(b"not an image") }),
    );
    assert_eq!(status, 400);

    let (status, _) = server.post(
        "/api/photos/upload",
        None,
        serde_json::json!({ "clueNumber": 1, "data": png_base64() }),
    );
    assert_eq!(status, 401);
}

#[test]
fn players_cannot_delete_each_others_photos() {
    let server = TestServer::start();
    let (token_a, _) = server.register("Carlos", "carlos@example.com");
    let (token_b, _) = server.register("Lando", "lando@example.com");

    let (_, body) = server.post(
        "/api/photos/upload",
        Some(&token_a),
        serde_json::json!({ "clueNumber": 2, "data": png_base64() }),
    );
    let photo_id = body["photo"]["id"].as_str().unwrap().to_string();

    let (status, _) = server.delete(&format!("/api/photos/{photo_id}"), Some(&token_b));
    assert_eq!(status, 404);
    // Still there for its owner
    let (_, body) = server.get("/api/photos/my-photos", Some(&token_a));
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);
}

#[test]
fn frame_metadata_endpoints() {
    let server = TestServer::start();

    let (status, body) = server.get("/api/photos/frame/1", None);
    assert_eq!(status, 200);
    assert!(body["filter"]["frameUrl"].is_string());
    assert_eq!(body["filter"]["position"], "bottom");

    let (status, _) = server.get("/api/photos/frame/99", None);
    assert_eq!(status, 404);

    let (status, body) = server.get("/api/photos/filters", None);
    assert_eq!(status, 200);
    let filters = body["filters"].as_array().unwrap();
    assert!(filters.len() >= 8);
    assert_eq!(filters[0]["clueNumber"], 1);
}

#[test]
fn upload_path_traversal_is_blocked() {
    let server = TestServer::start();
    let (status, _) = server.get_raw("/uploads/../Cargo.toml");
    assert_eq!(status, 404);
    let (status, _) = server.get_raw("/uploads/ghost/missing.png");
    assert_eq!(status, 404);
}
