//! Photo upload and storage
//!
//! Uploads arrive as base64 payloads (optionally a full data URL), get
//! size-capped and probed as real PNG/JPEG images, then land on disk under
//! the uploads directory with a row in the photo table.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;
use uuid::Uuid;

use crate::domain::{Photo, StepId};
use crate::error::AppError;
use crate::store::PhotoStore;

/// Fallback coordinates when an upload carries none (downtown Boston)
pub const DEFAULT_LATITUDE: f64 = 42.3601;
pub const DEFAULT_LONGITUDE: f64 = -71.0589;

/// Photo upload service
#[derive(Clone)]
pub struct PhotoService {
    store: PhotoStore,
    uploads_dir: PathBuf,
    max_photo_bytes: usize,
}

impl PhotoService {
    pub fn new(store: PhotoStore, uploads_dir: PathBuf, max_photo_bytes: usize) -> Self {
        Self {
            store,
            uploads_dir,
            max_photo_bytes,
        }
    }

    /// Decode, validate and store an uploaded photo
    pub fn upload(
        &self,
        username: &str,
        clue_number: StepId,
        data: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Photo, AppError> {
        let bytes = decode_payload(data)?;
        if bytes.is_empty() {
            return Err(AppError::Invalid("No photo provided".to_string()));
        }
        if bytes.len() > self.max_photo_bytes {
            return Err(AppError::Invalid("Photo is too large".to_string()));
        }

        let format = image::guess_format(&bytes)
            .map_err(|_| AppError::Invalid("Only image files are allowed".to_string()))?;
        let ext = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            _ => return Err(AppError::Invalid("Only image files are allowed".to_string())),
        };
        // Decode probe: a matching magic number is not enough
        image::load_from_memory_with_format(&bytes, format)
            .map_err(|_| AppError::Invalid("Only image files are allowed".to_string()))?;

        let id = Uuid::new_v4().to_string();
        let player_dir = self.uploads_dir.join(username);
        fs::create_dir_all(&player_dir)
            .with_context(|| format!("Failed to create uploads dir: {}", player_dir.display()))
            .map_err(AppError::Internal)?;

        let file_name = format!("{id}.{ext}");
        let file_path = player_dir.join(&file_name);
        fs::write(&file_path, &bytes)
            .with_context(|| format!("Failed to write photo: {}", file_path.display()))
            .map_err(AppError::Internal)?;

        let photo = Photo {
            id,
            clue_number,
            url: format!("/uploads/{username}/{file_name}"),
            latitude: latitude.unwrap_or(DEFAULT_LATITUDE),
            longitude: longitude.unwrap_or(DEFAULT_LONGITUDE),
            taken_at: chrono::Utc::now().timestamp_millis(),
        };
        self.store
            .insert(username, &photo, &file_path.to_string_lossy())?;
        Ok(photo)
    }

    /// A player's photos, newest first
    pub fn my_photos(&self, username: &str) -> Result<Vec<Photo>, AppError> {
        Ok(self.store.list_for(username)?)
    }

    /// Delete a photo the player owns, row and file both
    pub fn delete(&self, username: &str, photo_id: &str) -> Result<(), AppError> {
        let file_path = self
            .store
            .delete_for_owner(photo_id, username)?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;
        // The row is gone; a missing file is nothing to report
        let _ = fs::remove_file(file_path);
        Ok(())
    }

    /// Resolve a `/uploads/...` request path to a file inside the uploads
    /// directory. Returns `None` for traversal attempts or missing files.
    pub fn resolve_upload(&self, request_path: &str) -> Option<PathBuf> {
        let relative = request_path.strip_prefix("/uploads/")?;
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        let full = self.uploads_dir.join(relative);
        if full.is_file() {
            Some(full)
        } else {
            None
        }
    }
}

/// Strip an optional data-URL prefix and base64-decode the payload
fn decode_payload(data: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match data.split_once("base64,") {
        Some((_, rest)) => rest,
        None => data,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Invalid("Photo data is not valid base64".to_string()))
}
