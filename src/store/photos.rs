//! Hunt photo repository

use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::Photo;
use crate::store::HuntDb;

/// A photo row including its on-disk location
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub photo: Photo,
    pub username: String,
    pub file_path: String,
}

/// Repository for uploaded photos
#[derive(Clone)]
pub struct PhotoStore {
    db: HuntDb,
}

impl PhotoStore {
    pub fn new(db: HuntDb) -> Self {
        Self { db }
    }

    pub fn insert(&self, username: &str, photo: &Photo, file_path: &str) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO photos (id, username, step_id, file_path, url, latitude, longitude, taken_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                photo.id,
                username,
                photo.clue_number,
                file_path,
                photo.url,
                photo.latitude,
                photo.longitude,
                photo.taken_at
            ],
        )?;
        Ok(())
    }

    /// A player's photos, newest first
    pub fn list_for(&self, username: &str) -> Result<Vec<Photo>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, step_id, url, latitude, longitude, taken_at
             FROM photos WHERE username = ?1 ORDER BY taken_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![username], |row| {
            Ok(Photo {
                id: row.get(0)?,
                clue_number: row.get(1)?,
                url: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
                taken_at: row.get(5)?,
            })
        })?;
        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    /// Look up one photo regardless of owner
    pub fn get(&self, photo_id: &str) -> Result<Option<StoredPhoto>> {
        let conn = self.db.conn();
        let photo = conn
            .query_row(
                "SELECT id, step_id, url, latitude, longitude, taken_at, username, file_path
                 FROM photos WHERE id = ?1",
                params![photo_id],
                row_to_stored,
            )
            .optional()?;
        Ok(photo)
    }

    /// Delete a photo owned by the given player; returns its disk path
    pub fn delete_for_owner(&self, photo_id: &str, username: &str) -> Result<Option<String>> {
        let conn = self.db.conn();
        let path: Option<String> = conn
            .query_row(
                "SELECT file_path FROM photos WHERE id = ?1 AND username = ?2",
                params![photo_id, username],
                |row| row.get(0),
            )
            .optional()?;
        if path.is_some() {
            conn.execute(
                "DELETE FROM photos WHERE id = ?1 AND username = ?2",
                params![photo_id, username],
            )?;
        }
        Ok(path)
    }
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredPhoto> {
    Ok(StoredPhoto {
        photo: Photo {
            id: row.get(0)?,
            clue_number: row.get(1)?,
            url: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            taken_at: row.get(5)?,
        },
        username: row.get(6)?,
        file_path: row.get(7)?,
    })
}
