//! Gift shop repository
//!
//! Purchases run inside a single transaction with guarded updates: the stock
//! decrement and the points debit each carry their own WHERE condition, so a
//! concurrent purchase can never oversell a gift or drive a balance negative.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Purchase;
use crate::error::AppError;
use crate::store::HuntDb;

/// A gift as listed in the shop (stock -1 means unlimited)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "pointsCost")]
    pub cost: i64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock: i64,
    #[serde(rename = "isAvailable")]
    pub available: bool,
}

/// Result of a successful purchase
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub gift_name: String,
    pub gift_description: String,
    pub points_spent: i64,
    pub remaining_points: i64,
}

/// Repository for gifts and purchases
#[derive(Clone)]
pub struct ShopStore {
    db: HuntDb,
}

impl ShopStore {
    pub fn new(db: HuntDb) -> Self {
        Self { db }
    }

    /// Gifts a player can buy right now, cheapest first
    pub fn list_available(&self) -> Result<Vec<Gift>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, cost, category, image_url, stock, available
             FROM gifts WHERE available = 1 AND (stock = -1 OR stock > 0)
             ORDER BY cost ASC",
        )?;
        let rows = stmt.query_map([], row_to_gift)?;
        let mut gifts = Vec::new();
        for row in rows {
            gifts.push(row?);
        }
        Ok(gifts)
    }

    pub fn get(&self, gift_id: &str) -> Result<Option<Gift>> {
        let conn = self.db.conn();
        let gift = conn
            .query_row(
                "SELECT id, name, description, cost, category, image_url, stock, available
                 FROM gifts WHERE id = ?1",
                params![gift_id],
                row_to_gift,
            )
            .optional()?;
        Ok(gift)
    }

    /// Buy a gift: debit points, decrement stock, record the purchase.
    ///
    /// All three writes happen in one transaction. The debit and the stock
    /// decrement are conditional updates; zero changed rows means another
    /// request got there first and this one is rejected.
    pub fn purchase(&self, username: &str, gift_id: &str) -> Result<PurchaseOutcome, AppError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;

        let gift = tx
            .query_row(
                "SELECT id, name, description, cost, category, image_url, stock, available
                 FROM gifts WHERE id = ?1",
                params![gift_id],
                row_to_gift,
            )
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Gift not found".to_string()))?;

        if !gift.available {
            return Err(AppError::Invalid("Gift is not available".to_string()));
        }

        if gift.stock != -1 {
            let taken = tx
                .execute(
                    "UPDATE gifts SET stock = stock - 1,
                            available = CASE WHEN stock - 1 <= 0 THEN 0 ELSE available END
                     WHERE id = ?1 AND stock > 0",
                    params![gift_id],
                )
                .map_err(AppError::from)?;
            if taken == 0 {
                return Err(AppError::Invalid("Gift is out of stock".to_string()));
            }
        }

        let debited = tx
            .execute(
                "UPDATE players SET available_points = available_points - ?1, updated_at = ?2
                 WHERE username = ?3 AND available_points >= ?1",
                params![gift.cost, now, username],
            )
            .map_err(AppError::from)?;
        if debited == 0 {
            return Err(AppError::Insufficient("Insufficient points".to_string()));
        }

        tx.execute(
            "INSERT INTO purchases (id, username, gift_id, gift_name, cost, purchased_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                username,
                gift.id,
                gift.name,
                gift.cost,
                now
            ],
        )
        .map_err(AppError::from)?;

        let remaining: i64 = tx
            .query_row(
                "SELECT available_points FROM players WHERE username = ?1",
                params![username],
                |r| r.get(0),
            )
            .map_err(AppError::from)?;

        tx.commit().map_err(AppError::from)?;

        Ok(PurchaseOutcome {
            gift_name: gift.name,
            gift_description: gift.description,
            points_spent: gift.cost,
            remaining_points: remaining,
        })
    }

    /// A player's purchase history, newest first
    pub fn history(&self, username: &str) -> Result<Vec<Purchase>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, gift_id, gift_name, cost, purchased_at
             FROM purchases WHERE username = ?1 ORDER BY purchased_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![username], |row| {
            Ok(Purchase {
                id: row.get(0)?,
                gift_id: row.get(1)?,
                gift_name: row.get(2)?,
                cost: row.get(3)?,
                purchased_at: row.get(4)?,
            })
        })?;
        let mut purchases = Vec::new();
        for row in rows {
            purchases.push(row?);
        }
        Ok(purchases)
    }

    /// Insert the default mystery gifts; no-op once anything exists
    pub fn seed_defaults(&self) -> Result<bool> {
        let conn = self.db.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM gifts", [], |r| r.get(0))?;
        if count > 0 {
            return Ok(false);
        }

        let now = chrono::Utc::now().timestamp_millis();
        let defaults: [(&str, i64); 6] = [
            ("Gift A", 50),
            ("Gift B", 75),
            ("Gift C", 100),
            ("Gift D", 150),
            ("Gift E", 200),
            ("Gift F", 300),
        ];
        for (name, cost) in defaults {
            conn.execute(
                "INSERT INTO gifts (id, name, description, cost, category, image_url, stock, available, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'mystery', '/images/mystery-gift.png', -1, 1, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    name,
                    "Mystery gift - details to be revealed!",
                    cost,
                    now
                ],
            )?;
        }
        Ok(true)
    }
}

fn row_to_gift(row: &rusqlite::Row<'_>) -> rusqlite::Result<Gift> {
    let available: i64 = row.get(7)?;
    Ok(Gift {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        cost: row.get(3)?,
        category: row.get(4)?,
        image_url: row.get(5)?,
        stock: row.get(6)?,
        available: available != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> HuntDb {
        let db = HuntDb::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO players (username, name, email, password_hash, password_salt, role,
                                      total_score, available_points, current_step, current_game_index,
                                      created_at, updated_at)
                 VALUES ('raj42', 'Raj', 'raj@example.com', 'h', 's', 'player', 0, 120, NULL, 0, 0, 0)",
                [],
            )
            .unwrap();
        db
    }

    fn add_gift(db: &HuntDb, id: &str, cost: i64, stock: i64) {
        db.conn()
            .execute(
                "INSERT INTO gifts (id, name, description, cost, category, image_url, stock, available, created_at)
                 VALUES (?1, ?2, 'Test gift', ?3, 'mystery', NULL, ?4, 1, 0)",
                params![id, format!("Gift {id}"), cost, stock],
            )
            .unwrap();
    }

    #[test]
    fn test_seed_defaults_once() {
        let store = ShopStore::new(test_db());
        assert!(store.seed_defaults().unwrap());
        assert!(!store.seed_defaults().unwrap());

        let gifts = store.list_available().unwrap();
        assert_eq!(gifts.len(), 6);
        assert_eq!(gifts[0].cost, 50);
        assert_eq!(gifts[5].cost, 300);
    }

    #[test]
    fn test_purchase_debits_balance() {
        let db = test_db();
        add_gift(&db, "g1", 100, -1);
        let store = ShopStore::new(db.clone());

        let outcome = store.purchase("raj42", "g1").unwrap();
        assert_eq!(outcome.points_spent, 100);
        assert_eq!(outcome.remaining_points, 20);

        let history = store.history("raj42").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].gift_id, "g1");
    }

    #[test]
    fn test_purchase_insufficient_points() {
        let db = test_db();
        add_gift(&db, "g1", 500, -1);
        let store = ShopStore::new(db);

        let err = store.purchase("raj42", "g1").unwrap_err();
        assert!(matches!(err, AppError::Insufficient(_)));
        assert!(store.history("raj42").unwrap().is_empty());
    }

    #[test]
    fn test_purchase_unknown_gift() {
        let store = ShopStore::new(test_db());
        let err = store.purchase("raj42", "nope").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_stock_runs_out() {
        let db = test_db();
        add_gift(&db, "g1", 10, 1);
        let store = ShopStore::new(db);

        store.purchase("raj42", "g1").unwrap();
        let err = store.purchase("raj42", "g1").unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));

        // Sold out gifts drop off the shop listing
        assert!(store.list_available().unwrap().is_empty());
    }

    #[test]
    fn test_failed_purchase_rolls_back_stock() {
        let db = test_db();
        add_gift(&db, "g1", 500, 1);
        let store = ShopStore::new(db);

        assert!(store.purchase("raj42", "g1").is_err());
        // Debit failed after the stock decrement; the rollback must restore it
        let gift = store.get("g1").unwrap().unwrap();
        assert_eq!(gift.stock, 1);
        assert!(gift.available);
    }
}
