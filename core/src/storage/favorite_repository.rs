use crate::models::{FavoriteRecord, datetime_to_timestamp, timestamp_to_datetime};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const FAVORITE_FIELDS: &str =
    "id, actor_id, actor_name, item_id, status, favorited_at, unfavorited_at, last_action_at";

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Insert a new favorite and return its assigned id
    pub fn create(conn: &Connection, favorite: &FavoriteRecord) -> Result<i64> {
        if favorite.id.is_some() {
            return Err(Error::InvalidInput(format!(
                "Favorite for {} is already persisted",
                favorite.item_id
            )));
        }
        check_dates(favorite)?;

        conn.execute(
            "INSERT INTO favorites (actor_id, actor_name, item_id, status, favorited_at, unfavorited_at, last_action_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                favorite.actor_id,
                favorite.actor_name,
                favorite.item_id,
                favorite.status,
                datetime_to_timestamp(&favorite.favorited_at),
                favorite.unfavorited_at.as_ref().map(datetime_to_timestamp),
                datetime_to_timestamp(&favorite.last_action_at),
            ],
        )?;
        
        Ok(conn.last_insert_rowid())
    }

    /// Rewrite every mutable column of a persisted favorite
    pub fn update(conn: &Connection, favorite: &FavoriteRecord) -> Result<()> {
        let id = favorite.id.ok_or(Error::MissingIdentity)?;
        check_dates(favorite)?;

        let rows_affected = conn.execute(
            "UPDATE favorites SET actor_id = ?1, actor_name = ?2, item_id = ?3, status = ?4,
                favorited_at = ?5, unfavorited_at = ?6, last_action_at = ?7
             WHERE id = ?8",
            params![
                favorite.actor_id,
                favorite.actor_name,
                favorite.item_id,
                favorite.status,
                datetime_to_timestamp(&favorite.favorited_at),
                favorite.unfavorited_at.as_ref().map(datetime_to_timestamp),
                datetime_to_timestamp(&favorite.last_action_at),
                id,
            ],
        )?;
        
        if rows_affected == 0 {
            return Err(Error::NotFound(format!("Favorite not found: {}", id)));
        }
        
        Ok(())
    }

    /// Mark an active favorite as unfavorited. Already-unfavorited rows are left untouched.
    pub fn apply_unfavorite(
        conn: &Connection,
        id: i64,
        unfavorited_at: &DateTime<Utc>,
        last_action_at: &DateTime<Utc>,
    ) -> Result<()> {
        let rows_affected = conn.execute(
            "UPDATE favorites SET unfavorited_at = ?1, last_action_at = ?2
             WHERE id = ?3 AND unfavorited_at IS NULL",
            params![
                datetime_to_timestamp(unfavorited_at),
                datetime_to_timestamp(last_action_at),
                id,
            ],
        )?;

        if rows_affected == 0 {
            // Distinguish a missing row from one that already reached the terminal state
            let existing = Self::get_by_id(conn, id)?;
            return Err(Error::InvalidTransition(format!(
                "Favorite {} for item {} is already unfavorited",
                id, existing.item_id
            )));
        }

        Ok(())
    }

    /// Check if an item has an active (not unfavorited) favorite
    pub fn exists_active(conn: &Connection, item_id: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE item_id = ?1 AND unfavorited_at IS NULL",
            params![item_id],
            |row| row.get(0),
        )?;
        
        Ok(count > 0)
    }

    /// Get a favorite by id
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<FavoriteRecord> {
        let sql = format!("SELECT {} FROM favorites WHERE id = ?1", FAVORITE_FIELDS);
        conn.query_row(&sql, params![id], map_favorite)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Favorite not found: {}", id)))
    }

    /// Full history for an item, oldest favorite first
    pub fn get_by_item_id(conn: &Connection, item_id: &str) -> Result<Vec<FavoriteRecord>> {
        let sql = format!(
            "SELECT {} FROM favorites WHERE item_id = ?1 ORDER BY favorited_at, id",
            FAVORITE_FIELDS
        );
        let mut stmt = conn.prepare(&sql)?;

        let favorites = stmt.query_map(params![item_id], map_favorite)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(favorites)
    }

    /// Active favorites applied at or before `max_favorited_at`, least recently touched first
    pub fn get_not_unfavorited(
        conn: &Connection,
        max_favorited_at: &DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FavoriteRecord>> {
        let sql = format!(
            "SELECT DISTINCT {} FROM favorites
             WHERE unfavorited_at IS NULL AND favorited_at <= ?1
             ORDER BY last_action_at, id LIMIT ?2",
            FAVORITE_FIELDS
        );
        let mut stmt = conn.prepare(&sql)?;
        
        let favorites = stmt.query_map(
            params![datetime_to_timestamp(max_favorited_at), limit],
            map_favorite,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
        
        Ok(favorites)
    }
}

fn map_favorite(row: &Row<'_>) -> rusqlite::Result<FavoriteRecord> {
    Ok(FavoriteRecord {
        id: Some(row.get(0)?),
        actor_id: row.get(1)?,
        actor_name: row.get(2)?,
        item_id: row.get(3)?,
        status: row.get(4)?,
        favorited_at: timestamp_to_datetime(row.get(5)?),
        unfavorited_at: row.get::<_, Option<i64>>(6)?.map(timestamp_to_datetime),
        last_action_at: timestamp_to_datetime(row.get(7)?),
    })
}

fn check_dates(favorite: &FavoriteRecord) -> Result<()> {
    if let Some(unfavorited_at) = favorite.unfavorited_at {
        if unfavorited_at < favorite.favorited_at {
            return Err(Error::InvalidInput(format!(
                "Favorite for {} cannot be unfavorited before it was favorited",
                favorite.item_id
            )));
        }
    }
    Ok(())
}
