use super::{Connection, FavoriteRepository};
use crate::models::FavoriteRecord;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Persistence contract consumed by the favorite lifecycle.
///
/// Implementations own the persisted representation. Each call is a single
/// self-contained mutation or query; an update either fully applies or leaves
/// the record unchanged.
pub trait FavoriteStore {
    /// True if an active (not unfavorited) record exists for the item
    fn exists(&self, item_id: &str) -> Result<bool>;

    /// Insert when the record has no identity (assigning one), otherwise update it by identity.
    ///
    /// Inserting a second active record for an item must fail with an error
    /// for which [`Error::is_unique_violation`] is true.
    fn persist(&mut self, record: &mut FavoriteRecord) -> Result<()>;

    /// Distinct active records favorited at or before `max_favorited_at`,
    /// ordered by `last_action_at` ascending, at most `limit` of them
    fn query_active_older_than(
        &self,
        max_favorited_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FavoriteRecord>>;

    /// Narrow update used by the unfavorite transition
    fn apply_unfavorite(
        &mut self,
        id: i64,
        unfavorited_at: DateTime<Utc>,
        last_action_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Every record ever written for the item, oldest first
    fn history(&self, item_id: &str) -> Result<Vec<FavoriteRecord>>;
}

/// SQLite-backed [`FavoriteStore`] owning its connection
pub struct SqliteFavoriteStore {
    conn: Connection,
}

impl SqliteFavoriteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl FavoriteStore for SqliteFavoriteStore {
    fn exists(&self, item_id: &str) -> Result<bool> {
        FavoriteRepository::exists_active(&self.conn, item_id)
    }

    fn persist(&mut self, record: &mut FavoriteRecord) -> Result<()> {
        match record.id {
            None => {
                let id = FavoriteRepository::create(&self.conn, record)?;
                record.id = Some(id);
                Ok(())
            }
            Some(_) => FavoriteRepository::update(&self.conn, record),
        }
    }

    fn query_active_older_than(
        &self,
        max_favorited_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FavoriteRecord>> {
        FavoriteRepository::get_not_unfavorited(&self.conn, &max_favorited_at, limit)
    }

    fn apply_unfavorite(
        &mut self,
        id: i64,
        unfavorited_at: DateTime<Utc>,
        last_action_at: DateTime<Utc>,
    ) -> Result<()> {
        if id <= 0 {
            return Err(Error::MissingIdentity);
        }
        FavoriteRepository::apply_unfavorite(&self.conn, id, &unfavorited_at, &last_action_at)
    }

    fn history(&self, item_id: &str) -> Result<Vec<FavoriteRecord>> {
        FavoriteRepository::get_by_item_id(&self.conn, item_id)
    }
}
