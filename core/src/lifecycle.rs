//! Favorite lifecycle: `NONE -> FAVORITED -> UNFAVORITED`.
//!
//! Scheduling is pull-based. Nothing expires in the background; an
//! orchestrator periodically asks for [`FavoriteLifecycle::schedule_unfavorite_candidates`]
//! and reverses them with [`FavoriteLifecycle::unfavorite`]. Time is always an
//! explicit argument on the `*_at` operations.
//!
//! The store keeps whole seconds, so every time argument is truncated to the
//! second before it is compared or written. Records handed back to the caller
//! are then identical to the stored rows.
//!
//! Uniqueness of active favorites is enforced twice: the lifecycle checks
//! before inserting, and the store rejects a second active row per item. A
//! storage rejection is reported as [`FavoriteOutcome::AlreadyFavorited`], the
//! same as a failed pre-check, so concurrent writers cannot create duplicates.

use crate::models::FavoriteRecord;
use crate::storage::FavoriteStore;
use crate::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};

/// Result of a favorite attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteOutcome {
    /// A new active record was persisted
    Created(FavoriteRecord),
    /// The item already has an active favorite; nothing was written
    AlreadyFavorited,
}

impl FavoriteOutcome {
    pub fn created(&self) -> bool {
        matches!(self, FavoriteOutcome::Created(_))
    }
}

/// What a sweep did
#[derive(Debug, Default)]
pub struct SweepReport {
    pub unfavorited: Vec<FavoriteRecord>,
    /// Candidates whose transition failed; they stay active for the next sweep
    pub failed: Vec<FavoriteRecord>,
}

pub struct FavoriteLifecycle<S: FavoriteStore> {
    store: S,
}

impl<S: FavoriteStore> FavoriteLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Favorite an item now
    pub fn try_favorite(
        &mut self,
        item_id: &str,
        actor_id: i64,
        actor_name: &str,
        status: &str,
    ) -> Result<FavoriteOutcome> {
        self.try_favorite_at(item_id, actor_id, actor_name, status, Utc::now())
    }

    /// Favorite an item at `now` unless it already has an active favorite
    pub fn try_favorite_at(
        &mut self,
        item_id: &str,
        actor_id: i64,
        actor_name: &str,
        status: &str,
        now: DateTime<Utc>,
    ) -> Result<FavoriteOutcome> {
        if item_id.trim().is_empty() {
            return Err(Error::InvalidInput("Item id must not be empty".to_string()));
        }
        let now = now.trunc_subsecs(0);

        if self.store.exists(item_id)? {
            debug!(item_id, "Item already favorited");
            return Ok(FavoriteOutcome::AlreadyFavorited);
        }

        let mut record = FavoriteRecord::new(
            item_id.to_string(),
            actor_id,
            actor_name.to_string(),
            status.to_string(),
            now,
        );

        match self.store.persist(&mut record) {
            Ok(()) => {
                info!(item_id, actor = actor_name, id = ?record.id, "Favorited item");
                Ok(FavoriteOutcome::Created(record))
            }
            Err(err) if err.is_unique_violation() => {
                warn!(item_id, error = %err, "Item favorited concurrently");
                Ok(FavoriteOutcome::AlreadyFavorited)
            }
            Err(err) => Err(err),
        }
    }

    /// Active favorites applied at or before `max_favorited_at`, least recently
    /// touched first, at most `limit` of them
    pub fn schedule_unfavorite_candidates(
        &self,
        max_favorited_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FavoriteRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let max_favorited_at = max_favorited_at.trunc_subsecs(0);

        let candidates = self.store.query_active_older_than(max_favorited_at, limit)?;
        debug!(count = candidates.len(), %max_favorited_at, "Unfavorite candidates");
        Ok(candidates)
    }

    /// Move a persisted favorite to its terminal state at `when`.
    ///
    /// `record` is updated only after the store acknowledges the write. A
    /// record without identity is a caller bug and fails with
    /// [`Error::MissingIdentity`].
    pub fn unfavorite(&mut self, record: &mut FavoriteRecord, when: DateTime<Utc>) -> Result<()> {
        let id = record.id.filter(|id| *id > 0).ok_or(Error::MissingIdentity)?;
        let when = when.trunc_subsecs(0);

        if !record.is_active() {
            return Err(Error::InvalidTransition(format!(
                "Favorite {} for item {} is already unfavorited",
                id, record.item_id
            )));
        }
        if when < record.favorited_at || when < record.last_action_at {
            return Err(Error::InvalidInput(format!(
                "Cannot unfavorite item {} at {} before its last action at {}",
                record.item_id, when, record.last_action_at
            )));
        }

        self.store.apply_unfavorite(id, when, when)?;

        record.unfavorited_at = Some(when);
        record.last_action_at = when;
        info!(item_id = %record.item_id, id, "Unfavorited item");
        Ok(())
    }

    /// Unfavorite every due candidate at `when`. A failing candidate is logged
    /// and skipped; only the candidate query itself can fail the sweep.
    pub fn sweep(
        &mut self,
        max_favorited_at: DateTime<Utc>,
        limit: usize,
        when: DateTime<Utc>,
    ) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for mut record in self.schedule_unfavorite_candidates(max_favorited_at, limit)? {
            match self.unfavorite(&mut record, when) {
                Ok(()) => report.unfavorited.push(record),
                Err(err) => {
                    warn!(item_id = %record.item_id, error = %err, "Skipping unfavorite");
                    report.failed.push(record);
                }
            }
        }

        Ok(report)
    }

    /// Audit trail for an item, oldest first
    pub fn history(&self, item_id: &str) -> Result<Vec<FavoriteRecord>> {
        self.store.history(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, SqliteFavoriteStore};
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn setup_lifecycle() -> (tempfile::TempDir, FavoriteLifecycle<SqliteFavoriteStore>) {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db"));
        let conn = db.create().unwrap();
        (dir, FavoriteLifecycle::new(SqliteFavoriteStore::new(conn)))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap()
    }

    /// Store whose existence check always misses, to exercise the storage-level guard
    struct BlindStore(SqliteFavoriteStore);

    impl FavoriteStore for BlindStore {
        fn exists(&self, _item_id: &str) -> Result<bool> {
            Ok(false)
        }

        fn persist(&mut self, record: &mut FavoriteRecord) -> Result<()> {
            self.0.persist(record)
        }

        fn query_active_older_than(&self, max: DateTime<Utc>, limit: usize) -> Result<Vec<FavoriteRecord>> {
            self.0.query_active_older_than(max, limit)
        }

        fn apply_unfavorite(&mut self, id: i64, at: DateTime<Utc>, last: DateTime<Utc>) -> Result<()> {
            self.0.apply_unfavorite(id, at, last)
        }

        fn history(&self, item_id: &str) -> Result<Vec<FavoriteRecord>> {
            self.0.history(item_id)
        }
    }

    /// Store whose writes always fail
    struct ReadOnlyStore(SqliteFavoriteStore);

    impl FavoriteStore for ReadOnlyStore {
        fn exists(&self, item_id: &str) -> Result<bool> {
            self.0.exists(item_id)
        }

        fn persist(&mut self, _record: &mut FavoriteRecord) -> Result<()> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
        }

        fn query_active_older_than(&self, max: DateTime<Utc>, limit: usize) -> Result<Vec<FavoriteRecord>> {
            self.0.query_active_older_than(max, limit)
        }

        fn apply_unfavorite(&mut self, _id: i64, _at: DateTime<Utc>, _last: DateTime<Utc>) -> Result<()> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
        }

        fn history(&self, item_id: &str) -> Result<Vec<FavoriteRecord>> {
            self.0.history(item_id)
        }
    }

    #[test]
    fn test_try_favorite_twice() {
        let (_dir, mut lifecycle) = setup_lifecycle();

        let first = lifecycle.try_favorite_at("item-42", 1, "alice", "liked", t0()).unwrap();
        assert!(first.created());
        match first {
            FavoriteOutcome::Created(record) => {
                assert!(record.id.is_some());
                assert_eq!(record.favorited_at, t0());
                assert_eq!(record.last_action_at, t0());
                assert_eq!(record.unfavorited_at, None);
            }
            FavoriteOutcome::AlreadyFavorited => unreachable!(),
        }

        let second = lifecycle.try_favorite_at("item-42", 1, "alice", "liked", t0()).unwrap();
        assert_eq!(second, FavoriteOutcome::AlreadyFavorited);
        assert!(!second.created());
        assert_eq!(lifecycle.history("item-42").unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_attempts_create_once() {
        let (_dir, mut lifecycle) = setup_lifecycle();

        let created = (0..5)
            .map(|i| lifecycle.try_favorite_at("item-7", i, "bob", "", t0() + Duration::minutes(i)).unwrap())
            .filter(FavoriteOutcome::created)
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn test_try_favorite_wall_clock() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        let outcome = lifecycle.try_favorite("item-1", 1, "alice", "").unwrap();
        assert!(outcome.created());
    }

    #[test]
    fn test_try_favorite_rejects_empty_item() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        assert!(matches!(
            lifecycle.try_favorite_at("  ", 1, "alice", "", t0()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_storage_guard_reports_duplicate() {
        let dir = tempdir().unwrap();
        let conn = Database::new(dir.path().join("test.db")).create().unwrap();
        let mut lifecycle = FavoriteLifecycle::new(BlindStore(SqliteFavoriteStore::new(conn)));

        assert!(lifecycle.try_favorite_at("item-9", 1, "alice", "", t0()).unwrap().created());
        assert_eq!(
            lifecycle.try_favorite_at("item-9", 1, "alice", "", t0()).unwrap(),
            FavoriteOutcome::AlreadyFavorited
        );
        assert_eq!(lifecycle.history("item-9").unwrap().len(), 1);
    }

    #[test]
    fn test_persistence_failure_is_surfaced() {
        let mut lifecycle = FavoriteLifecycle::new(ReadOnlyStore(SqliteFavoriteStore::new(
            Database::open_in_memory().unwrap(),
        )));
        assert!(matches!(
            lifecycle.try_favorite_at("item-1", 1, "alice", "", t0()),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_unfavorite_scenario() {
        let (_dir, mut lifecycle) = setup_lifecycle();

        lifecycle.try_favorite_at("item-42", 1, "alice", "liked", t0()).unwrap();
        let bound = t0() + Duration::hours(25);

        let mut candidates = lifecycle.schedule_unfavorite_candidates(bound, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].item_id, "item-42");

        let mut record = candidates.remove(0);
        lifecycle.unfavorite(&mut record, bound).unwrap();
        assert_eq!(record.unfavorited_at, Some(bound));
        assert_eq!(record.last_action_at, bound);

        let stored = &lifecycle.history("item-42").unwrap()[0];
        assert_eq!(stored.unfavorited_at, Some(bound));
        assert_eq!(stored.last_action_at, bound);
        assert!(stored.unfavorited_at.unwrap() >= stored.favorited_at);

        assert!(lifecycle.schedule_unfavorite_candidates(bound, 10).unwrap().is_empty());
    }

    #[test]
    fn test_candidates_exclude_recent_favorites() {
        let (_dir, mut lifecycle) = setup_lifecycle();

        lifecycle.try_favorite_at("old", 1, "alice", "", t0()).unwrap();
        lifecycle.try_favorite_at("new", 1, "alice", "", t0() + Duration::hours(20)).unwrap();

        let due = lifecycle
            .schedule_unfavorite_candidates(t0() + Duration::hours(4), 10)
            .unwrap();
        let items: Vec<_> = due.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(items, vec!["old"]);
        assert!(lifecycle.schedule_unfavorite_candidates(t0(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_sub_second_times_match_stored_rows() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        let favorited = t0() + Duration::milliseconds(900);

        let record = match lifecycle.try_favorite_at("item-1", 1, "alice", "", favorited).unwrap() {
            FavoriteOutcome::Created(record) => record,
            FavoriteOutcome::AlreadyFavorited => unreachable!(),
        };
        assert_eq!(record.favorited_at, t0());
        assert_eq!(record, lifecycle.history("item-1").unwrap()[0]);

        let bound = t0() + Duration::milliseconds(400);
        let mut due = lifecycle.schedule_unfavorite_candidates(bound, 10).unwrap();
        assert_eq!(due.len(), 1);
        assert!(due.iter().all(|r| r.favorited_at <= bound));
        assert!(lifecycle
            .schedule_unfavorite_candidates(t0() - Duration::milliseconds(100), 10)
            .unwrap()
            .is_empty());

        let when = t0() + Duration::hours(1) + Duration::milliseconds(950);
        let mut candidate = due.remove(0);
        lifecycle.unfavorite(&mut candidate, when).unwrap();

        let stored = lifecycle.history("item-1").unwrap().remove(0);
        assert_eq!(stored.unfavorited_at, Some(t0() + Duration::hours(1)));
        assert_eq!(stored.last_action_at, t0() + Duration::hours(1));
        assert_eq!(candidate, stored);
    }

    #[test]
    fn test_candidates_sorted_by_last_action() {
        let (_dir, mut lifecycle) = setup_lifecycle();

        for (i, item) in ["c", "a", "b"].iter().enumerate() {
            lifecycle
                .try_favorite_at(item, 1, "alice", "", t0() + Duration::minutes(i as i64))
                .unwrap();
        }

        let due = lifecycle.schedule_unfavorite_candidates(t0() + Duration::days(2), 10).unwrap();
        assert_eq!(due.len(), 3);
        assert!(due.windows(2).all(|w| w[0].last_action_at <= w[1].last_action_at));
        assert!(due.iter().all(|r| r.unfavorited_at.is_none()));
        assert_eq!(due[0].item_id, "c");
    }

    #[test]
    fn test_unfavorite_requires_identity() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        let mut record = FavoriteRecord::new("item-1".to_string(), 1, "alice".to_string(), String::new(), t0());

        assert!(matches!(
            lifecycle.unfavorite(&mut record, t0() + Duration::hours(1)),
            Err(Error::MissingIdentity)
        ));
        assert!(record.is_active());
    }

    #[test]
    fn test_unfavorite_is_terminal() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        lifecycle.try_favorite_at("item-1", 1, "alice", "", t0()).unwrap();

        let mut record = lifecycle.history("item-1").unwrap().remove(0);
        let mut stale_copy = record.clone();
        lifecycle.unfavorite(&mut record, t0() + Duration::hours(1)).unwrap();

        assert!(matches!(
            lifecycle.unfavorite(&mut record, t0() + Duration::hours(2)),
            Err(Error::InvalidTransition(_))
        ));
        // A stale in-memory copy is still rejected by the store
        assert!(matches!(
            lifecycle.unfavorite(&mut stale_copy, t0() + Duration::hours(2)),
            Err(Error::InvalidTransition(_))
        ));
        assert!(stale_copy.is_active());
        assert_eq!(
            lifecycle.history("item-1").unwrap()[0].unfavorited_at,
            Some(t0() + Duration::hours(1))
        );
    }

    #[test]
    fn test_unfavorite_rejects_time_going_backwards() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        lifecycle.try_favorite_at("item-1", 1, "alice", "", t0()).unwrap();
        let mut record = lifecycle.history("item-1").unwrap().remove(0);

        assert!(matches!(
            lifecycle.unfavorite(&mut record, t0() - Duration::seconds(1)),
            Err(Error::InvalidInput(_))
        ));
        assert!(record.is_active());
    }

    #[test]
    fn test_failed_write_leaves_record_unchanged() {
        let conn = Database::open_in_memory().unwrap();
        let mut inner = SqliteFavoriteStore::new(conn);
        let mut record = FavoriteRecord::new("item-1".to_string(), 1, "alice".to_string(), String::new(), t0());
        inner.persist(&mut record).unwrap();

        let mut lifecycle = FavoriteLifecycle::new(ReadOnlyStore(inner));
        let before = record.clone();
        assert!(lifecycle.unfavorite(&mut record, t0() + Duration::hours(30)).is_err());
        assert_eq!(record, before);
        assert!(lifecycle.history("item-1").unwrap()[0].is_active());
    }

    #[test]
    fn test_refavorite_after_unfavorite_creates_new_record() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        lifecycle.try_favorite_at("item-1", 1, "alice", "", t0()).unwrap();
        lifecycle.sweep(t0(), 10, t0() + Duration::hours(25)).unwrap();

        let again = lifecycle.try_favorite_at("item-1", 1, "alice", "", t0() + Duration::hours(26)).unwrap();
        assert!(again.created());

        let history = lifecycle.history("item-1").unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_active());
        assert!(history[1].is_active());
    }

    #[test]
    fn test_sweep() {
        let (_dir, mut lifecycle) = setup_lifecycle();
        for (i, item) in ["a", "b", "c"].iter().enumerate() {
            lifecycle
                .try_favorite_at(item, 1, "alice", "", t0() + Duration::minutes(i as i64))
                .unwrap();
        }

        let when = t0() + Duration::hours(25);
        let report = lifecycle.sweep(t0() + Duration::hours(1), 2, when).unwrap();
        assert_eq!(report.unfavorited.len(), 2);
        assert!(report.failed.is_empty());
        assert!(report.unfavorited.iter().all(|r| r.unfavorited_at == Some(when)));

        let remaining = lifecycle.schedule_unfavorite_candidates(t0() + Duration::hours(1), 10).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item_id, "c");
    }

    #[test]
    fn test_sweep_skips_failures() {
        let conn = Database::open_in_memory().unwrap();
        let mut inner = SqliteFavoriteStore::new(conn);
        let mut record = FavoriteRecord::new("item-1".to_string(), 1, "alice".to_string(), String::new(), t0());
        inner.persist(&mut record).unwrap();

        let mut lifecycle = FavoriteLifecycle::new(ReadOnlyStore(inner));
        let report = lifecycle.sweep(t0(), 10, t0() + Duration::hours(25)).unwrap();
        assert!(report.unfavorited.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].item_id, "item-1");
    }
}
