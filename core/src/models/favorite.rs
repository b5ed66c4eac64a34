use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle position of a favorite. `Unfavorited` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FavoriteState {
    Favorited,
    Unfavorited,
}

impl FavoriteState {
    pub fn to_string(&self) -> String {
        match self {
            FavoriteState::Favorited => "favorited".to_string(),
            FavoriteState::Unfavorited => "unfavorited".to_string(),
        }
    }
}

/// One favorite action on an external item, kept as a durable audit row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteRecord {
    /// Assigned by the store on first persistence; `None` means new.
    pub id: Option<i64>,
    pub actor_id: i64,
    pub actor_name: String,
    pub item_id: String,
    /// Free-form context label, passed through untouched.
    pub status: String,
    pub favorited_at: DateTime<Utc>,
    pub unfavorited_at: Option<DateTime<Utc>>,
    pub last_action_at: DateTime<Utc>,
}

impl FavoriteRecord {
    /// Create a new, not yet persisted favorite applied at `now`
    pub fn new(
        item_id: String,
        actor_id: i64,
        actor_name: String,
        status: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            actor_id,
            actor_name,
            item_id,
            status,
            favorited_at: now,
            unfavorited_at: None,
            last_action_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.unfavorited_at.is_none()
    }

    pub fn state(&self) -> FavoriteState {
        if self.is_active() {
            FavoriteState::Favorited
        } else {
            FavoriteState::Unfavorited
        }
    }
}
