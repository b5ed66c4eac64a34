use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Not found: {0}")]
    NotFound(String),
    
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    
    /// The record was never persisted, so there is no row to update.
    #[error("Favorite record has no identity; it must be created before it can be unfavorited")]
    MissingIdentity,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Follow check failed: {0}")]
    FollowCheck(String),
}

impl Error {
    /// Whether a UNIQUE index rejected the write. CHECK and NOT NULL failures are not included.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
