mod database;
mod favorite_repository;
mod favorite_store;

pub use database::{Database, Connection, DEFAULT_BUSY_TIMEOUT};
pub use favorite_repository::FavoriteRepository;
pub use favorite_store::{FavoriteStore, SqliteFavoriteStore};
