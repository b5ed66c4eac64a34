pub mod error;
pub mod models;
pub mod storage;
pub mod compose;
pub mod lifecycle;

pub use error::{Error, Result};
