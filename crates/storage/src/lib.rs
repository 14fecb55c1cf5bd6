pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use database::Database;
pub use error::{Result, StorageError};
pub use repository::session::{PgSession, PgStore};
pub use store::{ResultFilter, ResultLinks, ResultStore, StoreSession};
