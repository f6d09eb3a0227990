use thiserror::Error;

pub mod document;
pub mod notification;

pub use notification::{NotificationStore, SqlNotificationStore};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}
