pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod workflow;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::SeedResult;
pub use repositories::{NotificationStore, RepositoryError, SqlNotificationStore};
pub use workflow::{ApprovalWorkflow, EngineError, ListFilter};
