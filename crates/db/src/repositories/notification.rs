use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use signoff_core::domain::document::DocumentId;
use signoff_core::domain::notification::{Notification, NotificationKind, NotificationRequest};
use signoff_core::domain::user::UserId;
use signoff_core::notify::{NotificationSink, NotifyError};

use super::RepositoryError;
use crate::DbPool;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, request: NotificationRequest) -> Result<Notification, RepositoryError>;
    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, RepositoryError>;
    /// Returns false when the id is unknown.
    async fn mark_read(&self, id: i64) -> Result<bool, RepositoryError>;
}

pub struct SqlNotificationStore {
    pool: DbPool,
}

impl SqlNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification, RepositoryError> {
    let kind: String = row.try_get("kind")?;
    let created_at: String = row.try_get("created_at")?;
    let related_id: Option<i64> = row.try_get("related_id")?;

    Ok(Notification {
        id: row.try_get("id")?,
        user_id: UserId(row.try_get("user_id")?),
        kind: NotificationKind::parse(&kind)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown notification kind `{kind}`")))?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        related_id: related_id.map(DocumentId),
        link: row.try_get("link")?,
        is_read: row.try_get::<i64, _>("is_read")? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::Decode(format!("bad timestamp in created_at: {e}")))?,
    })
}

#[async_trait]
impl NotificationStore for SqlNotificationStore {
    async fn create(&self, request: NotificationRequest) -> Result<Notification, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO notification (user_id, kind, title, body, related_id, link, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.user_id.0)
        .bind(request.kind.as_str())
        .bind(&request.title)
        .bind(&request.body)
        .bind(request.related_id.map(|id| id.0))
        .bind(&request.link)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id: result.last_insert_rowid(),
            user_id: request.user_id,
            kind: request.kind,
            title: request.title,
            body: request.body,
            related_id: request.related_id,
            link: request.link,
            is_read: false,
            created_at,
        })
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let query = if unread_only {
            "SELECT id, user_id, kind, title, body, related_id, link, is_read, created_at
             FROM notification WHERE user_id = ? AND is_read = 0
             ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT id, user_id, kind, title, body, related_id, link, is_read, created_at
             FROM notification WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        };

        let rows = sqlx::query(query).bind(user_id.0).fetch_all(&self.pool).await?;
        rows.iter().map(notification_from_row).collect()
    }

    async fn mark_read(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE notification SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Lets the workflow engine fan out decisions as notification rows, which
/// is all "delivery" means here. Errors are surfaced as `NotifyError` so
/// the engine can contain them.
#[async_trait]
impl NotificationSink for SqlNotificationStore {
    async fn deliver(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        self.create(request)
            .await
            .map(|_| ())
            .map_err(|error| NotifyError::Delivery(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use signoff_core::domain::document::DocumentId;
    use signoff_core::domain::notification::NotificationRequest;
    use signoff_core::domain::user::UserId;

    use super::{NotificationStore, SqlNotificationStore};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn request(user: i64, title: &str) -> NotificationRequest {
        NotificationRequest::for_document(
            UserId(user),
            DocumentId(1),
            title,
            "'Quarterly budget' is waiting for your sign-off.",
        )
    }

    #[tokio::test]
    async fn create_and_list_for_user() {
        let pool = setup().await;
        let store = SqlNotificationStore::new(pool);

        store.create(request(1, "New approval request")).await.expect("create 1");
        store.create(request(1, "Approval granted")).await.expect("create 2");
        store.create(request(2, "New approval request")).await.expect("create other user");

        let mine = store.list_for_user(UserId(1), false).await.expect("list");
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|n| n.user_id == UserId(1)));
        assert_eq!(mine[0].link.as_deref(), Some("/approvals/1"));
    }

    #[tokio::test]
    async fn mark_read_filters_out_of_unread_listing() {
        let pool = setup().await;
        let store = SqlNotificationStore::new(pool);

        let first = store.create(request(1, "New approval request")).await.expect("create");
        store.create(request(1, "Approval granted")).await.expect("create");

        assert!(store.mark_read(first.id).await.expect("mark read"));

        let unread = store.list_for_user(UserId(1), true).await.expect("list unread");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Approval granted");
    }

    #[tokio::test]
    async fn mark_read_reports_unknown_ids() {
        let pool = setup().await;
        let store = SqlNotificationStore::new(pool);
        assert!(!store.mark_read(999).await.expect("mark read"));
    }
}
