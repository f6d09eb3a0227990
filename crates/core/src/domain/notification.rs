use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentId;
use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Approval,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approval => "approval",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approval" => Some(Self::Approval),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A request to notify one user. Delivery is fire-and-forget record
/// creation; the workflow never blocks on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_id: Option<DocumentId>,
    pub link: Option<String>,
}

impl NotificationRequest {
    pub fn for_document(
        user_id: UserId,
        document_id: DocumentId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind: NotificationKind::Approval,
            title: title.into(),
            body: body.into(),
            related_id: Some(document_id),
            link: Some(format!("/approvals/{}", document_id.0)),
        }
    }
}

/// A delivered notification record, as read back from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_id: Option<DocumentId>,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
