//! Row decoding and read queries shared by the workflow engine. Writes go
//! through the engine's transactions in `crate::workflow`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use signoff_core::docnum::DocumentNumber;
use signoff_core::domain::document::{
    ApprovalDocument, DocumentId, DocumentStatus, DocumentType, Priority,
};
use signoff_core::domain::line::{ApprovalLine, LineId, LineStatus};
use signoff_core::domain::user::UserId;

use super::RepositoryError;

pub(crate) const DOCUMENT_COLUMNS: &str = "id, number, title, content, author_id, doc_type, \
     priority, status, reference_users, attachments, created_at";

pub(crate) const DOCUMENT_COLUMNS_PREFIXED: &str = "d.id, d.number, d.title, d.content, \
     d.author_id, d.doc_type, d.priority, d.status, d.reference_users, d.attachments, d.created_at";

pub(crate) const LINE_COLUMNS: &str =
    "id, document_id, approver_id, sign_order, status, comment, decided_at";

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("bad timestamp in {column}: {e}")))
}

fn parse_user_list(value: Option<String>) -> Result<Vec<UserId>, RepositoryError> {
    match value {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| RepositoryError::Decode(format!("bad user list: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn parse_string_list(value: Option<String>) -> Result<Vec<String>, RepositoryError> {
    match value {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| RepositoryError::Decode(format!("bad attachment list: {e}"))),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn encode_user_list(users: &[UserId]) -> Option<String> {
    if users.is_empty() {
        None
    } else {
        serde_json::to_string(users).ok()
    }
}

pub(crate) fn encode_string_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        serde_json::to_string(values).ok()
    }
}

pub(crate) fn document_from_row(row: &SqliteRow) -> Result<ApprovalDocument, RepositoryError> {
    let status: String = row.try_get("status")?;
    let doc_type: String = row.try_get("doc_type")?;
    let priority: String = row.try_get("priority")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(ApprovalDocument {
        id: DocumentId(row.try_get("id")?),
        number: DocumentNumber(row.try_get("number")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author_id: UserId(row.try_get("author_id")?),
        doc_type: DocumentType::parse(&doc_type)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown doc_type `{doc_type}`")))?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown priority `{priority}`")))?,
        status: DocumentStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown status `{status}`")))?,
        reference_users: parse_user_list(row.try_get("reference_users")?)?,
        attachments: parse_string_list(row.try_get("attachments")?)?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}

pub(crate) fn line_from_row(row: &SqliteRow) -> Result<ApprovalLine, RepositoryError> {
    let status: String = row.try_get("status")?;
    let decided_at: Option<String> = row.try_get("decided_at")?;

    Ok(ApprovalLine {
        id: LineId(row.try_get("id")?),
        document_id: DocumentId(row.try_get("document_id")?),
        approver_id: UserId(row.try_get("approver_id")?),
        sign_order: row.try_get("sign_order")?,
        status: LineStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown line status `{status}`")))?,
        comment: row.try_get("comment")?,
        decided_at: decided_at
            .as_deref()
            .map(|value| parse_timestamp(value, "decided_at"))
            .transpose()?,
    })
}

pub(crate) async fn document_by_id<'e, E>(
    executor: E,
    id: DocumentId,
) -> Result<Option<ApprovalDocument>, RepositoryError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let row = sqlx::query(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM approval_document WHERE id = ?"
    ))
    .bind(id.0)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(document_from_row).transpose()
}

/// All lines of one document, ascending by `sign_order`.
pub(crate) async fn lines_for_document<'e, E>(
    executor: E,
    document_id: DocumentId,
) -> Result<Vec<ApprovalLine>, RepositoryError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let rows = sqlx::query(&format!(
        "SELECT {LINE_COLUMNS} FROM approval_line WHERE document_id = ? ORDER BY sign_order ASC"
    ))
    .bind(document_id.0)
    .fetch_all(executor)
    .await?;

    rows.iter().map(line_from_row).collect()
}
