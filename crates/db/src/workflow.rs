//! The approval workflow engine: submission, sequential sign-off,
//! rejection short-circuit, and author withdrawal.
//!
//! Every public operation runs as one transaction against the store, so
//! the read-validate-write-recompute sequence is atomic with respect to
//! other callers. Notification fan-out happens after commit and is
//! best-effort: a delivery failure is logged and never unwinds a
//! committed transition.

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::warn;

use signoff_core::docnum::DocumentNumber;
use signoff_core::domain::document::{
    ApprovalDocument, DocumentId, DocumentStatus, DocumentWithLines, NewDocument,
};
use signoff_core::domain::line::{ApprovalLine, LineStatus};
use signoff_core::domain::notification::NotificationRequest;
use signoff_core::domain::user::UserId;
use signoff_core::errors::WorkflowError;
use signoff_core::identity::IdentityProvider;
use signoff_core::notify::NotificationSink;
use signoff_core::workflow::{rules, Decision};

use crate::repositories::document::{
    document_by_id, document_from_row, encode_string_list, encode_user_list, lines_for_document,
    DOCUMENT_COLUMNS, DOCUMENT_COLUMNS_PREFIXED,
};
use crate::repositories::RepositoryError;
use crate::DbPool;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for EngineError {
    fn from(error: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(error))
    }
}

/// Listing scope: documents the user authored, or documents where the
/// user holds at least one approval line.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListFilter {
    pub status: Option<DocumentStatus>,
    pub is_author: bool,
}

pub struct ApprovalWorkflow<N, I> {
    pool: DbPool,
    notifications: N,
    identity: I,
}

impl<N, I> ApprovalWorkflow<N, I>
where
    N: NotificationSink,
    I: IdentityProvider,
{
    pub fn new(pool: DbPool, notifications: N, identity: I) -> Self {
        Self { pool, notifications, identity }
    }

    /// Creates the document and its full approval line in one unit; a
    /// partial failure leaves no visible trace. The document number is
    /// allocated inside the same transaction: greatest issued sequence
    /// for the current year, plus one.
    pub async fn submit(&self, new: NewDocument) -> Result<ApprovalDocument, EngineError> {
        let NewDocument {
            title,
            content,
            author_id,
            doc_type,
            priority,
            reference_users,
            attachments,
            approvers,
        } = new;

        rules::validate_specs(&approvers)?;

        let created_at = Utc::now();
        let year = created_at.year();

        let mut tx = self.pool.begin().await?;

        let last_seq: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(doc_seq), 0) FROM approval_document WHERE doc_year = ?",
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;
        let number = DocumentNumber::compose(year, last_seq + 1);

        let inserted = sqlx::query(
            "INSERT INTO approval_document
                 (number, doc_year, doc_seq, title, content, author_id, doc_type, priority,
                  status, reference_users, attachments, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&number.0)
        .bind(year)
        .bind(last_seq + 1)
        .bind(&title)
        .bind(&content)
        .bind(author_id.0)
        .bind(doc_type.as_str())
        .bind(priority.as_str())
        .bind(DocumentStatus::Drafted.as_str())
        .bind(encode_user_list(&reference_users))
        .bind(encode_string_list(&attachments))
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        let document_id = DocumentId(inserted.last_insert_rowid());

        for spec in &approvers {
            sqlx::query(
                "INSERT INTO approval_line (document_id, approver_id, sign_order, status)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(document_id.0)
            .bind(spec.approver_id.0)
            .bind(spec.sign_order)
            .bind(LineStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let document = ApprovalDocument {
            id: document_id,
            number,
            title,
            content,
            author_id,
            doc_type,
            priority,
            status: DocumentStatus::Drafted,
            reference_users,
            attachments,
            created_at,
        };

        for spec in &approvers {
            self.dispatch(NotificationRequest::for_document(
                spec.approver_id,
                document_id,
                "New approval request",
                format!("'{}' is waiting for your sign-off.", document.title),
            ))
            .await;
        }

        Ok(document)
    }

    /// Records one approver's verdict. Eligibility and ordering are
    /// validated against the lines as read inside the transaction, the
    /// line is written exactly once, and the aggregate document status is
    /// recomputed from the updated set before commit.
    pub async fn decide(
        &self,
        document_id: DocumentId,
        acting_user: UserId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<ApprovalLine, EngineError> {
        let decided_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let document = document_by_id(&mut *tx, document_id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "document", id: document_id.0 })?;
        rules::ensure_in_flight(&document)?;

        let lines = lines_for_document(&mut *tx, document_id).await?;
        let line = rules::eligible_line(&lines, acting_user)?.clone();

        let updated = sqlx::query(
            "UPDATE approval_line SET status = ?, comment = ?, decided_at = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(decision.line_status().as_str())
        .bind(&comment)
        .bind(decided_at.to_rfc3339())
        .bind(line.id.0)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(WorkflowError::Conflict(format!("line {} already decided", line.id)).into());
        }

        let lines = lines_for_document(&mut *tx, document_id).await?;
        let next_status = rules::aggregate_status(&lines);
        sqlx::query("UPDATE approval_document SET status = ? WHERE id = ?")
            .bind(next_status.as_str())
            .bind(document_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let decider = self.identity.display_name(acting_user);
        let (title, body) = match decision {
            Decision::Approve => (
                "Approval granted",
                format!("'{}' was approved by {}.", document.title, decider),
            ),
            Decision::Reject => (
                "Approval rejected",
                format!("'{}' was rejected by {}.", document.title, decider),
            ),
        };
        self.dispatch(NotificationRequest::for_document(
            document.author_id,
            document_id,
            title,
            body,
        ))
        .await;

        let mut decided = line;
        decided.status = decision.line_status();
        decided.comment = comment;
        decided.decided_at = Some(decided_at);
        Ok(decided)
    }

    /// Author-only terminal transition, available while the document is
    /// still in flight. Approvers who never got their turn are told the
    /// document is gone.
    pub async fn withdraw(
        &self,
        document_id: DocumentId,
        acting_user: UserId,
    ) -> Result<ApprovalDocument, EngineError> {
        let mut tx = self.pool.begin().await?;

        let document = document_by_id(&mut *tx, document_id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "document", id: document_id.0 })?;
        rules::ensure_withdrawable(&document, acting_user)?;

        sqlx::query("UPDATE approval_document SET status = ? WHERE id = ?")
            .bind(DocumentStatus::Withdrawn.as_str())
            .bind(document_id.0)
            .execute(&mut *tx)
            .await?;

        let lines = lines_for_document(&mut *tx, document_id).await?;

        tx.commit().await?;

        for line in lines.iter().filter(|line| line.status == LineStatus::Pending) {
            self.dispatch(NotificationRequest::for_document(
                line.approver_id,
                document_id,
                "Approval withdrawn",
                format!("'{}' was withdrawn by its author.", document.title),
            ))
            .await;
        }

        let mut withdrawn = document;
        withdrawn.status = DocumentStatus::Withdrawn;
        Ok(withdrawn)
    }

    pub async fn get_with_lines(
        &self,
        document_id: DocumentId,
    ) -> Result<DocumentWithLines, EngineError> {
        let document = document_by_id(&self.pool, document_id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "document", id: document_id.0 })?;
        let lines = lines_for_document(&self.pool, document_id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    pub async fn list(
        &self,
        user_id: UserId,
        filter: ListFilter,
    ) -> Result<Vec<ApprovalDocument>, EngineError> {
        let rows = match (filter.is_author, filter.status) {
            (true, Some(status)) => {
                sqlx::query(&format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM approval_document
                     WHERE author_id = ? AND status = ?
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id.0)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            (true, None) => {
                sqlx::query(&format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM approval_document
                     WHERE author_id = ?
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id.0)
                .fetch_all(&self.pool)
                .await?
            }
            (false, Some(status)) => {
                sqlx::query(&format!(
                    "SELECT DISTINCT {DOCUMENT_COLUMNS_PREFIXED}
                     FROM approval_document d
                     JOIN approval_line l ON l.document_id = d.id
                     WHERE l.approver_id = ? AND d.status = ?
                     ORDER BY d.created_at DESC, d.id DESC"
                ))
                .bind(user_id.0)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            (false, None) => {
                sqlx::query(&format!(
                    "SELECT DISTINCT {DOCUMENT_COLUMNS_PREFIXED}
                     FROM approval_document d
                     JOIN approval_line l ON l.document_id = d.id
                     WHERE l.approver_id = ?
                     ORDER BY d.created_at DESC, d.id DESC"
                ))
                .bind(user_id.0)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(document_from_row).collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    async fn dispatch(&self, request: NotificationRequest) {
        if let Err(error) = self.notifications.deliver(request).await {
            warn!(
                event_name = "workflow.notification_failed",
                error = %error,
                "notification delivery failed; transition already committed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Utc};

    use signoff_core::domain::document::{DocumentId, DocumentStatus, DocumentType, NewDocument};
    use signoff_core::domain::line::{ApproverSpec, LineStatus};
    use signoff_core::domain::user::UserId;
    use signoff_core::errors::WorkflowError;
    use signoff_core::identity::{DirectoryIdentityProvider, UserIdentity};
    use signoff_core::notify::{FailingNotificationSink, InMemoryNotificationSink};
    use signoff_core::workflow::Decision;

    use super::{ApprovalWorkflow, EngineError, ListFilter};
    use crate::{connect_with_settings, migrations, DbPool};

    const AUTHOR: UserId = UserId(10);
    const FIRST: UserId = UserId(20);
    const SECOND: UserId = UserId(30);
    const THIRD: UserId = UserId(40);

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn directory() -> DirectoryIdentityProvider {
        let person = |name: &str, department: &str| UserIdentity {
            name: name.to_string(),
            department: department.to_string(),
            position: "Staff".to_string(),
        };
        DirectoryIdentityProvider::new(vec![
            (AUTHOR, person("Jin Park", "Engineering")),
            (FIRST, person("Dana Kim", "Engineering")),
            (SECOND, person("Alex Cho", "Finance")),
            (THIRD, person("Sam Lee", "Operations")),
        ])
    }

    fn engine(pool: DbPool) -> ApprovalWorkflow<InMemoryNotificationSink, DirectoryIdentityProvider> {
        ApprovalWorkflow::new(pool, InMemoryNotificationSink::default(), directory())
    }

    fn new_document(approvers: &[(UserId, i64)]) -> NewDocument {
        NewDocument {
            title: "Quarterly budget".to_string(),
            content: "Budget allocation for Q3".to_string(),
            author_id: AUTHOR,
            doc_type: DocumentType::ExpenseReport,
            priority: Default::default(),
            reference_users: Vec::new(),
            attachments: Vec::new(),
            approvers: approvers
                .iter()
                .map(|(approver_id, sign_order)| ApproverSpec {
                    approver_id: *approver_id,
                    sign_order: *sign_order,
                })
                .collect(),
        }
    }

    async fn document_count(pool: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM approval_document")
            .fetch_one(pool)
            .await
            .expect("count documents")
    }

    #[tokio::test]
    async fn submit_creates_document_with_pending_ledger() {
        let pool = setup().await;
        let workflow = engine(pool);

        let document =
            workflow.submit(new_document(&[(FIRST, 1), (SECOND, 2)])).await.expect("submit");

        assert_eq!(document.status, DocumentStatus::Drafted);
        assert_eq!(document.number.parts(), Some((Utc::now().year(), 1)));

        let full = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(full.lines.len(), 2);
        assert_eq!(full.lines[0].sign_order, 1);
        assert_eq!(full.lines[1].sign_order, 2);
        assert!(full.lines.iter().all(|line| line.status == LineStatus::Pending));
        assert!(full.lines.iter().all(|line| line.decided_at.is_none()));
    }

    #[tokio::test]
    async fn submit_notifies_every_approver() {
        let pool = setup().await;
        let sink = InMemoryNotificationSink::default();
        let workflow = ApprovalWorkflow::new(pool, sink.clone(), directory());

        workflow.submit(new_document(&[(FIRST, 1), (SECOND, 2)])).await.expect("submit");

        let requests = sink.requests();
        assert_eq!(requests.len(), 2);
        let recipients: Vec<UserId> = requests.iter().map(|r| r.user_id).collect();
        assert!(recipients.contains(&FIRST));
        assert!(recipients.contains(&SECOND));
        assert!(requests.iter().all(|r| r.title == "New approval request"));
    }

    #[tokio::test]
    async fn documents_in_one_year_number_sequentially() {
        let pool = setup().await;
        let workflow = engine(pool);

        let first = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit 1");
        let second = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit 2");

        let year = Utc::now().year();
        assert_eq!(first.number.parts(), Some((year, 1)));
        assert_eq!(second.number.parts(), Some((year, 2)));
        assert_eq!(first.number.0, format!("AP-{year}-0001"));
        assert_eq!(second.number.0, format!("AP-{year}-0002"));
        assert_ne!(first.number, second.number);
    }

    #[tokio::test]
    async fn submit_without_approvers_creates_nothing() {
        let pool = setup().await;
        let workflow = engine(pool.clone());

        let error = workflow.submit(new_document(&[])).await.expect_err("empty approvers");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Validation(_))
        ));
        assert_eq!(document_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn submit_with_duplicate_orders_creates_nothing() {
        let pool = setup().await;
        let workflow = engine(pool.clone());

        let error = workflow
            .submit(new_document(&[(FIRST, 1), (SECOND, 1)]))
            .await
            .expect_err("duplicate orders");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Validation(_))
        ));
        assert_eq!(document_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn submit_rolls_back_document_when_line_insert_fails() {
        let pool = setup().await;
        let workflow = engine(pool.clone());

        // Fault injection: make the line insert fail mid-transaction.
        sqlx::query("DROP TABLE approval_line").execute(&pool).await.expect("drop table");

        let error = workflow
            .submit(new_document(&[(FIRST, 1)]))
            .await
            .expect_err("line insert must fail");
        assert!(matches!(error, EngineError::Repository(_)));
        assert_eq!(document_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn linear_approval_reaches_approved() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document =
            workflow.submit(new_document(&[(FIRST, 1), (SECOND, 2)])).await.expect("submit");

        let line = workflow
            .decide(document.id, FIRST, Decision::Approve, Some("looks good".to_string()))
            .await
            .expect("first approval");
        assert_eq!(line.status, LineStatus::Approved);
        assert_eq!(line.comment.as_deref(), Some("looks good"));
        assert!(line.decided_at.is_some());

        let mid = workflow.get_with_lines(document.id).await.expect("get mid-flight");
        assert_eq!(mid.document.status, DocumentStatus::Routing);

        workflow.decide(document.id, SECOND, Decision::Approve, None).await.expect("final");

        let done = workflow.get_with_lines(document.id).await.expect("get final");
        assert_eq!(done.document.status, DocumentStatus::Approved);
        assert!(done.lines.iter().all(|line| line.status == LineStatus::Approved));
    }

    #[tokio::test]
    async fn out_of_turn_decision_changes_nothing() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document =
            workflow.submit(new_document(&[(FIRST, 1), (SECOND, 2)])).await.expect("submit");

        let error = workflow
            .decide(document.id, SECOND, Decision::Reject, None)
            .await
            .expect_err("second approver must wait");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::OutOfOrder { waiting_on: 1 })
        ));

        let unchanged = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(unchanged.document.status, DocumentStatus::Drafted);
        assert!(unchanged.lines.iter().all(|line| line.status == LineStatus::Pending));
    }

    #[tokio::test]
    async fn stranger_cannot_decide() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit");

        let error = workflow
            .decide(document.id, THIRD, Decision::Approve, None)
            .await
            .expect_err("not an approver");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Permission(_))
        ));
    }

    #[tokio::test]
    async fn decide_on_unknown_document_is_not_found() {
        let pool = setup().await;
        let workflow = engine(pool);

        let error = workflow
            .decide(DocumentId(999), FIRST, Decision::Approve, None)
            .await
            .expect_err("unknown document");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::NotFound { entity: "document", id: 999 })
        ));
    }

    #[tokio::test]
    async fn rejection_short_circuits_and_leaves_tail_pending() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document = workflow
            .submit(new_document(&[(FIRST, 1), (SECOND, 2), (THIRD, 3)]))
            .await
            .expect("submit");

        workflow.decide(document.id, FIRST, Decision::Approve, None).await.expect("approve");
        let rejected = workflow
            .decide(document.id, SECOND, Decision::Reject, Some("insufficient budget".to_string()))
            .await
            .expect("reject");

        assert_eq!(rejected.status, LineStatus::Rejected);
        assert_eq!(rejected.comment.as_deref(), Some("insufficient budget"));
        assert!(rejected.decided_at.is_some());

        let full = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(full.document.status, DocumentStatus::Rejected);
        assert_eq!(full.lines[0].status, LineStatus::Approved);
        assert_eq!(full.lines[2].status, LineStatus::Pending);

        // The document is terminal; the untouched tail is unreachable.
        let error = workflow
            .decide(document.id, THIRD, Decision::Approve, None)
            .await
            .expect_err("terminal document");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn approver_cannot_decide_twice() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document =
            workflow.submit(new_document(&[(FIRST, 1), (SECOND, 2)])).await.expect("submit");

        workflow
            .decide(document.id, FIRST, Decision::Approve, Some("first pass".to_string()))
            .await
            .expect("approve");
        let error = workflow
            .decide(document.id, FIRST, Decision::Reject, Some("changed my mind".to_string()))
            .await
            .expect_err("no pending line remains for this user");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Permission(_))
        ));

        // Original comment and timestamp survive the failed retry.
        let full = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(full.lines[0].comment.as_deref(), Some("first pass"));
        assert_eq!(full.lines[0].status, LineStatus::Approved);
    }

    #[tokio::test]
    async fn decision_notifies_author_with_decider_name() {
        let pool = setup().await;
        let sink = InMemoryNotificationSink::default();
        let workflow = ApprovalWorkflow::new(pool, sink.clone(), directory());
        let document = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit");

        workflow.decide(document.id, FIRST, Decision::Approve, None).await.expect("approve");

        let to_author: Vec<_> =
            sink.requests().into_iter().filter(|r| r.user_id == AUTHOR).collect();
        assert_eq!(to_author.len(), 1);
        assert_eq!(to_author[0].title, "Approval granted");
        assert!(to_author[0].body.contains("Dana Kim"));
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_decision() {
        let pool = setup().await;
        let workflow = ApprovalWorkflow::new(pool, FailingNotificationSink, directory());
        let document = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit");

        workflow
            .decide(document.id, FIRST, Decision::Approve, None)
            .await
            .expect("decision commits despite failing sink");

        let full = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(full.document.status, DocumentStatus::Approved);
    }

    #[tokio::test]
    async fn author_withdraws_in_flight_document() {
        let pool = setup().await;
        let sink = InMemoryNotificationSink::default();
        let workflow = ApprovalWorkflow::new(pool, sink.clone(), directory());
        let document = workflow
            .submit(new_document(&[(FIRST, 1), (SECOND, 2), (THIRD, 3)]))
            .await
            .expect("submit");

        workflow.decide(document.id, FIRST, Decision::Approve, None).await.expect("approve");
        let withdrawn = workflow.withdraw(document.id, AUTHOR).await.expect("withdraw");
        assert_eq!(withdrawn.status, DocumentStatus::Withdrawn);

        // Only the approvers who never got their turn are told.
        let notified: Vec<UserId> = sink
            .requests()
            .into_iter()
            .filter(|r| r.title == "Approval withdrawn")
            .map(|r| r.user_id)
            .collect();
        assert_eq!(notified.len(), 2);
        assert!(notified.contains(&SECOND));
        assert!(notified.contains(&THIRD));

        let error = workflow
            .decide(document.id, SECOND, Decision::Approve, None)
            .await
            .expect_err("withdrawn document refuses decisions");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn non_author_cannot_withdraw() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit");

        let error = workflow
            .withdraw(document.id, FIRST)
            .await
            .expect_err("approver is not the author");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Permission(_))
        ));

        let unchanged = workflow.get_with_lines(document.id).await.expect("get");
        assert_eq!(unchanged.document.status, DocumentStatus::Drafted);
    }

    #[tokio::test]
    async fn terminal_document_cannot_be_withdrawn() {
        let pool = setup().await;
        let workflow = engine(pool);
        let document = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit");
        workflow.decide(document.id, FIRST, Decision::Approve, None).await.expect("approve");

        let error = workflow
            .withdraw(document.id, AUTHOR)
            .await
            .expect_err("approved document cannot be withdrawn");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn get_with_lines_reports_unknown_documents() {
        let pool = setup().await;
        let workflow = engine(pool);

        let error = workflow.get_with_lines(DocumentId(41)).await.expect_err("unknown");
        assert!(matches!(
            error,
            EngineError::Workflow(WorkflowError::NotFound { entity: "document", id: 41 })
        ));
    }

    #[tokio::test]
    async fn list_separates_authored_from_assigned() {
        let pool = setup().await;
        let workflow = engine(pool);

        let mut authored = new_document(&[(FIRST, 1), (SECOND, 2)]);
        authored.title = "Authored by Jin".to_string();
        workflow.submit(authored).await.expect("submit authored");

        let mut assigned = new_document(&[(AUTHOR, 1)]);
        assigned.author_id = FIRST;
        assigned.title = "Assigned to Jin".to_string();
        workflow.submit(assigned).await.expect("submit assigned");

        let as_author =
            workflow.list(AUTHOR, ListFilter { is_author: true, status: None }).await.expect("list");
        assert_eq!(as_author.len(), 1);
        assert_eq!(as_author[0].title, "Authored by Jin");

        let as_approver = workflow
            .list(AUTHOR, ListFilter { is_author: false, status: None })
            .await
            .expect("list");
        assert_eq!(as_approver.len(), 1);
        assert_eq!(as_approver[0].title, "Assigned to Jin");
    }

    #[tokio::test]
    async fn list_filters_by_status_and_orders_newest_first() {
        let pool = setup().await;
        let workflow = engine(pool);

        let first = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit 1");
        let second = workflow.submit(new_document(&[(FIRST, 1)])).await.expect("submit 2");
        workflow.decide(first.id, FIRST, Decision::Approve, None).await.expect("approve first");

        let all = workflow
            .list(AUTHOR, ListFilter { is_author: true, status: None })
            .await
            .expect("list all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id, "newest submission comes first");

        let approved = workflow
            .list(AUTHOR, ListFilter { is_author: true, status: Some(DocumentStatus::Approved) })
            .await
            .expect("list approved");
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, first.id);
    }

    #[tokio::test]
    async fn approver_with_multiple_lines_is_listed_once() {
        let pool = setup().await;
        let workflow = engine(pool);

        workflow
            .submit(new_document(&[(FIRST, 1), (FIRST, 2)]))
            .await
            .expect("same approver twice at different positions");

        let listed = workflow
            .list(FIRST, ListFilter { is_author: false, status: None })
            .await
            .expect("list");
        assert_eq!(listed.len(), 1);
    }
}
