//! Deterministic demo dataset for `signoff seed`: a small directory and
//! one document per workflow stage, driven through the engine itself so
//! the seeded rows obey the same invariants as production writes.

use signoff_core::domain::document::{DocumentType, NewDocument, Priority};
use signoff_core::domain::line::ApproverSpec;
use signoff_core::domain::user::UserId;
use signoff_core::identity::{DirectoryIdentityProvider, UserIdentity};
use signoff_core::workflow::Decision;

use crate::repositories::SqlNotificationStore;
use crate::workflow::{ApprovalWorkflow, EngineError};
use crate::DbPool;

const SEED_AUTHOR: UserId = UserId(1);
const SEED_MANAGER: UserId = UserId(2);
const SEED_DIRECTOR: UserId = UserId(3);

#[derive(Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub documents: usize,
    pub decisions: usize,
}

/// Directory backing the seeded documents; mirrors what the external
/// identity service would answer for these ids.
pub fn seed_directory() -> DirectoryIdentityProvider {
    let person = |name: &str, department: &str, position: &str| UserIdentity {
        name: name.to_string(),
        department: department.to_string(),
        position: position.to_string(),
    };
    DirectoryIdentityProvider::new(vec![
        (SEED_AUTHOR, person("Jin Park", "Engineering", "Staff Engineer")),
        (SEED_MANAGER, person("Dana Kim", "Engineering", "Manager")),
        (SEED_DIRECTOR, person("Alex Cho", "Finance", "Director")),
    ])
}

/// Loads the demo dataset: one document still routing, one fully
/// approved, one rejected.
pub async fn load(pool: &DbPool) -> Result<SeedResult, EngineError> {
    let workflow =
        ApprovalWorkflow::new(pool.clone(), SqlNotificationStore::new(pool.clone()), seed_directory());

    let chain = vec![
        ApproverSpec { approver_id: SEED_MANAGER, sign_order: 1 },
        ApproverSpec { approver_id: SEED_DIRECTOR, sign_order: 2 },
    ];

    let document = |title: &str, content: &str, doc_type: DocumentType| NewDocument {
        title: title.to_string(),
        content: content.to_string(),
        author_id: SEED_AUTHOR,
        doc_type,
        priority: Priority::Normal,
        reference_users: Vec::new(),
        attachments: Vec::new(),
        approvers: chain.clone(),
    };

    let routing = workflow
        .submit(document(
            "Team offsite budget",
            "Venue and travel for the Q3 offsite.",
            DocumentType::ExpenseReport,
        ))
        .await?;
    workflow
        .decide(routing.id, SEED_MANAGER, Decision::Approve, Some("within budget".to_string()))
        .await?;

    let approved = workflow
        .submit(document(
            "Conference trip",
            "Two days at the systems conference.",
            DocumentType::BusinessTrip,
        ))
        .await?;
    workflow.decide(approved.id, SEED_MANAGER, Decision::Approve, None).await?;
    workflow.decide(approved.id, SEED_DIRECTOR, Decision::Approve, None).await?;

    let rejected = workflow
        .submit(document(
            "Workstation upgrade",
            "Replacement build machines for the team.",
            DocumentType::PurchaseRequest,
        ))
        .await?;
    workflow.decide(rejected.id, SEED_MANAGER, Decision::Approve, None).await?;
    workflow
        .decide(rejected.id, SEED_DIRECTOR, Decision::Reject, Some("defer to next quarter".to_string()))
        .await?;

    Ok(SeedResult { documents: 3, decisions: 5 })
}

#[cfg(test)]
mod tests {
    use super::{load, SeedResult};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seed_produces_one_document_per_stage() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let result = load(&pool).await.expect("seed");
        assert_eq!(result, SeedResult { documents: 3, decisions: 5 });

        let statuses: Vec<String> =
            sqlx::query_scalar("SELECT status FROM approval_document ORDER BY id")
                .fetch_all(&pool)
                .await
                .expect("statuses");
        assert_eq!(statuses, vec!["routing", "approved", "rejected"]);
    }

    #[tokio::test]
    async fn seeding_twice_keeps_numbering_unique() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        load(&pool).await.expect("first seed");
        load(&pool).await.expect("second seed");

        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT number FROM approval_document ORDER BY id")
                .fetch_all(&pool)
                .await
                .expect("numbers");
        let unique: std::collections::HashSet<&String> = numbers.iter().collect();
        assert_eq!(numbers.len(), 6);
        assert_eq!(unique.len(), 6);
    }
}
