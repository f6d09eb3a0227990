//! Pure transition rules of the approval state machine. No I/O here; the
//! persistence layer calls these inside its transaction boundary.

use crate::domain::document::{ApprovalDocument, DocumentStatus};
use crate::domain::line::{ApprovalLine, ApproverSpec, LineStatus};
use crate::domain::user::UserId;
use crate::errors::WorkflowError;

/// Gate for submission: at least one approver, positive order values,
/// no duplicate orders. Ties are rejected here, never silently resolved.
pub fn validate_specs(specs: &[ApproverSpec]) -> Result<(), WorkflowError> {
    if specs.is_empty() {
        return Err(WorkflowError::Validation(
            "at least one approver must be specified".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for spec in specs {
        if spec.sign_order <= 0 {
            return Err(WorkflowError::Validation(format!(
                "sign order must be positive, got {}",
                spec.sign_order
            )));
        }
        if !seen.insert(spec.sign_order) {
            return Err(WorkflowError::Validation(format!(
                "duplicate sign order {}",
                spec.sign_order
            )));
        }
    }

    Ok(())
}

/// Locates the acting user's turn-eligible line.
///
/// `Permission` if the user holds no pending line at all; `OutOfOrder` if
/// they do but an earlier-ordered line is still undecided. The same gate
/// applies to approve and reject — rejection does not bypass order.
pub fn eligible_line(
    lines: &[ApprovalLine],
    acting_user: UserId,
) -> Result<&ApprovalLine, WorkflowError> {
    let line = lines
        .iter()
        .find(|line| line.approver_id == acting_user && line.status == LineStatus::Pending)
        .ok_or_else(|| {
            WorkflowError::Permission("no eligible pending line for this user".to_string())
        })?;

    let blocking = lines
        .iter()
        .filter(|earlier| {
            earlier.sign_order < line.sign_order && earlier.status != LineStatus::Approved
        })
        .map(|earlier| earlier.sign_order)
        .min();

    match blocking {
        Some(waiting_on) => Err(WorkflowError::OutOfOrder { waiting_on }),
        None => Ok(line),
    }
}

/// Aggregate document status derived from the full line set: one rejection
/// short-circuits the document; unanimity approves it; anything else is
/// still routing.
pub fn aggregate_status(lines: &[ApprovalLine]) -> DocumentStatus {
    if lines.iter().any(|line| line.status == LineStatus::Rejected) {
        DocumentStatus::Rejected
    } else if lines.iter().all(|line| line.status == LineStatus::Approved) {
        DocumentStatus::Approved
    } else {
        DocumentStatus::Routing
    }
}

/// Decisions are only accepted while the document is in flight.
pub fn ensure_in_flight(document: &ApprovalDocument) -> Result<(), WorkflowError> {
    if document.status.is_in_flight() {
        Ok(())
    } else {
        Err(WorkflowError::Conflict(format!(
            "document {} is already {}",
            document.number,
            document.status.as_str()
        )))
    }
}

/// Withdrawal is author-gated and only possible while in flight.
pub fn ensure_withdrawable(
    document: &ApprovalDocument,
    acting_user: UserId,
) -> Result<(), WorkflowError> {
    if document.author_id != acting_user {
        return Err(WorkflowError::Permission(
            "only the author may withdraw a document".to_string(),
        ));
    }
    ensure_in_flight(document)
}
