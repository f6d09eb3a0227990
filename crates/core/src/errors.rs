use thiserror::Error;

/// Terminal errors of the workflow engine. Every variant maps to a stable
/// category so a presentation layer can render a specific explanation
/// ("not your turn" vs. "not found") without parsing messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("not your turn: approver at position {waiting_on} has not yet decided")]
    OutOfOrder { waiting_on: i64 },
    #[error("conflict: {0}")]
    Conflict(String),
}

impl WorkflowError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Permission(_) => "permission",
            Self::OutOfOrder { .. } => "out_of_order",
            Self::Conflict(_) => "conflict",
        }
    }

    /// User-safe message per category, independent of the internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "The request was malformed. Check the submitted fields.",
            Self::NotFound { .. } => "The requested document does not exist.",
            Self::Permission(_) => "You are not allowed to perform this action.",
            Self::OutOfOrder { .. } => "An earlier approver has not decided yet.",
            Self::Conflict(_) => "The document has already been decided or withdrawn.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WorkflowError;

    #[test]
    fn out_of_order_is_distinct_from_permission() {
        let permission = WorkflowError::Permission("no eligible pending line".to_string());
        let out_of_order = WorkflowError::OutOfOrder { waiting_on: 1 };

        assert_ne!(permission.category(), out_of_order.category());
        assert_ne!(permission.user_message(), out_of_order.user_message());
    }

    #[test]
    fn categories_are_stable_strings() {
        assert_eq!(WorkflowError::Validation("x".into()).category(), "validation");
        assert_eq!(WorkflowError::NotFound { entity: "document", id: 9 }.category(), "not_found");
        assert_eq!(WorkflowError::Conflict("x".into()).category(), "conflict");
    }
}
