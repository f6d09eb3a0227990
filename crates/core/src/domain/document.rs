use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::docnum::DocumentNumber;
use crate::domain::line::{ApprovalLine, ApproverSpec};
use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate document status. `Drafted` and `Routing` are both "in flight";
/// a document stays `Drafted` until its first recorded decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Drafted,
    Routing,
    Approved,
    Rejected,
    Withdrawn,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drafted => "drafted",
            Self::Routing => "routing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "drafted" => Some(Self::Drafted),
            "routing" => Some(Self::Routing),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    /// In flight: zero or more approvals recorded, not yet terminal.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Drafted | Self::Routing)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_in_flight()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    General,
    ExpenseReport,
    LeaveRequest,
    BusinessTrip,
    PurchaseRequest,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::ExpenseReport => "expense_report",
            Self::LeaveRequest => "leave_request",
            Self::BusinessTrip => "business_trip",
            Self::PurchaseRequest => "purchase_request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "expense_report" => Some(Self::ExpenseReport),
            "leave_request" => Some(Self::LeaveRequest),
            "business_trip" => Some(Self::BusinessTrip),
            "purchase_request" => Some(Self::PurchaseRequest),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Important,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Important => "important",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Self::Normal),
            "important" => Some(Self::Important),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalDocument {
    pub id: DocumentId,
    pub number: DocumentNumber,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub doc_type: DocumentType,
    pub priority: Priority,
    pub status: DocumentStatus,
    pub reference_users: Vec<UserId>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Submission input: the document fields plus its full approval line,
/// ordered by the caller. Materialized atomically at submit time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    #[serde(default)]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reference_users: Vec<UserId>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub approvers: Vec<ApproverSpec>,
}

/// A document together with its ledger, lines ascending by `sign_order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentWithLines {
    pub document: ApprovalDocument,
    pub lines: Vec<ApprovalLine>,
}
