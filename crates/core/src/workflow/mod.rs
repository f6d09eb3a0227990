pub mod rules;

use serde::{Deserialize, Serialize};

use crate::domain::line::LineStatus;

/// An approver's verdict on their line. Approve and Reject share the same
/// eligibility and ordering gates; they differ only in the line status
/// written and in how the aggregate document status falls out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn line_status(&self) -> LineStatus {
        match self {
            Self::Approve => LineStatus::Approved,
            Self::Reject => LineStatus::Rejected,
        }
    }
}
