pub mod config;
pub mod docnum;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod notify;
pub mod workflow;

pub use docnum::DocumentNumber;
pub use domain::document::{
    ApprovalDocument, DocumentId, DocumentStatus, DocumentType, DocumentWithLines, NewDocument,
    Priority,
};
pub use domain::line::{ApprovalLine, ApproverSpec, LineId, LineStatus};
pub use domain::notification::{Notification, NotificationKind, NotificationRequest};
pub use domain::user::UserId;
pub use errors::WorkflowError;
pub use identity::{DirectoryIdentityProvider, IdentityProvider, UserIdentity};
pub use notify::{
    FailingNotificationSink, InMemoryNotificationSink, NotificationSink, NotifyError,
};
pub use workflow::Decision;
