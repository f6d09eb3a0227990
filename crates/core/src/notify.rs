//! Outbound notification port. Delivery failures are contained by the
//! caller: a failed notification never fails the transition that caused it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::NotificationRequest;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, request: NotificationRequest) -> Result<(), NotifyError>;
}

/// Collects requests in memory; test double for the workflow engine.
#[derive(Clone, Default)]
pub struct InMemoryNotificationSink {
    requests: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl InMemoryNotificationSink {
    pub fn requests(&self) -> Vec<NotificationRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn deliver(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
        Ok(())
    }
}

/// Sink that always fails; used to verify that delivery failures do not
/// propagate out of the workflow.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingNotificationSink;

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn deliver(&self, _request: NotificationRequest) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("sink unavailable".to_string()))
    }
}
