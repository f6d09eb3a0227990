//! JSON surface of the approval workflow.
//!
//! Endpoints:
//! - `GET  /api/approvals?status=&is_author=`  — list documents for the actor
//! - `POST /api/approvals`                     — submit a document with its approval line
//! - `GET  /api/approvals/{id}`                — document plus ordered lines
//! - `POST /api/approvals/{id}/decision`       — approve or reject the actor's line
//! - `POST /api/approvals/{id}/withdraw`       — author-only terminal transition
//! - `GET  /api/notifications?unread_only=`    — the actor's notification feed
//! - `POST /api/notifications/{id}/read`       — mark one notification read
//!
//! There is no session layer here; the acting user arrives as an
//! `X-User-Id` header set by the calling application.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use signoff_core::domain::document::{
    ApprovalDocument, DocumentId, DocumentStatus, DocumentType, DocumentWithLines, NewDocument,
    Priority,
};
use signoff_core::domain::line::{ApprovalLine, ApproverSpec};
use signoff_core::domain::notification::Notification;
use signoff_core::domain::user::UserId;
use signoff_core::errors::WorkflowError;
use signoff_core::identity::DirectoryIdentityProvider;
use signoff_core::workflow::Decision;
use signoff_db::repositories::NotificationStore;
use signoff_db::{ApprovalWorkflow, DbPool, EngineError, ListFilter, SqlNotificationStore};

pub type WorkflowService = ApprovalWorkflow<SqlNotificationStore, DirectoryIdentityProvider>;

const ACTOR_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct ApiState {
    workflow: Arc<WorkflowService>,
    notifications: Arc<SqlNotificationStore>,
}

pub fn router(db_pool: DbPool, directory: DirectoryIdentityProvider) -> Router {
    let state = ApiState {
        workflow: Arc::new(ApprovalWorkflow::new(
            db_pool.clone(),
            SqlNotificationStore::new(db_pool.clone()),
            directory,
        )),
        notifications: Arc::new(SqlNotificationStore::new(db_pool)),
    };

    Router::new()
        .route("/api/approvals", get(list_approvals).post(submit_approval))
        .route("/api/approvals/{id}", get(get_approval))
        .route("/api/approvals/{id}/decision", post(decide_approval))
        .route("/api/approvals/{id}/withdraw", post(withdraw_approval))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub title: String,
    pub content: String,
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

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: String,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub is_author: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn validation_error(message: impl Into<String>, correlation_id: &str) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorBody {
            kind: "validation",
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        },
    }
}

/// Each workflow error category gets one stable status code, so callers
/// can tell "not your turn" from "not found" without parsing messages.
fn map_engine_error(error: EngineError, correlation_id: &str) -> ApiError {
    match error {
        EngineError::Workflow(error) => {
            let status = match &error {
                WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
                WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
                WorkflowError::Permission(_) => StatusCode::FORBIDDEN,
                WorkflowError::OutOfOrder { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            };
            ApiError {
                status,
                body: ErrorBody {
                    kind: error.category(),
                    message: error.user_message().to_string(),
                    correlation_id: correlation_id.to_string(),
                },
            }
        }
        EngineError::Repository(error) => {
            error!(
                event_name = "api.storage_error",
                correlation_id,
                error = %error,
                "storage failure while handling request"
            );
            ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorBody {
                    kind: "storage",
                    message: "The service is temporarily unavailable. Please retry shortly."
                        .to_string(),
                    correlation_id: correlation_id.to_string(),
                },
            }
        }
    }
}

fn actor_id(headers: &HeaderMap, correlation_id: &str) -> Result<UserId, ApiError> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .map(UserId)
        .ok_or_else(|| validation_error("missing or malformed X-User-Id header", correlation_id))
}

async fn submit_approval(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<ApprovalDocument>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let author_id = actor_id(&headers, &correlation_id)?;

    let document = state
        .workflow
        .submit(NewDocument {
            title: request.title,
            content: request.content,
            author_id,
            doc_type: request.doc_type,
            priority: request.priority,
            reference_users: request.reference_users,
            attachments: request.attachments,
            approvers: request.approvers,
        })
        .await
        .map_err(|error| map_engine_error(error, &correlation_id))?;

    Ok((StatusCode::CREATED, Json(document)))
}

async fn list_approvals(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApprovalDocument>>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let user_id = actor_id(&headers, &correlation_id)?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(DocumentStatus::parse(raw).ok_or_else(|| {
            validation_error(format!("unknown status filter `{raw}`"), &correlation_id)
        })?),
        None => None,
    };

    let documents = state
        .workflow
        .list(user_id, ListFilter { status, is_author: query.is_author })
        .await
        .map_err(|error| map_engine_error(error, &correlation_id))?;
    Ok(Json(documents))
}

async fn get_approval(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentWithLines>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let full = state
        .workflow
        .get_with_lines(DocumentId(id))
        .await
        .map_err(|error| map_engine_error(error, &correlation_id))?;
    Ok(Json(full))
}

async fn decide_approval(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ApprovalLine>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let acting_user = actor_id(&headers, &correlation_id)?;
    let decision = Decision::parse(&request.decision).ok_or_else(|| {
        validation_error(
            format!("unknown decision `{}` (expected approve|reject)", request.decision),
            &correlation_id,
        )
    })?;

    let line = state
        .workflow
        .decide(DocumentId(id), acting_user, decision, request.comment)
        .await
        .map_err(|error| map_engine_error(error, &correlation_id))?;
    Ok(Json(line))
}

async fn withdraw_approval(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApprovalDocument>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let acting_user = actor_id(&headers, &correlation_id)?;

    let document = state
        .workflow
        .withdraw(DocumentId(id), acting_user)
        .await
        .map_err(|error| map_engine_error(error, &correlation_id))?;
    Ok(Json(document))
}

async fn list_notifications(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let user_id = actor_id(&headers, &correlation_id)?;

    let notifications = state
        .notifications
        .list_for_user(user_id, query.unread_only)
        .await
        .map_err(|error| map_engine_error(EngineError::Repository(error), &correlation_id))?;
    Ok(Json(notifications))
}

async fn mark_notification_read(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let found = state
        .notifications
        .mark_read(id)
        .await
        .map_err(|error| map_engine_error(EngineError::Repository(error), &correlation_id))?;

    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                kind: "not_found",
                message: "The requested notification does not exist.".to_string(),
                correlation_id,
            },
        })
    }
}
