use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Actor, ActorId, ActorRole, DocumentId, DocumentKind, FolderId, ParentFolderId, ReviewDecision,
};
use super::repository::{FolderStore, StoreError};
use super::service::{
    DocumentUpload, FolderWorkflowError, FolderWorkflowService,
};
use super::notifications::NotificationPublisher;

/// Router builder exposing the engine's transport surface.
pub fn folder_router<S, N>(service: Arc<FolderWorkflowService<S, N>>) -> Router
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/folders/:folder_id/documents",
            post(upload_handler::<S, N>),
        )
        .route(
            "/api/v1/folders/:folder_id/submit",
            post(submit_handler::<S, N>),
        )
        .route(
            "/api/v1/folders/:folder_id/documents/:document_id/review",
            post(review_handler::<S, N>),
        )
        .route("/api/v1/folders/:folder_id", get(folder_view_handler::<S, N>))
        .route(
            "/api/v1/parents/:parent_id",
            get(parent_overview_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadDocumentRequest {
    pub(crate) kind: DocumentKind,
    pub(crate) url: String,
    pub(crate) name: String,
    pub(crate) content_type: String,
    pub(crate) size: u64,
    #[serde(default)]
    pub(crate) expires_on: Option<NaiveDate>,
    pub(crate) actor_id: String,
    pub(crate) actor_role: ActorRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitFolderRequest {
    pub(crate) actor_id: String,
    pub(crate) actor_role: ActorRole,
    #[serde(default)]
    pub(crate) notification_emails: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewDocumentRequest {
    pub(crate) decision: ReviewDecision,
    pub(crate) actor_id: String,
    pub(crate) actor_role: ActorRole,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

pub(crate) async fn upload_handler<S, N>(
    State(service): State<Arc<FolderWorkflowService<S, N>>>,
    Path(folder_id): Path<String>,
    axum::Json(request): axum::Json<UploadDocumentRequest>,
) -> Response
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let folder_id = FolderId(folder_id);
    let actor = Actor {
        id: ActorId(request.actor_id),
        role: request.actor_role,
    };
    let upload = DocumentUpload {
        url: request.url,
        name: request.name,
        content_type: request.content_type,
        size: request.size,
        expires_on: request.expires_on,
    };

    match service.upload_document(&folder_id, request.kind, upload, &actor) {
        Ok(document) => (StatusCode::CREATED, axum::Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<FolderWorkflowService<S, N>>>,
    Path(folder_id): Path<String>,
    axum::Json(request): axum::Json<SubmitFolderRequest>,
) -> Response
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let folder_id = FolderId(folder_id);
    let actor = Actor {
        id: ActorId(request.actor_id),
        role: request.actor_role,
    };

    match service.submit_folder(&folder_id, &actor, request.notification_emails) {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<S, N>(
    State(service): State<Arc<FolderWorkflowService<S, N>>>,
    Path((folder_id, document_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<ReviewDocumentRequest>,
) -> Response
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let folder_id = FolderId(folder_id);
    let document_id = DocumentId(document_id);
    let actor = Actor {
        id: ActorId(request.actor_id),
        role: request.actor_role,
    };

    match service.review_document(
        &folder_id,
        &document_id,
        request.decision,
        &actor,
        request.notes,
    ) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn folder_view_handler<S, N>(
    State(service): State<Arc<FolderWorkflowService<S, N>>>,
    Path(folder_id): Path<String>,
) -> Response
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let folder_id = FolderId(folder_id);
    let today = Utc::now().date_naive();
    match service.folder_view(&folder_id, today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn parent_overview_handler<S, N>(
    State(service): State<Arc<FolderWorkflowService<S, N>>>,
    Path(parent_id): Path<String>,
) -> Response
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let parent_id = ParentFolderId(parent_id);
    match service.parent_overview(&parent_id) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: FolderWorkflowError) -> Response {
    match &error {
        FolderWorkflowError::IncompleteChecklist { missing } => {
            let payload = json!({
                "error": error.to_string(),
                "missing": missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        FolderWorkflowError::MissingRejectionReason
        | FolderWorkflowError::KindNotInChecklist { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        FolderWorkflowError::FolderLocked { .. }
        | FolderWorkflowError::InvalidTransition { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        FolderWorkflowError::RoleNotAllowed { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        FolderWorkflowError::Store(StoreError::NotFound) => {
            let payload = json!({ "error": "folder or document not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        FolderWorkflowError::PersistenceConflict { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        _ => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
