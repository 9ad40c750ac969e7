use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aggregation::{aggregate_status, missing_required, required_progress};
use super::catalog::{checklist, Checklist};
use super::domain::{
    Actor, ActorRole, Document, DocumentContent, DocumentId, DocumentKind, DocumentReview,
    DocumentStatus, Folder, FolderCategory, FolderId, FolderReview, FolderStatus,
    FolderSubmission, ParentFolderId, ReviewDecision,
};
use super::hierarchy::{self, ParentOverview};
use super::notifications::{
    approved_event, dedup_emails, rejected_event, submitted_event, DeliveryReport, FolderEvent,
    NotificationPublisher,
};
use super::repository::{FolderStore, StoreError};

/// Operational dials for the transition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Addresses notified whenever a folder lands in review.
    pub reviewer_pool: Vec<String>,
    /// How many times a transition re-reads and retries after a version
    /// conflict before giving up.
    pub persistence_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reviewer_pool: Vec::new(),
            persistence_retries: 3,
        }
    }
}

/// File metadata handed over by the upload collaborator together with the
/// optional validity horizon of the underlying certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub url: String,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub expires_on: Option<NaiveDate>,
}

/// Committed transition plus the notification delivery outcome. Delivery is
/// metadata only; a failed dispatch never unwinds the transition.
#[derive(Debug, Clone)]
pub struct FolderReceipt {
    pub folder: Folder,
    pub delivery: DeliveryReport,
}

impl FolderReceipt {
    pub fn status_view(&self) -> TransitionView {
        TransitionView {
            folder_id: self.folder.id.clone(),
            subject: self.folder.subject.clone(),
            status: self.folder.status.label(),
            delivery: self.delivery.clone(),
        }
    }
}

/// Serialized shape of a committed transition for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub folder_id: FolderId,
    pub subject: String,
    pub status: &'static str,
    pub delivery: DeliveryReport,
}

/// Per-document row inside a folder view.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub label: &'static str,
    pub status: DocumentStatus,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

/// Read model for one folder: current status, its documents in checklist
/// order, and what still blocks submission.
#[derive(Debug, Clone, Serialize)]
pub struct FolderView {
    pub folder_id: FolderId,
    pub subject: String,
    pub category: FolderCategory,
    pub status: FolderStatus,
    pub documents: Vec<DocumentView>,
    pub missing_required: Vec<DocumentKind>,
    pub completion_percentage: f32,
}

static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_document_id() -> DocumentId {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DocumentId(format!("doc-{id:06}"))
}

fn kind_list(kinds: &[DocumentKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error raised by the transition engine.
#[derive(Debug, thiserror::Error)]
pub enum FolderWorkflowError {
    #[error("folder checklist incomplete, missing: {}", kind_list(.missing))]
    IncompleteChecklist { missing: Vec<DocumentKind> },
    #[error("folder is locked while {}", .status.label())]
    FolderLocked { status: FolderStatus },
    #[error("document cannot be reviewed while {}", .status.label())]
    InvalidTransition { status: DocumentStatus },
    #[error("rejecting a document requires reviewer notes")]
    MissingRejectionReason,
    #[error("{} documents do not belong in {} folders", .kind.label(), .category.label())]
    KindNotInChecklist {
        kind: DocumentKind,
        category: FolderCategory,
    },
    #[error("the {} role may not perform this operation", .role.label())]
    RoleNotAllowed { role: ActorRole },
    #[error("folder kept changing underneath the transition ({attempts} attempts)")]
    PersistenceConflict { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The transition engine: validates and applies folder- and document-level
/// transitions, re-deriving the folder status inside the same commit as the
/// triggering document write.
pub struct FolderWorkflowService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    config: WorkflowConfig,
}

impl<S, N> FolderWorkflowService<S, N>
where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: WorkflowConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Attach or replace a document's content while the folder is still
    /// editable. Content writes against a submitted or approved folder fail
    /// with `FolderLocked`; this is the write-guard protecting an in-flight
    /// review.
    pub fn upload_document(
        &self,
        folder_id: &FolderId,
        kind: DocumentKind,
        upload: DocumentUpload,
        actor: &Actor,
    ) -> Result<Document, FolderWorkflowError> {
        self.with_retries(|| {
            let mut folder = self.fetch_folder(folder_id)?;
            if folder.is_locked() {
                return Err(FolderWorkflowError::FolderLocked {
                    status: folder.status,
                });
            }

            let list = checklist(folder.category);
            if !list.allows(kind) {
                return Err(FolderWorkflowError::KindNotInChecklist {
                    kind,
                    category: folder.category,
                });
            }

            let mut documents = self.store.documents_in(folder_id)?;
            let now = Utc::now();
            let content = DocumentContent {
                url: upload.url.clone(),
                name: upload.name.clone(),
                content_type: upload.content_type.clone(),
                size: upload.size,
            };

            let slot = documents.iter().position(|document| document.kind == kind);
            let document = match slot {
                Some(index) => {
                    let existing = &mut documents[index];
                    existing.content = Some(content);
                    existing.status = DocumentStatus::Draft;
                    existing.uploaded_at = Some(now);
                    existing.uploaded_by = Some(actor.id.clone());
                    existing.expires_on = upload.expires_on;
                    // superseded content invalidates the previous verdict
                    existing.review = None;
                    existing.clone()
                }
                None => {
                    let created = Document {
                        id: next_document_id(),
                        folder_id: folder_id.clone(),
                        kind,
                        status: DocumentStatus::Draft,
                        content: Some(content),
                        uploaded_at: Some(now),
                        uploaded_by: Some(actor.id.clone()),
                        expires_on: upload.expires_on,
                        review: None,
                    };
                    documents.push(created.clone());
                    created
                }
            };

            let expected_version = folder.version;
            folder.status = aggregate_status(list, &documents);
            self.store
                .commit_folder(folder, vec![document.clone()], expected_version)?;
            Ok(document)
        })
    }

    /// Send a folder for review. Legal from draft or rejected only, and only
    /// once every required checklist entry carries content; the error lists
    /// exactly the missing kinds so the caller can surface them.
    pub fn submit_folder(
        &self,
        folder_id: &FolderId,
        actor: &Actor,
        notification_emails: Vec<String>,
    ) -> Result<FolderReceipt, FolderWorkflowError> {
        let (folder, event) = self.with_retries(|| {
            let mut folder = self.fetch_folder(folder_id)?;
            if !matches!(folder.status, FolderStatus::Draft | FolderStatus::Rejected) {
                return Err(FolderWorkflowError::FolderLocked {
                    status: folder.status,
                });
            }

            let list = checklist(folder.category);
            let mut documents = self.store.documents_in(folder_id)?;
            let missing = missing_required(list, &documents);
            if !missing.is_empty() {
                return Err(FolderWorkflowError::IncompleteChecklist { missing });
            }

            let mut touched = Vec::new();
            for document in documents.iter_mut() {
                if document.status == DocumentStatus::Draft && document.has_content() {
                    document.status = DocumentStatus::Submitted;
                    touched.push(document.clone());
                }
            }

            folder.submission = Some(FolderSubmission {
                submitted_at: Utc::now(),
                submitted_by: actor.id.clone(),
                notification_emails: dedup_emails(notification_emails.clone()),
            });
            let expected_version = folder.version;
            folder.status = aggregate_status(list, &documents);
            let committed = self.store.commit_folder(folder, touched, expected_version)?;
            let event = submitted_event(&committed, &self.config.reviewer_pool);
            Ok((committed, event))
        })?;

        let delivery = self.dispatch(event);
        Ok(FolderReceipt { folder, delivery })
    }

    /// Record a reviewer verdict on one submitted document and re-derive the
    /// folder status. When the aggregate lands on approved or rejected the
    /// folder-level review trail is stamped and the matching event emitted.
    pub fn review_document(
        &self,
        folder_id: &FolderId,
        document_id: &DocumentId,
        decision: ReviewDecision,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<FolderReceipt, FolderWorkflowError> {
        if actor.role != ActorRole::Reviewer {
            return Err(FolderWorkflowError::RoleNotAllowed { role: actor.role });
        }
        let notes = notes.filter(|text| !text.trim().is_empty());
        if decision == ReviewDecision::Reject && notes.is_none() {
            return Err(FolderWorkflowError::MissingRejectionReason);
        }

        let (folder, event) = self.with_retries(|| {
            let mut folder = self.fetch_folder(folder_id)?;
            let list = checklist(folder.category);
            let mut documents = self.store.documents_in(folder_id)?;
            let document = documents
                .iter_mut()
                .find(|document| document.id == *document_id)
                .ok_or(StoreError::NotFound)?;
            if document.status != DocumentStatus::Submitted {
                return Err(FolderWorkflowError::InvalidTransition {
                    status: document.status,
                });
            }

            let now = Utc::now();
            document.status = match decision {
                ReviewDecision::Approve => DocumentStatus::Approved,
                ReviewDecision::Reject => DocumentStatus::Rejected,
            };
            document.review = Some(DocumentReview {
                reviewed_by: actor.id.clone(),
                reviewed_at: now,
                notes: notes.clone(),
            });
            let touched = document.clone();

            let previous = folder.status;
            let expected_version = folder.version;
            folder.status = aggregate_status(list, &documents);
            let settled = folder.status != previous
                && matches!(
                    folder.status,
                    FolderStatus::Approved | FolderStatus::Rejected
                );
            if settled {
                folder.review = Some(FolderReview {
                    reviewed_at: now,
                    reviewer: actor.id.clone(),
                    comments: notes.clone(),
                });
            }

            let committed = self
                .store
                .commit_folder(folder, vec![touched], expected_version)?;
            let event = match (settled, committed.status) {
                (true, FolderStatus::Approved) => Some(approved_event(&committed)),
                (true, FolderStatus::Rejected) => Some(rejected_event(&committed, &documents)),
                _ => None,
            };
            Ok((committed, event))
        })?;

        let delivery = self.dispatch(event);
        Ok(FolderReceipt { folder, delivery })
    }

    /// Read model for one folder, including expiration flags computed
    /// against the supplied date.
    pub fn folder_view(
        &self,
        folder_id: &FolderId,
        today: NaiveDate,
    ) -> Result<FolderView, FolderWorkflowError> {
        let folder = self.fetch_folder(folder_id)?;
        let list = checklist(folder.category);
        let documents = self.store.documents_in(folder_id)?;

        let missing = missing_required(list, &documents);
        let (approved, total) = required_progress(list, &documents);
        let completion_percentage = if total == 0 {
            1.0
        } else {
            approved as f32 / total as f32
        };

        Ok(FolderView {
            folder_id: folder.id.clone(),
            subject: folder.subject.clone(),
            category: folder.category,
            status: folder.status,
            documents: ordered_views(list, &documents, today),
            missing_required: missing,
            completion_percentage,
        })
    }

    /// Roll-up across a parent's children, recomputed from current rows.
    pub fn parent_overview(
        &self,
        parent_id: &ParentFolderId,
    ) -> Result<ParentOverview, FolderWorkflowError> {
        let parent = self
            .store
            .fetch_parent(parent_id)?
            .ok_or(StoreError::NotFound)?;
        let children = self.store.children_of(parent_id)?;
        let mut rows = Vec::with_capacity(children.len());
        for child in children {
            let documents = self.store.documents_in(&child.id)?;
            rows.push((child, documents));
        }
        Ok(hierarchy::parent_overview(&parent, &rows))
    }

    fn fetch_folder(&self, folder_id: &FolderId) -> Result<Folder, FolderWorkflowError> {
        Ok(self
            .store
            .fetch_folder(folder_id)?
            .ok_or(StoreError::NotFound)?)
    }

    fn with_retries<T>(
        &self,
        mut attempt: impl FnMut() -> Result<T, FolderWorkflowError>,
    ) -> Result<T, FolderWorkflowError> {
        let mut attempts = 0;
        loop {
            match attempt() {
                Err(FolderWorkflowError::Store(StoreError::VersionConflict)) => {
                    attempts += 1;
                    if attempts > self.config.persistence_retries {
                        return Err(FolderWorkflowError::PersistenceConflict { attempts });
                    }
                }
                other => return other,
            }
        }
    }

    fn dispatch(&self, event: Option<FolderEvent>) -> DeliveryReport {
        let Some(event) = event else {
            return DeliveryReport::NotRequired;
        };
        match self.notifier.publish(event) {
            Ok(()) => DeliveryReport::Delivered,
            Err(err) => {
                tracing::warn!(error = %err, "notification dispatch failed");
                DeliveryReport::Failed(err.to_string())
            }
        }
    }
}

fn ordered_views(list: &Checklist, documents: &[Document], today: NaiveDate) -> Vec<DocumentView> {
    let mut views = Vec::with_capacity(documents.len());
    for entry in list.entries() {
        for document in documents.iter().filter(|d| d.kind == entry.kind) {
            views.push(document_view(document, entry.required, today));
        }
    }
    for document in documents
        .iter()
        .filter(|d| list.entry(d.kind).is_none())
    {
        views.push(document_view(document, false, today));
    }
    views
}

fn document_view(document: &Document, required: bool, today: NaiveDate) -> DocumentView {
    DocumentView {
        id: document.id.clone(),
        kind: document.kind,
        label: document.kind.label(),
        status: document.status,
        required,
        name: document
            .content
            .as_ref()
            .map(|content| content.name.clone()),
        url: document.content.as_ref().map(|content| content.url.clone()),
        expires_on: document.expires_on,
        expired: document.is_expired(today),
        review_notes: document
            .review
            .as_ref()
            .and_then(|review| review.notes.clone()),
    }
}
