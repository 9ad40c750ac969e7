//! Folder/document review workflow for contractor compliance.
//!
//! A folder tracks one checklist's review lifecycle for one subject (a
//! company, a worker, a vehicle, or a monthly labor-control period). Folder
//! status is always derived from the aggregate state of the folder's
//! documents; the transition engine is the only write path, and every
//! transition commits the recomputed status together with the triggering
//! document write.

pub mod aggregation;
pub mod catalog;
pub mod domain;
pub mod hierarchy;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{checklist, Checklist, ChecklistEntry};
pub use domain::{
    Actor, ActorId, ActorRole, Document, DocumentContent, DocumentId, DocumentKind,
    DocumentReview, DocumentStatus, Folder, FolderCategory, FolderId, FolderReview, FolderStatus,
    FolderSubmission, ParentFolder, ParentFolderId, ParentKind, ReviewDecision,
};
pub use hierarchy::{ChildFolderSummary, ParentOverview};
pub use notifications::{
    DeliveryReport, FolderEvent, NotificationError, NotificationPublisher, RejectedDocument,
};
pub use repository::{FolderStore, StoreError};
pub use router::folder_router;
pub use service::{
    DocumentUpload, DocumentView, FolderReceipt, FolderView, FolderWorkflowError,
    FolderWorkflowService, TransitionView, WorkflowConfig,
};
