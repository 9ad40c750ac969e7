use serde::{Deserialize, Serialize};

use super::domain::{
    ActorId, Document, DocumentKind, DocumentStatus, Folder, FolderId,
};

/// Outbound event emitted after a committed transition. Transport (email,
/// in-app) is a collaborator's concern; the engine only builds the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FolderEvent {
    Submitted {
        folder_id: FolderId,
        subject: String,
        submitted_by: ActorId,
        recipients: Vec<String>,
    },
    Approved {
        folder_id: FolderId,
        subject: String,
        recipients: Vec<String>,
    },
    Rejected {
        folder_id: FolderId,
        subject: String,
        recipients: Vec<String>,
        rejected_documents: Vec<RejectedDocument>,
    },
}

/// Rejection detail carried on `FolderEvent::Rejected` so the notification
/// can tell the contractor what to fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedDocument {
    pub kind: DocumentKind,
    pub notes: Option<String>,
}

/// Trait describing the outbound notification hook. Implementations live
/// with the transport collaborator (e-mail gateway, in-app feed).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, event: FolderEvent) -> Result<(), NotificationError>;
}

/// Notification dispatch error. Never propagated as a transition failure.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Delivery outcome attached to a transition receipt as metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryReport {
    NotRequired,
    Delivered,
    Failed(String),
}

fn dedup_preserving_order(emails: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for email in emails {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|known| known.eq_ignore_ascii_case(trimmed)) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

/// Recipients for a submission: the configured reviewer pool.
pub(crate) fn submitted_event(folder: &Folder, reviewer_pool: &[String]) -> Option<FolderEvent> {
    let submission = folder.submission.as_ref()?;
    Some(FolderEvent::Submitted {
        folder_id: folder.id.clone(),
        subject: folder.subject.clone(),
        submitted_by: submission.submitted_by.clone(),
        recipients: dedup_preserving_order(reviewer_pool.iter().cloned()),
    })
}

/// Recipients for a verdict: the extra addresses registered at submission.
fn verdict_recipients(folder: &Folder) -> Vec<String> {
    dedup_preserving_order(
        folder
            .submission
            .iter()
            .flat_map(|submission| submission.notification_emails.iter().cloned()),
    )
}

pub(crate) fn approved_event(folder: &Folder) -> FolderEvent {
    FolderEvent::Approved {
        folder_id: folder.id.clone(),
        subject: folder.subject.clone(),
        recipients: verdict_recipients(folder),
    }
}

pub(crate) fn rejected_event(folder: &Folder, documents: &[Document]) -> FolderEvent {
    let rejected_documents = documents
        .iter()
        .filter(|document| document.status == DocumentStatus::Rejected)
        .map(|document| RejectedDocument {
            kind: document.kind,
            notes: document
                .review
                .as_ref()
                .and_then(|review| review.notes.clone()),
        })
        .collect();

    FolderEvent::Rejected {
        folder_id: folder.id.clone(),
        subject: folder.subject.clone(),
        recipients: verdict_recipients(folder),
        rejected_documents,
    }
}

pub(crate) fn dedup_emails(emails: Vec<String>) -> Vec<String> {
    dedup_preserving_order(emails)
}
