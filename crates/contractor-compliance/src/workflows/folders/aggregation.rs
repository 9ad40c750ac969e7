use super::catalog::Checklist;
use super::domain::{Document, DocumentKind, DocumentStatus, FolderStatus};

/// Required kinds that have no content-bearing document yet, in checklist
/// order. This is the list surfaced verbatim by the submission gate.
pub fn missing_required(checklist: &Checklist, documents: &[Document]) -> Vec<DocumentKind> {
    checklist
        .required_kinds()
        .filter(|kind| {
            !documents
                .iter()
                .any(|document| document.kind == *kind && document.has_content())
        })
        .collect()
}

/// Derive a folder's status from its documents.
///
/// The check order is the tie-break policy: a rejection only wins once no
/// required document is still awaiting review, and approval requires every
/// required document to be approved. Re-running without document changes
/// always yields the same answer.
pub fn aggregate_status(checklist: &Checklist, documents: &[Document]) -> FolderStatus {
    let required: Vec<&Document> = checklist
        .required_kinds()
        .filter_map(|kind| {
            documents
                .iter()
                .find(|document| document.kind == kind && document.has_content())
        })
        .collect();

    let total_required = checklist.required_kinds().count();
    let unsatisfied = required.len() < total_required;
    let any_draft = required
        .iter()
        .any(|document| document.status == DocumentStatus::Draft);
    if unsatisfied || any_draft {
        return FolderStatus::Draft;
    }

    if required
        .iter()
        .all(|document| document.status == DocumentStatus::Approved)
    {
        return FolderStatus::Approved;
    }

    let any_rejected = required
        .iter()
        .any(|document| document.status == DocumentStatus::Rejected);
    let any_submitted = required
        .iter()
        .any(|document| document.status == DocumentStatus::Submitted);
    if any_rejected && !any_submitted {
        return FolderStatus::Rejected;
    }

    FolderStatus::Submitted
}

/// `(approved_required, total_required)` counts feeding folder views and
/// parent roll-ups.
pub fn required_progress(checklist: &Checklist, documents: &[Document]) -> (usize, usize) {
    let total = checklist.required_kinds().count();
    let approved = checklist
        .required_kinds()
        .filter(|kind| {
            documents.iter().any(|document| {
                document.kind == *kind
                    && document.has_content()
                    && document.status == DocumentStatus::Approved
            })
        })
        .count();
    (approved, total)
}
