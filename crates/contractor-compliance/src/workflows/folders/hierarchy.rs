use serde::Serialize;

use super::aggregation::required_progress;
use super::catalog::checklist;
use super::domain::{
    Document, Folder, FolderCategory, FolderId, FolderStatus, ParentFolder, ParentFolderId,
    ParentKind,
};

/// Per-child roll-up row inside a parent overview.
#[derive(Debug, Clone, Serialize)]
pub struct ChildFolderSummary {
    pub folder_id: FolderId,
    pub category: FolderCategory,
    pub subject: String,
    pub status: FolderStatus,
    pub approved_required: usize,
    pub total_required: usize,
}

/// Computed read model over a startup or labor-control aggregate. These are
/// views recomputed from current child rows; they never feed back into a
/// child's own transition logic.
#[derive(Debug, Clone, Serialize)]
pub struct ParentOverview {
    pub parent_id: ParentFolderId,
    pub kind: ParentKind,
    pub subject: String,
    pub completion_percentage: f32,
    pub pending_review: bool,
    pub children: Vec<ChildFolderSummary>,
}

/// Roll child folders up into the parent's completion percentage (approved
/// required documents over total required documents across all children) and
/// pending-review flag (any child sitting in submitted).
pub fn parent_overview(parent: &ParentFolder, children: &[(Folder, Vec<Document>)]) -> ParentOverview {
    let mut approved_total = 0usize;
    let mut required_total = 0usize;
    let mut pending_review = false;
    let mut rows = Vec::with_capacity(children.len());

    for (folder, documents) in children {
        let (approved, total) = required_progress(checklist(folder.category), documents);
        approved_total += approved;
        required_total += total;
        pending_review |= folder.status == FolderStatus::Submitted;
        rows.push(ChildFolderSummary {
            folder_id: folder.id.clone(),
            category: folder.category,
            subject: folder.subject.clone(),
            status: folder.status,
            approved_required: approved,
            total_required: total,
        });
    }

    let completion_percentage = if required_total == 0 {
        0.0
    } else {
        approved_total as f32 / required_total as f32
    };

    ParentOverview {
        parent_id: parent.id.clone(),
        kind: parent.kind,
        subject: parent.subject.clone(),
        completion_percentage,
        pending_review,
        children: rows,
    }
}
