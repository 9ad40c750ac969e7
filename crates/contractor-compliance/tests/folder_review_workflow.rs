use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use contractor_compliance::workflows::folders::{
    checklist, Actor, ActorId, ActorRole, Document, DocumentId, DocumentKind, DocumentStatus,
    DocumentUpload, Folder, FolderCategory, FolderId, FolderStatus, FolderWorkflowError,
    FolderWorkflowService, FolderEvent, FolderStore, NotificationError, NotificationPublisher,
    ParentFolder, ParentFolderId, ReviewDecision, StoreError, WorkflowConfig,
};

#[derive(Default)]
struct Inner {
    folders: HashMap<FolderId, Folder>,
    documents: HashMap<DocumentId, Document>,
    parents: HashMap<ParentFolderId, ParentFolder>,
}

#[derive(Default, Clone)]
struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl FolderStore for MemoryStore {
    fn insert_folder(&self, folder: Folder) -> Result<Folder, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.folders.contains_key(&folder.id) {
            return Err(StoreError::Conflict);
        }
        guard.folders.insert(folder.id.clone(), folder.clone());
        Ok(folder)
    }

    fn fetch_folder(&self, id: &FolderId) -> Result<Option<Folder>, StoreError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .folders
            .get(id)
            .cloned())
    }

    fn insert_document(&self, document: Document) -> Result<Document, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.documents.contains_key(&document.id) {
            return Err(StoreError::Conflict);
        }
        guard
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .documents
            .get(id)
            .cloned())
    }

    fn documents_in(&self, folder: &FolderId) -> Result<Vec<Document>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut documents: Vec<Document> = guard
            .documents
            .values()
            .filter(|document| document.folder_id == *folder)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(documents)
    }

    fn insert_parent(&self, parent: ParentFolder) -> Result<ParentFolder, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.parents.insert(parent.id.clone(), parent.clone());
        Ok(parent)
    }

    fn fetch_parent(&self, id: &ParentFolderId) -> Result<Option<ParentFolder>, StoreError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .parents
            .get(id)
            .cloned())
    }

    fn children_of(&self, id: &ParentFolderId) -> Result<Vec<Folder>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let Some(parent) = guard.parents.get(id) else {
            return Err(StoreError::NotFound);
        };
        Ok(parent
            .children
            .iter()
            .filter_map(|child| guard.folders.get(child).cloned())
            .collect())
    }

    fn commit_folder(
        &self,
        mut folder: Folder,
        documents: Vec<Document>,
        expected_version: u64,
    ) -> Result<Folder, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let stored = guard.folders.get(&folder.id).ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict);
        }
        folder.version = expected_version + 1;
        guard.folders.insert(folder.id.clone(), folder.clone());
        for document in documents {
            guard.documents.insert(document.id.clone(), document);
        }
        Ok(folder)
    }
}

#[derive(Default, Clone)]
struct RecordingNotifier {
    events: Arc<Mutex<Vec<FolderEvent>>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<FolderEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for RecordingNotifier {
    fn publish(&self, event: FolderEvent) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

fn contractor() -> Actor {
    Actor {
        id: ActorId("contractor-ana".to_string()),
        role: ActorRole::Contractor,
    }
}

fn reviewer() -> Actor {
    Actor {
        id: ActorId("reviewer-luis".to_string()),
        role: ActorRole::Reviewer,
    }
}

fn upload(name: &str) -> DocumentUpload {
    DocumentUpload {
        url: format!("s3://compliance/{name}.pdf"),
        name: format!("{name}.pdf"),
        content_type: "application/pdf".to_string(),
        size: 4096,
        expires_on: None,
    }
}

fn provision(
    store: &MemoryStore,
    id: &str,
    category: FolderCategory,
    subject: &str,
) -> FolderId {
    let folder_id = FolderId(id.to_string());
    store
        .insert_folder(Folder::new(folder_id.clone(), category, None, subject))
        .expect("folder inserts");
    for (index, entry) in checklist(category).entries().iter().enumerate() {
        store
            .insert_document(Document::placeholder(
                DocumentId(format!("{id}-doc-{index}")),
                folder_id.clone(),
                entry.kind,
            ))
            .expect("placeholder inserts");
    }
    folder_id
}

fn build_service() -> (
    FolderWorkflowService<MemoryStore, RecordingNotifier>,
    MemoryStore,
    RecordingNotifier,
) {
    let store = MemoryStore::default();
    let notifier = RecordingNotifier::default();
    let config = WorkflowConfig {
        reviewer_pool: vec!["review@compliance.example".to_string()],
        persistence_retries: 3,
    };
    let service = FolderWorkflowService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        config,
    );
    (service, store, notifier)
}

fn document_of(store: &MemoryStore, folder_id: &FolderId, kind: DocumentKind) -> Document {
    store
        .documents_in(folder_id)
        .expect("documents load")
        .into_iter()
        .find(|document| document.kind == kind)
        .expect("document present")
}

// Monthly labor-control checklist: payroll and social security payment
// required, withholding receipt optional. Walks the full rejection and
// resubmission loop down to final approval.
#[test]
fn rejected_folder_recovers_through_a_fresh_cycle() {
    let (service, store, notifier) = build_service();
    let folder_id = provision(&store, "labor-2026-07", FolderCategory::LaborControl, "2026-07");

    service
        .upload_document(
            &folder_id,
            DocumentKind::PayrollSummary,
            upload("payroll"),
            &contractor(),
        )
        .expect("payroll uploads");
    service
        .upload_document(
            &folder_id,
            DocumentKind::SocialSecurityPayment,
            upload("tc1"),
            &contractor(),
        )
        .expect("payment receipt uploads");

    // optional receipt left out on purpose; submission still goes through
    let receipt = service
        .submit_folder(&folder_id, &contractor(), Vec::new())
        .expect("submission succeeds");
    assert_eq!(receipt.folder.status, FolderStatus::Submitted);

    let payroll = document_of(&store, &folder_id, DocumentKind::PayrollSummary);
    let payment = document_of(&store, &folder_id, DocumentKind::SocialSecurityPayment);
    assert_eq!(payroll.status, DocumentStatus::Submitted);
    assert_eq!(payment.status, DocumentStatus::Submitted);

    service
        .review_document(
            &folder_id,
            &payroll.id,
            ReviewDecision::Approve,
            &reviewer(),
            None,
        )
        .expect("payroll approves");
    let receipt = service
        .review_document(
            &folder_id,
            &payment.id,
            ReviewDecision::Reject,
            &reviewer(),
            Some("illegible".to_string()),
        )
        .expect("payment rejects");
    assert_eq!(receipt.folder.status, FolderStatus::Rejected);

    // content may change again while rejected; the folder drops back to draft
    service
        .upload_document(
            &folder_id,
            DocumentKind::SocialSecurityPayment,
            upload("tc1-v2"),
            &contractor(),
        )
        .expect("re-upload while rejected succeeds");
    let folder = store
        .fetch_folder(&folder_id)
        .expect("fetch succeeds")
        .expect("folder present");
    assert_eq!(folder.status, FolderStatus::Draft);

    let receipt = service
        .submit_folder(&folder_id, &contractor(), Vec::new())
        .expect("resubmission succeeds");
    assert_eq!(receipt.folder.status, FolderStatus::Submitted);

    let payment = document_of(&store, &folder_id, DocumentKind::SocialSecurityPayment);
    assert_eq!(payment.status, DocumentStatus::Submitted);
    let payroll = document_of(&store, &folder_id, DocumentKind::PayrollSummary);
    assert_eq!(
        payroll.status,
        DocumentStatus::Approved,
        "earlier approvals survive the new cycle"
    );

    let receipt = service
        .review_document(
            &folder_id,
            &payment.id,
            ReviewDecision::Approve,
            &reviewer(),
            None,
        )
        .expect("final approval lands");
    assert_eq!(receipt.folder.status, FolderStatus::Approved);

    let kinds: Vec<&str> = notifier
        .events()
        .iter()
        .map(|event| match event {
            FolderEvent::Submitted { .. } => "submitted",
            FolderEvent::Approved { .. } => "approved",
            FolderEvent::Rejected { .. } => "rejected",
        })
        .collect();
    assert_eq!(kinds, vec!["submitted", "rejected", "submitted", "approved"]);
}

#[test]
fn submission_without_any_upload_names_the_gap_and_stays_draft() {
    let (service, store, notifier) = build_service();
    let folder_id = provision(
        &store,
        "env-acme",
        FolderCategory::Environmental,
        "Acme Obras SA",
    );

    match service.submit_folder(&folder_id, &contractor(), Vec::new()) {
        Err(FolderWorkflowError::IncompleteChecklist { missing }) => {
            assert_eq!(missing, vec![DocumentKind::WasteManagementPlan]);
        }
        other => panic!("expected incomplete checklist, got {other:?}"),
    }

    let folder = store
        .fetch_folder(&folder_id)
        .expect("fetch succeeds")
        .expect("folder present");
    assert_eq!(folder.status, FolderStatus::Draft);
    assert!(folder.submission.is_none());
    assert!(notifier.events().is_empty());
}
