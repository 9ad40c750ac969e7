use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::folders::catalog::checklist;
use crate::workflows::folders::domain::{
    Actor, ActorId, ActorRole, Document, DocumentId, DocumentKind, Folder, FolderCategory,
    FolderId, ParentFolder, ParentFolderId, ParentKind,
};
use crate::workflows::folders::notifications::{
    FolderEvent, NotificationError, NotificationPublisher,
};
use crate::workflows::folders::repository::{FolderStore, StoreError};
use crate::workflows::folders::service::{
    DocumentUpload, FolderWorkflowService, WorkflowConfig,
};

#[derive(Default)]
struct MemoryStoreInner {
    folders: HashMap<FolderId, Folder>,
    documents: HashMap<DocumentId, Document>,
    parents: HashMap<ParentFolderId, ParentFolder>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryFolderStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl FolderStore for MemoryFolderStore {
    fn insert_folder(&self, folder: Folder) -> Result<Folder, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.folders.contains_key(&folder.id) {
            return Err(StoreError::Conflict);
        }
        guard.folders.insert(folder.id.clone(), folder.clone());
        Ok(folder)
    }

    fn fetch_folder(&self, id: &FolderId) -> Result<Option<Folder>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.folders.get(id).cloned())
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
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.documents.get(id).cloned())
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
        if guard.parents.contains_key(&parent.id) {
            return Err(StoreError::Conflict);
        }
        guard.parents.insert(parent.id.clone(), parent.clone());
        Ok(parent)
    }

    fn fetch_parent(&self, id: &ParentFolderId) -> Result<Option<ParentFolder>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.parents.get(id).cloned())
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
        let stored = guard
            .folders
            .get(&folder.id)
            .ok_or(StoreError::NotFound)?;
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

/// Store that never lets a commit through, to drive the retry path.
pub(super) struct ContendedStore {
    delegate: MemoryFolderStore,
}

impl ContendedStore {
    pub(super) fn new(delegate: MemoryFolderStore) -> Self {
        Self { delegate }
    }
}

impl FolderStore for ContendedStore {
    fn insert_folder(&self, folder: Folder) -> Result<Folder, StoreError> {
        self.delegate.insert_folder(folder)
    }

    fn fetch_folder(&self, id: &FolderId) -> Result<Option<Folder>, StoreError> {
        self.delegate.fetch_folder(id)
    }

    fn insert_document(&self, document: Document) -> Result<Document, StoreError> {
        self.delegate.insert_document(document)
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        self.delegate.fetch_document(id)
    }

    fn documents_in(&self, folder: &FolderId) -> Result<Vec<Document>, StoreError> {
        self.delegate.documents_in(folder)
    }

    fn insert_parent(&self, parent: ParentFolder) -> Result<ParentFolder, StoreError> {
        self.delegate.insert_parent(parent)
    }

    fn fetch_parent(&self, id: &ParentFolderId) -> Result<Option<ParentFolder>, StoreError> {
        self.delegate.fetch_parent(id)
    }

    fn children_of(&self, id: &ParentFolderId) -> Result<Vec<Folder>, StoreError> {
        self.delegate.children_of(id)
    }

    fn commit_folder(
        &self,
        _folder: Folder,
        _documents: Vec<Document>,
        _expected_version: u64,
    ) -> Result<Folder, StoreError> {
        Err(StoreError::VersionConflict)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<FolderEvent>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<FolderEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, event: FolderEvent) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct FailingNotifications;

impl NotificationPublisher for FailingNotifications {
    fn publish(&self, _event: FolderEvent) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) fn workflow_config() -> WorkflowConfig {
    WorkflowConfig {
        reviewer_pool: vec![
            "review@compliance.example".to_string(),
            "safety@compliance.example".to_string(),
        ],
        persistence_retries: 3,
    }
}

pub(super) fn contractor() -> Actor {
    Actor {
        id: ActorId("contractor-ana".to_string()),
        role: ActorRole::Contractor,
    }
}

pub(super) fn reviewer() -> Actor {
    Actor {
        id: ActorId("reviewer-luis".to_string()),
        role: ActorRole::Reviewer,
    }
}

pub(super) fn upload(name: &str) -> DocumentUpload {
    DocumentUpload {
        url: format!("s3://compliance/{name}.pdf"),
        name: format!("{name}.pdf"),
        content_type: "application/pdf".to_string(),
        size: 24_576,
        expires_on: None,
    }
}

static FIXTURE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_fixture_id(prefix: &str) -> String {
    let id = FIXTURE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:04}")
}

/// Create an empty folder plus its placeholder documents, the way the
/// provisioning collaborator does.
pub(super) fn provision_folder(
    store: &MemoryFolderStore,
    category: FolderCategory,
    subject: &str,
) -> FolderId {
    provision_folder_under(store, category, subject, None)
}

pub(super) fn provision_folder_under(
    store: &MemoryFolderStore,
    category: FolderCategory,
    subject: &str,
    parent: Option<ParentFolderId>,
) -> FolderId {
    let folder_id = FolderId(next_fixture_id("folder"));
    store
        .insert_folder(Folder::new(folder_id.clone(), category, parent, subject))
        .expect("folder inserts");
    for entry in checklist(category).entries() {
        let document = Document::placeholder(
            DocumentId(next_fixture_id("seed-doc")),
            folder_id.clone(),
            entry.kind,
        );
        store.insert_document(document).expect("placeholder inserts");
    }
    folder_id
}

pub(super) fn provision_parent(
    store: &MemoryFolderStore,
    kind: ParentKind,
    subject: &str,
    children: Vec<FolderId>,
) -> ParentFolderId {
    let parent_id = ParentFolderId(next_fixture_id("parent"));
    store
        .insert_parent(ParentFolder {
            id: parent_id.clone(),
            kind,
            subject: subject.to_string(),
            children,
        })
        .expect("parent inserts");
    parent_id
}

pub(super) fn build_service() -> (
    FolderWorkflowService<MemoryFolderStore, MemoryNotifications>,
    MemoryFolderStore,
    MemoryNotifications,
) {
    let store = MemoryFolderStore::default();
    let notifier = MemoryNotifications::default();
    let service = FolderWorkflowService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        workflow_config(),
    );
    (service, store, notifier)
}

/// Upload content into every required checklist slot of a folder.
pub(super) fn upload_required<S, N>(
    service: &FolderWorkflowService<S, N>,
    folder_id: &FolderId,
    category: FolderCategory,
) where
    S: FolderStore + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = contractor();
    for kind in checklist(category).required_kinds() {
        service
            .upload_document(folder_id, kind, upload(kind.label()), &actor)
            .expect("required upload succeeds");
    }
}

pub(super) fn find_document<S: FolderStore>(
    store: &S,
    folder_id: &FolderId,
    kind: DocumentKind,
) -> Document {
    store
        .documents_in(folder_id)
        .expect("documents load")
        .into_iter()
        .find(|document| document.kind == kind)
        .expect("document present")
}
