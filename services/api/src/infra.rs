use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use contractor_compliance::config::WorkflowSettings;
use contractor_compliance::workflows::folders::{
    checklist, Document, DocumentId, Folder, FolderCategory, FolderEvent, FolderId, FolderStore,
    NotificationError, NotificationPublisher, ParentFolder, ParentFolderId, ParentKind,
    StoreError, WorkflowConfig,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreInner {
    folders: HashMap<FolderId, Folder>,
    documents: HashMap<DocumentId, Document>,
    parents: HashMap<ParentFolderId, ParentFolder>,
}

/// Single-process store backing the service until the relational adapter is
/// wired in. Commit semantics mirror the row-versioned folder table.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFolderStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl FolderStore for InMemoryFolderStore {
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

/// Publisher standing in for the mail/in-app transport collaborator: logs
/// every event and keeps it around so the demo can print the outbox.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationPublisher {
    events: Arc<Mutex<Vec<FolderEvent>>>,
}

impl LoggingNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<FolderEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl NotificationPublisher for LoggingNotificationPublisher {
    fn publish(&self, event: FolderEvent) -> Result<(), NotificationError> {
        info!(?event, "folder event dispatched");
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(crate) fn workflow_config(settings: &WorkflowSettings) -> WorkflowConfig {
    WorkflowConfig {
        reviewer_pool: settings.reviewer_emails.clone(),
        persistence_retries: settings.persistence_retries,
    }
}

static PROVISION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let id = PROVISION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:04}")
}

/// Create one empty folder plus its checklist placeholders, the way the
/// provisioning job seeds rows when a company, worker, or vehicle registers.
pub(crate) fn provision_folder(
    store: &InMemoryFolderStore,
    category: FolderCategory,
    subject: &str,
    parent: Option<ParentFolderId>,
) -> FolderId {
    let folder_id = FolderId(next_id("folder"));
    store
        .insert_folder(Folder::new(folder_id.clone(), category, parent, subject))
        .expect("folder inserts");
    for entry in checklist(category).entries() {
        store
            .insert_document(Document::placeholder(
                DocumentId(next_id("doc")),
                folder_id.clone(),
                entry.kind,
            ))
            .expect("placeholder inserts");
    }
    folder_id
}

/// Seed a startup folder: company, safety, and environmental folders plus
/// one personnel folder per worker and one vehicle folder per plate.
pub(crate) fn provision_startup(
    store: &InMemoryFolderStore,
    company: &str,
    workers: &[String],
    vehicles: &[String],
) -> ParentFolderId {
    let parent_id = ParentFolderId(next_id("startup"));
    let mut children = vec![
        provision_folder(
            store,
            FolderCategory::Company,
            company,
            Some(parent_id.clone()),
        ),
        provision_folder(
            store,
            FolderCategory::SafetyAndHealth,
            company,
            Some(parent_id.clone()),
        ),
        provision_folder(
            store,
            FolderCategory::Environmental,
            company,
            Some(parent_id.clone()),
        ),
    ];
    for worker in workers {
        children.push(provision_folder(
            store,
            FolderCategory::Personnel,
            worker,
            Some(parent_id.clone()),
        ));
    }
    for vehicle in vehicles {
        children.push(provision_folder(
            store,
            FolderCategory::Vehicles,
            vehicle,
            Some(parent_id.clone()),
        ));
    }

    store
        .insert_parent(ParentFolder {
            id: parent_id.clone(),
            kind: ParentKind::Startup,
            subject: company.to_string(),
            children,
        })
        .expect("parent inserts");
    parent_id
}
