use super::domain::{Document, DocumentId, Folder, FolderId, ParentFolder, ParentFolderId};

/// Storage abstraction so the transition engine can be exercised in
/// isolation. Row writes outside `commit_folder` exist for the provisioning
/// collaborator; the engine itself only ever mutates through the commit path.
pub trait FolderStore: Send + Sync {
    fn insert_folder(&self, folder: Folder) -> Result<Folder, StoreError>;
    fn fetch_folder(&self, id: &FolderId) -> Result<Option<Folder>, StoreError>;

    fn insert_document(&self, document: Document) -> Result<Document, StoreError>;
    fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;
    fn documents_in(&self, folder: &FolderId) -> Result<Vec<Document>, StoreError>;

    fn insert_parent(&self, parent: ParentFolder) -> Result<ParentFolder, StoreError>;
    fn fetch_parent(&self, id: &ParentFolderId) -> Result<Option<ParentFolder>, StoreError>;
    fn children_of(&self, id: &ParentFolderId) -> Result<Vec<Folder>, StoreError>;

    /// Persist a folder update together with the documents touched by the
    /// same transition as one unit: either everything commits or nothing
    /// does. Implementations must compare `expected_version` against the
    /// stored folder row and fail with [`StoreError::VersionConflict`] on a
    /// stale read; on success the stored version is bumped past
    /// `expected_version`. The returned folder carries the committed version.
    fn commit_folder(
        &self,
        folder: Folder,
        documents: Vec<Document>,
        expected_version: u64,
    ) -> Result<Folder, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("folder row changed underneath the transition")]
    VersionConflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
