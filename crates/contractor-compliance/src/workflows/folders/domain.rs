use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for checklist folders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(pub String);

/// Identifier wrapper for documents attached to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Identifier wrapper for startup / labor-control parent aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentFolderId(pub String);

/// Opaque actor identifier handed in by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Pre-authorized caller identity. The engine trusts the role and only checks
/// that it fits the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Contractor,
    Reviewer,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            ActorRole::Contractor => "contractor",
            ActorRole::Reviewer => "reviewer",
        }
    }
}

/// Checklist families. One folder tracks exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderCategory {
    Company,
    SafetyAndHealth,
    Environmental,
    Personnel,
    Vehicles,
    LaborControl,
}

impl FolderCategory {
    pub const fn label(self) -> &'static str {
        match self {
            FolderCategory::Company => "company",
            FolderCategory::SafetyAndHealth => "safety and health",
            FolderCategory::Environmental => "environmental",
            FolderCategory::Personnel => "personnel",
            FolderCategory::Vehicles => "vehicles",
            FolderCategory::LaborControl => "labor control",
        }
    }
}

/// Every document type accepted across the checklist families. `Other`
/// covers free-form attachments where a category admits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    // company
    TaxRegistration,
    CommercialRegistry,
    LiabilityInsurance,
    MutualAffiliation,
    // safety and health
    RiskAssessment,
    EmergencyPlan,
    SafetyPolicy,
    // environmental
    WasteManagementPlan,
    EnvironmentalPermit,
    // personnel
    IdCard,
    EmploymentContract,
    SocialSecurityAffiliation,
    MedicalFitnessCertificate,
    SafetyInduction,
    // vehicles
    RegistrationCard,
    TechnicalInspection,
    VehicleInsurance,
    DriverLicense,
    // labor control, renewed monthly
    PayrollSummary,
    SocialSecurityPayment,
    WithholdingTaxReceipt,
    Other,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::TaxRegistration => "tax registration certificate",
            DocumentKind::CommercialRegistry => "commercial registry excerpt",
            DocumentKind::LiabilityInsurance => "liability insurance policy",
            DocumentKind::MutualAffiliation => "mutual affiliation certificate",
            DocumentKind::RiskAssessment => "risk assessment",
            DocumentKind::EmergencyPlan => "emergency plan",
            DocumentKind::SafetyPolicy => "safety policy",
            DocumentKind::WasteManagementPlan => "waste management plan",
            DocumentKind::EnvironmentalPermit => "environmental permit",
            DocumentKind::IdCard => "identity card",
            DocumentKind::EmploymentContract => "employment contract",
            DocumentKind::SocialSecurityAffiliation => "social security affiliation",
            DocumentKind::MedicalFitnessCertificate => "medical fitness certificate",
            DocumentKind::SafetyInduction => "safety induction record",
            DocumentKind::RegistrationCard => "vehicle registration card",
            DocumentKind::TechnicalInspection => "technical inspection report",
            DocumentKind::VehicleInsurance => "vehicle insurance policy",
            DocumentKind::DriverLicense => "driver license",
            DocumentKind::PayrollSummary => "payroll summary",
            DocumentKind::SocialSecurityPayment => "social security payment receipt",
            DocumentKind::WithholdingTaxReceipt => "withholding tax receipt",
            DocumentKind::Other => "other supporting document",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl FolderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FolderStatus::Draft => "draft",
            FolderStatus::Submitted => "submitted",
            FolderStatus::Approved => "approved",
            FolderStatus::Rejected => "rejected",
        }
    }
}

/// Stored-file pointer handed over by the upload collaborator. The engine
/// never touches the bytes behind `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub url: String,
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

/// Review trail recorded when a reviewer acts on a submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReview {
    pub reviewed_by: ActorId,
    pub reviewed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// One checklist entry's artifact. Placeholders exist before any upload;
/// uploads replace content in place and documents are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub folder_id: FolderId,
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    pub content: Option<DocumentContent>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub uploaded_by: Option<ActorId>,
    pub expires_on: Option<NaiveDate>,
    pub review: Option<DocumentReview>,
}

impl Document {
    /// Empty slot awaiting a first upload, as created by provisioning.
    pub fn placeholder(id: DocumentId, folder_id: FolderId, kind: DocumentKind) -> Self {
        Self {
            id,
            folder_id,
            kind,
            status: DocumentStatus::Draft,
            content: None,
            uploaded_at: None,
            uploaded_by: None,
            expires_on: None,
            review: None,
        }
    }

    /// A checklist slot only counts once a non-empty content url is attached.
    pub fn has_content(&self) -> bool {
        self.content
            .as_ref()
            .map(|content| !content.url.is_empty())
            .unwrap_or(false)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.map(|date| date < today).unwrap_or(false)
    }
}

/// Submission trail stamped when a contractor sends a folder for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSubmission {
    pub submitted_at: DateTime<Utc>,
    pub submitted_by: ActorId,
    pub notification_emails: Vec<String>,
}

/// Folder-level review trail, recorded when aggregation lands the folder on
/// approved or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderReview {
    pub reviewed_at: DateTime<Utc>,
    pub reviewer: ActorId,
    pub comments: Option<String>,
}

/// One checklist's review lifecycle for one subject (company, worker,
/// vehicle, or monthly period). `status` is a persisted cache of the
/// aggregation over the folder's documents; only the commit path that also
/// writes the triggering document may update it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub category: FolderCategory,
    pub parent: Option<ParentFolderId>,
    pub subject: String,
    pub status: FolderStatus,
    pub submission: Option<FolderSubmission>,
    pub review: Option<FolderReview>,
    pub version: u64,
}

impl Folder {
    pub fn new(
        id: FolderId,
        category: FolderCategory,
        parent: Option<ParentFolderId>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            parent,
            subject: subject.into(),
            status: FolderStatus::Draft,
            submission: None,
            review: None,
            version: 0,
        }
    }

    /// Content writes are only legal while the folder is draft or rejected.
    pub fn is_locked(&self) -> bool {
        matches!(self.status, FolderStatus::Submitted | FolderStatus::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Startup,
    LaborControl,
}

impl ParentKind {
    pub const fn label(self) -> &'static str {
        match self {
            ParentKind::Startup => "startup folder",
            ParentKind::LaborControl => "labor-control folder",
        }
    }
}

/// Aggregate owning a set of checklist folders. Carries no status of its own;
/// callers read computed views only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentFolder {
    pub id: ParentFolderId,
    pub kind: ParentKind,
    pub subject: String,
    pub children: Vec<FolderId>,
}

/// Reviewer verdict on a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}
