use super::domain::{DocumentKind, FolderCategory};

/// One checklist row: the expected document type and whether the folder can
/// be approved without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistEntry {
    pub kind: DocumentKind,
    pub required: bool,
}

const fn required(kind: DocumentKind) -> ChecklistEntry {
    ChecklistEntry {
        kind,
        required: true,
    }
}

const fn optional(kind: DocumentKind) -> ChecklistEntry {
    ChecklistEntry {
        kind,
        required: false,
    }
}

/// Ordered document expectations for one folder category.
#[derive(Debug, Clone, Copy)]
pub struct Checklist {
    entries: &'static [ChecklistEntry],
    allows_other: bool,
}

impl Checklist {
    pub fn entries(&self) -> &'static [ChecklistEntry] {
        self.entries
    }

    pub fn allows_other(&self) -> bool {
        self.allows_other
    }

    pub fn entry(&self, kind: DocumentKind) -> Option<&'static ChecklistEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// A kind is accepted when it is listed, or when it is the free-form
    /// `Other` slot and the category admits those.
    pub fn allows(&self, kind: DocumentKind) -> bool {
        if kind == DocumentKind::Other {
            return self.allows_other;
        }
        self.entry(kind).is_some()
    }

    pub fn required_kinds(&self) -> impl Iterator<Item = DocumentKind> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.required)
            .map(|entry| entry.kind)
    }
}

const COMPANY: Checklist = Checklist {
    entries: &[
        required(DocumentKind::TaxRegistration),
        required(DocumentKind::CommercialRegistry),
        required(DocumentKind::LiabilityInsurance),
        optional(DocumentKind::MutualAffiliation),
    ],
    allows_other: true,
};

const SAFETY_AND_HEALTH: Checklist = Checklist {
    entries: &[
        required(DocumentKind::RiskAssessment),
        required(DocumentKind::EmergencyPlan),
        optional(DocumentKind::SafetyPolicy),
    ],
    allows_other: true,
};

const ENVIRONMENTAL: Checklist = Checklist {
    entries: &[
        required(DocumentKind::WasteManagementPlan),
        optional(DocumentKind::EnvironmentalPermit),
    ],
    allows_other: true,
};

const PERSONNEL: Checklist = Checklist {
    entries: &[
        required(DocumentKind::IdCard),
        required(DocumentKind::EmploymentContract),
        required(DocumentKind::SocialSecurityAffiliation),
        required(DocumentKind::MedicalFitnessCertificate),
        optional(DocumentKind::SafetyInduction),
    ],
    allows_other: false,
};

const VEHICLES: Checklist = Checklist {
    entries: &[
        required(DocumentKind::RegistrationCard),
        required(DocumentKind::TechnicalInspection),
        required(DocumentKind::VehicleInsurance),
        optional(DocumentKind::DriverLicense),
    ],
    allows_other: false,
};

const LABOR_CONTROL: Checklist = Checklist {
    entries: &[
        required(DocumentKind::PayrollSummary),
        required(DocumentKind::SocialSecurityPayment),
        optional(DocumentKind::WithholdingTaxReceipt),
    ],
    allows_other: true,
};

/// Static lookup from folder category to its checklist. Exhaustive over the
/// category enum, so a missing table is unrepresentable.
pub fn checklist(category: FolderCategory) -> &'static Checklist {
    match category {
        FolderCategory::Company => &COMPANY,
        FolderCategory::SafetyAndHealth => &SAFETY_AND_HEALTH,
        FolderCategory::Environmental => &ENVIRONMENTAL,
        FolderCategory::Personnel => &PERSONNEL,
        FolderCategory::Vehicles => &VEHICLES,
        FolderCategory::LaborControl => &LABOR_CONTROL,
    }
}
