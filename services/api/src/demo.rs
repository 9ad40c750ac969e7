use crate::infra::{provision_startup, InMemoryFolderStore, LoggingNotificationPublisher};
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

use contractor_compliance::error::AppError;
use contractor_compliance::workflows::folders::{
    checklist, Actor, ActorId, ActorRole, DocumentKind, DocumentUpload, FolderCategory,
    FolderEvent, FolderId, FolderStore, FolderWorkflowError, FolderWorkflowService,
    ReviewDecision, WorkflowConfig,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Contractor company the startup folder is provisioned for
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Worker names, one personnel folder each
    #[arg(long = "worker")]
    pub(crate) workers: Vec<String>,
    /// Vehicle plates, one vehicle folder each
    #[arg(long = "vehicle")]
    pub(crate) vehicles: Vec<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let company = args
        .company
        .unwrap_or_else(|| "Acme Obras SA".to_string());
    let workers = if args.workers.is_empty() {
        vec!["Ana Torres".to_string(), "Luis Vega".to_string()]
    } else {
        args.workers
    };
    let vehicles = if args.vehicles.is_empty() {
        vec!["GHT-331".to_string()]
    } else {
        args.vehicles
    };

    let store = InMemoryFolderStore::default();
    let notifier = LoggingNotificationPublisher::default();
    let service = FolderWorkflowService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        WorkflowConfig {
            reviewer_pool: vec!["review@compliance.example".to_string()],
            persistence_retries: 3,
        },
    );

    let contractor = Actor {
        id: ActorId("contractor-demo".to_string()),
        role: ActorRole::Contractor,
    };
    let reviewer = Actor {
        id: ActorId("reviewer-demo".to_string()),
        role: ActorRole::Reviewer,
    };

    println!("Compliance folder demo");
    let parent_id = provision_startup(&store, &company, &workers, &vehicles);
    let children = store
        .children_of(&parent_id)
        .map_err(FolderWorkflowError::Store)?;
    println!(
        "Provisioned startup folder for {company}: {} child folders",
        children.len()
    );
    for child in &children {
        println!(
            "- {} folder for {} ({} checklist entries)",
            child.category.label(),
            child.subject,
            checklist(child.category).entries().len()
        );
    }

    let company_folder = children
        .iter()
        .find(|child| child.category == FolderCategory::Company)
        .map(|child| child.id.clone())
        .expect("company folder provisioned");

    println!("\nUploading the required company documents");
    let required: Vec<DocumentKind> = checklist(FolderCategory::Company)
        .required_kinds()
        .collect();
    for kind in &required {
        service.upload_document(&company_folder, *kind, demo_upload(*kind), &contractor)?;
        println!("- uploaded {}", kind.label());
    }

    let receipt = service.submit_folder(
        &company_folder,
        &contractor,
        vec!["owner@contractor.example".to_string()],
    )?;
    print_receipt("Submitted for review", &receipt.status_view());

    let rejected_kind = required[0];
    println!("\nReviewer rejects the {} and approves the rest", rejected_kind.label());
    for kind in &required {
        let document = find_document(&store, &company_folder, *kind)?;
        let (decision, notes) = if *kind == rejected_kind {
            (
                ReviewDecision::Reject,
                Some("stamp missing on the scanned copy".to_string()),
            )
        } else {
            (ReviewDecision::Approve, None)
        };
        let receipt =
            service.review_document(&company_folder, &document.id, decision, &reviewer, notes)?;
        println!(
            "- {} -> folder {}",
            kind.label(),
            receipt.folder.status.label()
        );
    }

    println!("\nContractor fixes the rejected document and resubmits");
    service.upload_document(
        &company_folder,
        rejected_kind,
        demo_upload(rejected_kind),
        &contractor,
    )?;
    let receipt = service.submit_folder(&company_folder, &contractor, Vec::new())?;
    print_receipt("Resubmitted", &receipt.status_view());

    let document = find_document(&store, &company_folder, rejected_kind)?;
    let receipt = service.review_document(
        &company_folder,
        &document.id,
        ReviewDecision::Approve,
        &reviewer,
        None,
    )?;
    print_receipt("Final verdict", &receipt.status_view());

    let view = service.folder_view(&company_folder, Utc::now().date_naive())?;
    println!(
        "\nCompany folder: {} ({:.0}% of required documents approved)",
        view.status.label(),
        view.completion_percentage * 100.0
    );

    let overview = service.parent_overview(&parent_id)?;
    println!(
        "Startup folder roll-up: {:.0}% complete, pending review: {}",
        overview.completion_percentage * 100.0,
        overview.pending_review
    );
    for child in &overview.children {
        println!(
            "- {} ({}): {} [{}/{} required approved]",
            child.subject,
            child.category.label(),
            child.status.label(),
            child.approved_required,
            child.total_required
        );
    }

    println!("\nDispatched notifications");
    for event in notifier.events() {
        match event {
            FolderEvent::Submitted { recipients, .. } => {
                println!("- folder submitted -> {}", recipients.join(", "));
            }
            FolderEvent::Approved { recipients, .. } => {
                println!("- folder approved -> {}", recipients.join(", "));
            }
            FolderEvent::Rejected {
                recipients,
                rejected_documents,
                ..
            } => {
                println!(
                    "- folder rejected ({} document(s)) -> {}",
                    rejected_documents.len(),
                    recipients.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn demo_upload(kind: DocumentKind) -> DocumentUpload {
    let slug = kind.label().replace(' ', "-");
    DocumentUpload {
        url: format!("s3://compliance-demo/{slug}.pdf"),
        name: format!("{slug}.pdf"),
        content_type: "application/pdf".to_string(),
        size: 48_128,
        expires_on: None,
    }
}

fn find_document(
    store: &InMemoryFolderStore,
    folder_id: &FolderId,
    kind: DocumentKind,
) -> Result<contractor_compliance::workflows::folders::Document, AppError> {
    let documents = store
        .documents_in(folder_id)
        .map_err(FolderWorkflowError::Store)?;
    documents
        .into_iter()
        .find(|document| document.kind == kind)
        .ok_or_else(|| {
            AppError::Workflow(FolderWorkflowError::Store(
                contractor_compliance::workflows::folders::StoreError::NotFound,
            ))
        })
}

fn print_receipt(heading: &str, view: &contractor_compliance::workflows::folders::TransitionView) {
    match serde_json::to_string_pretty(view) {
        Ok(json) => println!("\n{heading}:\n{json}"),
        Err(err) => println!("\n{heading}: payload unavailable ({err})"),
    }
}
