use crate::cli::ServeArgs;
use crate::infra::{
    workflow_config, AppState, InMemoryFolderStore, LoggingNotificationPublisher,
};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use contractor_compliance::config::AppConfig;
use contractor_compliance::error::AppError;
use contractor_compliance::telemetry;
use contractor_compliance::workflows::folders::FolderWorkflowService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryFolderStore::default());
    let notifier = Arc::new(LoggingNotificationPublisher::default());
    let folder_service = Arc::new(FolderWorkflowService::new(
        store,
        notifier,
        workflow_config(&config.workflow),
    ));

    let app = with_service_routes(folder_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "compliance folder service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
