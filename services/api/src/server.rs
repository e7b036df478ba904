use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, source_with_overrides, AppState, SnapshotProvider};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use selvadentro_crm::config::AppConfig;
use selvadentro_crm::error::AppError;
use selvadentro_crm::telemetry;
use selvadentro_crm::workflows::scoring::ScoringService;
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
    config.crm = source_with_overrides(&config.crm, args.snapshot.take(), args.export_csv.take());

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        scoring: config.scoring.clone(),
    };

    let snapshot = load_snapshot(&config.crm)?;
    let provider = Arc::new(SnapshotProvider::new(snapshot));
    let scoring_service = Arc::new(ScoringService::new(provider, config.scoring.clone()));

    let app = with_scoring_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        hot_lead_threshold = config.scoring.hot_lead_threshold,
        "selvadentro scoring api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
