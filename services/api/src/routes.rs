use crate::infra::{deserialize_optional_timestamp, AppState};
use crate::report::ScoringReport;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use selvadentro_crm::error::AppError;
use selvadentro_crm::workflows::crm::{CrmExportImporter, CrmSnapshot};
use selvadentro_crm::workflows::scoring::{
    scoring_router, AgentScope, CrmDataProvider, ScoringService,
};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Ad-hoc scoring of CRM data posted by the caller instead of the served snapshot.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoringReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub(crate) as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) agent_id: Option<String>,
    #[serde(default)]
    pub(crate) export_csv: Option<String>,
    #[serde(default)]
    pub(crate) snapshot: Option<CrmSnapshot>,
}

pub(crate) fn with_scoring_routes<P>(service: Arc<ScoringService<P>>) -> axum::Router
where
    P: CrmDataProvider + 'static,
{
    scoring_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/scoring/report",
            axum::routing::post(scoring_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scoring_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoringReportRequest>,
) -> Result<Json<ScoringReport>, AppError> {
    let ScoringReportRequest {
        as_of,
        agent_id,
        export_csv,
        snapshot,
    } = payload;

    let snapshot = match (export_csv, snapshot) {
        (Some(csv), _) => CrmExportImporter::from_reader(Cursor::new(csv.into_bytes()))?,
        (None, Some(snapshot)) => snapshot,
        (None, None) => CrmSnapshot::default(),
    };

    let scope = AgentScope::from_agent_id(agent_id);
    let as_of = as_of.unwrap_or_else(Utc::now);
    Ok(Json(ScoringReport::build(
        snapshot,
        state.scoring.clone(),
        &scope,
        as_of,
    )))
}
