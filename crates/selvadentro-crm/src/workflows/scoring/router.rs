use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::super::crm::ContactId;
use super::provider::{AgentScope, CrmDataProvider};
use super::service::{ScoringService, ScoringServiceError};

/// Query parameters shared by the scoped list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Evaluation instant; defaults to the current time.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl ScopeQuery {
    fn scope(&self) -> AgentScope {
        AgentScope::from_agent_id(self.agent_id.clone())
    }

    fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// Router builder exposing the dashboard scoring endpoints.
pub fn scoring_router<P>(service: Arc<ScoringService<P>>) -> Router
where
    P: CrmDataProvider + 'static,
{
    Router::new()
        .route("/api/v1/leads/hot", get(hot_leads_handler::<P>))
        .route("/api/v1/follow-ups", get(follow_ups_handler::<P>))
        .route("/api/v1/deals/at-risk", get(deals_at_risk_handler::<P>))
        .route(
            "/api/v1/pipeline/summary",
            get(pipeline_summary_handler::<P>),
        )
        .route(
            "/api/v1/contacts/:contact_id/lead-score",
            get(lead_score_handler::<P>),
        )
        .route(
            "/api/v1/contacts/:contact_id/deal-scores",
            get(deal_scores_handler::<P>),
        )
        .route(
            "/api/v1/contacts/:contact_id/assignment",
            get(assignment_handler::<P>),
        )
        .with_state(service)
}

pub(crate) async fn hot_leads_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let leads = service.hot_leads(&query.scope(), query.now());
    (StatusCode::OK, axum::Json(leads)).into_response()
}

pub(crate) async fn follow_ups_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let suggestions = service.follow_ups(&query.scope(), query.now());
    (StatusCode::OK, axum::Json(suggestions)).into_response()
}

pub(crate) async fn deals_at_risk_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let deals = service.deals_at_risk(&query.scope(), query.now());
    (StatusCode::OK, axum::Json(deals)).into_response()
}

pub(crate) async fn pipeline_summary_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let summary = service.pipeline_summary(&query.scope(), query.now());
    (StatusCode::OK, axum::Json(summary)).into_response()
}

pub(crate) async fn lead_score_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Path(contact_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let id = ContactId(contact_id);
    match service.lead_score(&id, query.now()) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deal_scores_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Path(contact_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let id = ContactId(contact_id);
    match service.deal_scores(&id, query.now()) {
        Ok(deals) => (StatusCode::OK, axum::Json(deals)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assignment_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    Path(contact_id): Path<String>,
) -> Response
where
    P: CrmDataProvider + 'static,
{
    let id = ContactId(contact_id);
    match service.suggest_assignment(&id) {
        Ok(Some(rule)) => {
            let payload = json!({
                "contactId": id.0,
                "ruleId": rule.id,
                "ruleName": rule.name,
                "assignTo": rule.assign_to,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(None) => {
            let payload = json!({
                "contactId": id.0,
                "ruleId": serde_json::Value::Null,
                "ruleName": serde_json::Value::Null,
                "assignTo": serde_json::Value::Null,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScoringServiceError) -> Response {
    let status = match &error {
        ScoringServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ScoringServiceError::Provider(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
