use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::crm::{
    AgentId, AggregateStats, ContactId, ContactRecord, OpportunityId, OpportunityRecord,
    OpportunityStatus, PipelineStage,
};
use crate::workflows::scoring::{
    scoring_router, AgentScope, CrmDataProvider, ProviderError, ScoringConfig, ScoringService,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn contact(id: &str, name: &str) -> ContactRecord {
    ContactRecord::new(id, name)
}

/// Contact that maxes out every lead signal when paired with a negotiation deal.
pub(super) fn hot_contact(id: &str) -> ContactRecord {
    let mut contact = contact(id, "Valeria Canul");
    contact.tags = vec!["Hot".to_string()];
    contact.email = Some("valeria@example.com".to_string());
    contact.phone = Some("+52 984 000 0000".to_string());
    contact.source = Some("referral".to_string());
    contact.last_activity = Some(days_ago(1));
    contact
}

pub(super) fn opportunity(
    id: &str,
    contact_id: &str,
    stage: PipelineStage,
    value: f64,
) -> OpportunityRecord {
    OpportunityRecord {
        id: OpportunityId(id.to_string()),
        name: format!("Lote {id}"),
        value,
        status: OpportunityStatus::Open,
        stage,
        created_at: days_ago(10),
        last_stage_change: Some(days_ago(1)),
        contact_id: ContactId(contact_id.to_string()),
    }
}

pub(super) fn updated(mut opportunity: OpportunityRecord, days: i64) -> OpportunityRecord {
    opportunity.last_stage_change = Some(days_ago(days));
    opportunity
}

pub(super) fn with_status(
    mut opportunity: OpportunityRecord,
    status: OpportunityStatus,
) -> OpportunityRecord {
    opportunity.status = status;
    opportunity
}

pub(super) fn stats(win_rate: f64, average_deal_size: f64, idle_days: i64) -> AggregateStats {
    AggregateStats {
        win_rate,
        average_deal_size,
        last_interaction_days: idle_days,
        ..AggregateStats::default()
    }
}

pub(super) fn assigned(mut contact: ContactRecord, agent: &str) -> ContactRecord {
    contact.assigned_to = Some(AgentId(agent.to_string()));
    contact
}

/// In-memory provider honouring agent scopes.
#[derive(Default, Clone)]
pub(super) struct MemoryProvider {
    contacts: Arc<Mutex<Vec<ContactRecord>>>,
    opportunities: Arc<Mutex<Vec<OpportunityRecord>>>,
}

impl MemoryProvider {
    pub(super) fn new(contacts: Vec<ContactRecord>, opportunities: Vec<OpportunityRecord>) -> Self {
        Self {
            contacts: Arc::new(Mutex::new(contacts)),
            opportunities: Arc::new(Mutex::new(opportunities)),
        }
    }
}

impl CrmDataProvider for MemoryProvider {
    fn contacts(&self, scope: &AgentScope) -> Result<Vec<ContactRecord>, ProviderError> {
        let guard = self.contacts.lock().expect("contacts lock");
        Ok(guard
            .iter()
            .filter(|contact| scope.includes(contact))
            .cloned()
            .collect())
    }

    fn opportunities(&self, scope: &AgentScope) -> Result<Vec<OpportunityRecord>, ProviderError> {
        let visible: Vec<ContactId> = self
            .contacts(scope)?
            .into_iter()
            .map(|contact| contact.id)
            .collect();
        let guard = self.opportunities.lock().expect("opportunities lock");
        Ok(guard
            .iter()
            .filter(|opportunity| visible.contains(&opportunity.contact_id))
            .cloned()
            .collect())
    }

    fn contact(&self, id: &ContactId) -> Result<Option<ContactRecord>, ProviderError> {
        let guard = self.contacts.lock().expect("contacts lock");
        Ok(guard.iter().find(|contact| &contact.id == id).cloned())
    }

    fn contact_opportunities(
        &self,
        id: &ContactId,
    ) -> Result<Vec<OpportunityRecord>, ProviderError> {
        let guard = self.opportunities.lock().expect("opportunities lock");
        Ok(guard
            .iter()
            .filter(|opportunity| &opportunity.contact_id == id)
            .cloned()
            .collect())
    }
}

/// Provider whose upstream is always down.
pub(super) struct FailingProvider;

impl CrmDataProvider for FailingProvider {
    fn contacts(&self, _scope: &AgentScope) -> Result<Vec<ContactRecord>, ProviderError> {
        Err(ProviderError::Unavailable("timeout".to_string()))
    }

    fn opportunities(&self, _scope: &AgentScope) -> Result<Vec<OpportunityRecord>, ProviderError> {
        Err(ProviderError::Unavailable("timeout".to_string()))
    }

    fn contact(&self, _id: &ContactId) -> Result<Option<ContactRecord>, ProviderError> {
        Err(ProviderError::Unauthorized)
    }

    fn contact_opportunities(
        &self,
        _id: &ContactId,
    ) -> Result<Vec<OpportunityRecord>, ProviderError> {
        Err(ProviderError::Unauthorized)
    }
}

pub(super) fn sample_provider() -> MemoryProvider {
    let hot = assigned(hot_contact("c-hot"), "broker-ana");
    let mut cold = assigned(contact("c-cold", "Mateo Poot"), "broker-luis");
    cold.tags = vec!["VIP".to_string()];
    cold.source = Some("Facebook".to_string());

    let opportunities = vec![
        opportunity("o-neg", "c-hot", PipelineStage::Negotiation, 4_500_000.0),
        updated(
            opportunity("o-stale", "c-cold", PipelineStage::Qualified, 1_200_000.0),
            50,
        ),
        with_status(
            opportunity("o-won", "c-hot", PipelineStage::Won, 2_000_000.0),
            OpportunityStatus::Won,
        ),
    ];

    MemoryProvider::new(vec![hot, cold], opportunities)
}

pub(super) fn build_service() -> ScoringService<MemoryProvider> {
    ScoringService::new(Arc::new(sample_provider()), ScoringConfig::default())
}

pub(super) fn router_with_service(service: ScoringService<MemoryProvider>) -> axum::Router {
    scoring_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
