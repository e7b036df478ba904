use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::super::assignment::{AssignmentRule, AssignmentRuleSet};
use super::super::crm::{
    AggregateStats, ContactId, ContactRecord, OpportunityRecord, PipelineSummary,
};
use super::provider::{AgentScope, CrmDataProvider, ProviderError};
use super::tiers::LeadTier;
use super::{
    score_lead, DealAtRisk, FollowUpSuggestion, HotLead, ScoreResult, ScoredDeal, ScoringConfig,
    ScoringEngine,
};

/// Service composing the data provider, scoring engine, and assignment rules.
pub struct ScoringService<P> {
    provider: Arc<P>,
    engine: Arc<ScoringEngine>,
    assignments: Arc<AssignmentRuleSet>,
}

impl<P> ScoringService<P>
where
    P: CrmDataProvider + 'static,
{
    pub fn new(provider: Arc<P>, config: ScoringConfig) -> Self {
        Self::with_assignment_rules(provider, config, AssignmentRuleSet::default_rules())
    }

    pub fn with_assignment_rules(
        provider: Arc<P>,
        config: ScoringConfig,
        assignments: AssignmentRuleSet,
    ) -> Self {
        Self {
            provider,
            engine: Arc::new(ScoringEngine::new(config)),
            assignments: Arc::new(assignments),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Ranked hot leads for the scope. Upstream failures yield an empty list.
    pub fn hot_leads(&self, scope: &AgentScope, now: DateTime<Utc>) -> Vec<HotLead> {
        let Some((contacts, opportunities)) = self.load(scope) else {
            return Vec::new();
        };
        let leads = self.engine.rank_hot_leads(&contacts, &opportunities, now);
        debug!(scanned = contacts.len(), surfaced = leads.len(), "hot leads ranked");
        leads
    }

    pub fn follow_ups(&self, scope: &AgentScope, now: DateTime<Utc>) -> Vec<FollowUpSuggestion> {
        let Some((contacts, opportunities)) = self.load(scope) else {
            return Vec::new();
        };
        let suggestions = self
            .engine
            .follow_up_suggestions(&opportunities, &contacts, now);
        debug!(suggestions = suggestions.len(), "follow-ups prioritized");
        suggestions
    }

    pub fn deals_at_risk(&self, scope: &AgentScope, now: DateTime<Utc>) -> Vec<DealAtRisk> {
        match self.provider.opportunities(scope) {
            Ok(opportunities) => self.engine.deals_at_risk(&opportunities, now),
            Err(err) => {
                warn!(error = %err, "failed to load opportunities for risk scan");
                Vec::new()
            }
        }
    }

    pub fn pipeline_summary(&self, scope: &AgentScope, now: DateTime<Utc>) -> PipelineSummary {
        let opportunities = self.provider.opportunities(scope).unwrap_or_else(|err| {
            warn!(error = %err, "failed to load opportunities for pipeline summary");
            Vec::new()
        });
        PipelineSummary::build(&opportunities, now, self.engine.config().stale_after_days)
    }

    /// Lead score for a single contact using only its open opportunities.
    pub fn lead_score(
        &self,
        contact_id: &ContactId,
        now: DateTime<Utc>,
    ) -> Result<ScoreResult<LeadTier>, ScoringServiceError> {
        let (contact, opportunities) = self.contact_with_opportunities(contact_id)?;
        let active = opportunities.iter().filter(|opportunity| !opportunity.is_closed());
        Ok(score_lead(&contact, active, now))
    }

    /// Close-probability scores for a contact's open deals, best first.
    pub fn deal_scores(
        &self,
        contact_id: &ContactId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredDeal>, ScoringServiceError> {
        let (contact, opportunities) = self.contact_with_opportunities(contact_id)?;
        let stats = AggregateStats::from_opportunities(&opportunities, contact.last_activity, now);
        Ok(self.engine.rank_deals(&opportunities, &stats, now))
    }

    pub fn suggest_assignment(
        &self,
        contact_id: &ContactId,
    ) -> Result<Option<AssignmentRule>, ScoringServiceError> {
        let (contact, opportunities) = self.contact_with_opportunities(contact_id)?;
        let pipeline_value: f64 = opportunities
            .iter()
            .filter(|opportunity| !opportunity.is_closed())
            .map(OpportunityRecord::monetary_value)
            .sum();
        Ok(self.assignments.suggest(&contact, pipeline_value).cloned())
    }

    fn load(&self, scope: &AgentScope) -> Option<(Vec<ContactRecord>, Vec<OpportunityRecord>)> {
        let contacts = self
            .provider
            .contacts(scope)
            .map_err(|err| warn!(error = %err, "failed to load contacts"))
            .ok()?;
        let opportunities = self
            .provider
            .opportunities(scope)
            .map_err(|err| warn!(error = %err, "failed to load opportunities"))
            .ok()?;
        Some((contacts, opportunities))
    }

    fn contact_with_opportunities(
        &self,
        contact_id: &ContactId,
    ) -> Result<(ContactRecord, Vec<OpportunityRecord>), ScoringServiceError> {
        let contact = self
            .provider
            .contact(contact_id)?
            .ok_or_else(|| ScoringServiceError::NotFound(contact_id.clone()))?;
        let opportunities = self.provider.contact_opportunities(contact_id)?;
        Ok((contact, opportunities))
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("contact {0} not found")]
    NotFound(ContactId),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
