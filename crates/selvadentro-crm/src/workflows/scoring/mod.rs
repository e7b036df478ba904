//! Lead heat, follow-up urgency, and deal-close scoring.
//!
//! Every scorer is a pure function of its inputs and an explicit `now`. The
//! engine only carries the list policies (inclusion threshold, scan and result
//! limits); nothing is cached between calls.

mod config;
mod deals;
mod follow_up;
mod leads;
pub mod provider;
mod risk;
pub mod router;
pub mod service;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use config::ScoringConfig;
pub use follow_up::FollowUpResult;
pub use provider::{AgentScope, CrmDataProvider, ProviderError};
pub use risk::DealAtRisk;
pub use router::scoring_router;
pub use service::{ScoringService, ScoringServiceError};
pub use tiers::{DealTier, FollowUpPriority, LeadTier, RiskLevel};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::crm::{
    AggregateStats, ContactId, ContactRecord, OpportunityId, OpportunityRecord, PipelineStage,
};

/// Score, tier, and the factors that produced them, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult<T> {
    pub score: u8,
    pub level: T,
    pub reasons: Vec<String>,
    pub suggested_action: String,
}

pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// Computes a contact's interest heat from tags, recency, open deals, completeness, and source.
pub fn score_lead<'a, I>(
    contact: &ContactRecord,
    active_opportunities: I,
    now: DateTime<Utc>,
) -> ScoreResult<LeadTier>
where
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    leads::score_lead(contact, active_opportunities, now)
}

pub fn prioritize_follow_up(opportunity: &OpportunityRecord, now: DateTime<Utc>) -> FollowUpResult {
    follow_up::prioritize_follow_up(opportunity, now)
}

/// Predicts close likelihood for an open deal. Won/lost deals must be filtered by the caller.
pub fn score_deal(
    opportunity: &OpportunityRecord,
    stats: &AggregateStats,
    now: DateTime<Utc>,
) -> ScoreResult<DealTier> {
    deals::score_deal(opportunity, stats, now)
}

/// Entry in the ranked hot-lead list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotLead {
    pub contact_id: ContactId,
    pub name: String,
    pub email: String,
    pub score: u8,
    pub level: LeadTier,
    pub reasons: Vec<String>,
    pub suggested_action: String,
}

/// Entry in the prioritized follow-up list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSuggestion {
    pub contact_id: ContactId,
    pub deal_id: OpportunityId,
    pub name: String,
    pub priority: FollowUpPriority,
    pub reason: String,
    pub suggested_action: String,
    pub days_since_last_contact: i64,
    pub deal_value: f64,
}

/// Open deal paired with its close-probability score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredDeal {
    pub deal_id: OpportunityId,
    pub name: String,
    pub stage: PipelineStage,
    pub value: f64,
    #[serde(flatten)]
    pub score: ScoreResult<DealTier>,
}

/// Stateless scorer applying the configured list policies.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores up to `hot_lead_scan_limit` contacts and keeps those at or above
    /// `hot_lead_threshold`, highest score first. Equal scores keep input order.
    pub fn rank_hot_leads(
        &self,
        contacts: &[ContactRecord],
        opportunities: &[OpportunityRecord],
        now: DateTime<Utc>,
    ) -> Vec<HotLead> {
        let mut hot_leads: Vec<HotLead> = contacts
            .iter()
            .take(self.config.hot_lead_scan_limit)
            .filter_map(|contact| {
                let active = opportunities.iter().filter(|opportunity| {
                    opportunity.contact_id == contact.id && !opportunity.is_closed()
                });
                let result = score_lead(contact, active, now);
                if result.score < self.config.hot_lead_threshold {
                    return None;
                }

                Some(HotLead {
                    contact_id: contact.id.clone(),
                    name: contact.display_name().to_string(),
                    email: contact.email.clone().unwrap_or_default(),
                    score: result.score,
                    level: result.level,
                    reasons: result.reasons,
                    suggested_action: result.suggested_action,
                })
            })
            .collect();

        hot_leads.sort_by(|a, b| b.score.cmp(&a.score));
        hot_leads
    }

    /// Prioritizes open deals, drops fresh low-priority noise, and keeps the top `follow_up_limit`.
    pub fn follow_up_suggestions(
        &self,
        opportunities: &[OpportunityRecord],
        contacts: &[ContactRecord],
        now: DateTime<Utc>,
    ) -> Vec<FollowUpSuggestion> {
        let mut suggestions: Vec<FollowUpSuggestion> = opportunities
            .iter()
            .filter(|opportunity| !opportunity.is_closed())
            .filter_map(|opportunity| {
                let result = prioritize_follow_up(opportunity, now);
                if !result.is_actionable() {
                    return None;
                }

                Some(FollowUpSuggestion {
                    contact_id: opportunity.contact_id.clone(),
                    deal_id: opportunity.id.clone(),
                    name: suggestion_name(opportunity, contacts),
                    priority: result.priority,
                    reason: result.reason,
                    suggested_action: result.suggested_action,
                    days_since_last_contact: result.days_since_last_contact,
                    deal_value: opportunity.monetary_value(),
                })
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.priority
                .rank()
                .cmp(&a.priority.rank())
                .then_with(|| b.deal_value.total_cmp(&a.deal_value))
        });
        suggestions.truncate(self.config.follow_up_limit);
        suggestions
    }

    /// Scores every open deal against the owner's stats, highest score first.
    pub fn rank_deals(
        &self,
        opportunities: &[OpportunityRecord],
        stats: &AggregateStats,
        now: DateTime<Utc>,
    ) -> Vec<ScoredDeal> {
        let mut scored: Vec<ScoredDeal> = opportunities
            .iter()
            .filter(|opportunity| !opportunity.is_closed())
            .map(|opportunity| ScoredDeal {
                deal_id: opportunity.id.clone(),
                name: opportunity.name.clone(),
                stage: opportunity.stage.clone(),
                value: opportunity.monetary_value(),
                score: score_deal(opportunity, stats, now),
            })
            .collect();

        scored.sort_by(|a, b| b.score.score.cmp(&a.score.score));
        scored
    }

    pub fn deals_at_risk(
        &self,
        opportunities: &[OpportunityRecord],
        now: DateTime<Utc>,
    ) -> Vec<DealAtRisk> {
        risk::deals_at_risk(opportunities, now, self.config.stale_after_days)
    }
}

fn suggestion_name(opportunity: &OpportunityRecord, contacts: &[ContactRecord]) -> String {
    if !opportunity.name.trim().is_empty() {
        return opportunity.name.trim().to_string();
    }

    contacts
        .iter()
        .find(|contact| contact.id == opportunity.contact_id)
        .map(|contact| contact.display_name().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Unnamed".to_string())
}
