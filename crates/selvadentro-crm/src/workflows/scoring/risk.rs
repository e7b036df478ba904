use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::crm::{days_between, ContactId, OpportunityId, OpportunityRecord};
use super::tiers::RiskLevel;

/// Open deal that has gone quiet for longer than the stale window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealAtRisk {
    pub deal_id: OpportunityId,
    pub name: String,
    pub contact_id: ContactId,
    pub value: f64,
    pub days_since_update: i64,
    pub risk_level: RiskLevel,
}

fn risk_for(days_since_update: i64) -> RiskLevel {
    if days_since_update > 45 {
        RiskLevel::High
    } else if days_since_update > 30 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub(crate) fn deals_at_risk<'a, I>(
    opportunities: I,
    now: DateTime<Utc>,
    stale_after_days: i64,
) -> Vec<DealAtRisk>
where
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    let mut deals: Vec<DealAtRisk> = opportunities
        .into_iter()
        .filter(|opportunity| !opportunity.is_closed())
        .map(|opportunity| {
            let days_since_update = days_between(opportunity.last_update(), now);
            DealAtRisk {
                deal_id: opportunity.id.clone(),
                name: opportunity.name.clone(),
                contact_id: opportunity.contact_id.clone(),
                value: opportunity.monetary_value(),
                days_since_update,
                risk_level: risk_for(days_since_update),
            }
        })
        .filter(|deal| deal.days_since_update > stale_after_days)
        .collect();

    deals.sort_by(|a, b| b.days_since_update.cmp(&a.days_since_update));
    deals
}
