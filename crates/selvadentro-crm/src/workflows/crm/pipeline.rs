use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{days_between, OpportunityRecord, OpportunityStatus};

/// Open-deal totals for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBreakdown {
    pub stage: String,
    pub deals_count: usize,
    pub total_value: f64,
    pub average_value: f64,
    /// Share of total open value, formatted with one decimal.
    pub percentage: String,
}

/// Kanban-style rollup of the open pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub stages: Vec<StageBreakdown>,
    pub total_deals: usize,
    pub total_value: f64,
    pub average_deal_size: f64,
    pub stale_deals: usize,
}

impl PipelineSummary {
    pub fn build<'a, I>(opportunities: I, now: DateTime<Utc>, stale_after_days: i64) -> Self
    where
        I: IntoIterator<Item = &'a OpportunityRecord>,
    {
        let mut stages: Vec<StageBreakdown> = Vec::new();
        let mut total_deals = 0;
        let mut total_value = 0.0;
        let mut stale_deals = 0;

        for opportunity in opportunities.into_iter().filter(|opp| !opp.is_closed()) {
            let value = opportunity.monetary_value();
            total_deals += 1;
            total_value += value;
            if days_between(opportunity.last_update(), now) > stale_after_days {
                stale_deals += 1;
            }

            let label = opportunity.stage.label();
            match stages.iter_mut().find(|entry| entry.stage == label) {
                Some(entry) => {
                    entry.deals_count += 1;
                    entry.total_value += value;
                }
                None => stages.push(StageBreakdown {
                    stage: label.to_string(),
                    deals_count: 1,
                    total_value: value,
                    average_value: 0.0,
                    percentage: String::new(),
                }),
            }
        }

        for entry in &mut stages {
            entry.average_value = (entry.total_value / entry.deals_count as f64).round();
            entry.percentage = if total_value > 0.0 {
                format!("{:.1}", entry.total_value / total_value * 100.0)
            } else {
                "0.0".to_string()
            };
        }

        let average_deal_size = if total_deals > 0 {
            total_value / total_deals as f64
        } else {
            0.0
        };

        Self {
            stages,
            total_deals,
            total_value,
            average_deal_size,
            stale_deals,
        }
    }
}

/// Ad-hoc pipeline filter; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealFilter {
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub status: Option<OpportunityStatus>,
    #[serde(default)]
    pub stale: Option<bool>,
}

impl DealFilter {
    pub fn matches(
        &self,
        opportunity: &OpportunityRecord,
        now: DateTime<Utc>,
        stale_after_days: i64,
    ) -> bool {
        let value = opportunity.monetary_value();
        if self.min_value.is_some_and(|min| value < min) {
            return false;
        }
        if self.max_value.is_some_and(|max| value > max) {
            return false;
        }
        if self.status.is_some_and(|status| status != opportunity.status) {
            return false;
        }
        if let Some(stale) = self.stale {
            let is_stale = !opportunity.is_closed()
                && days_between(opportunity.last_update(), now) > stale_after_days;
            if is_stale != stale {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(
        &self,
        opportunities: &'a [OpportunityRecord],
        now: DateTime<Utc>,
        stale_after_days: i64,
    ) -> Vec<&'a OpportunityRecord> {
        opportunities
            .iter()
            .filter(|opportunity| self.matches(opportunity, now, stale_after_days))
            .collect()
    }
}
