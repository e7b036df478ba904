use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{days_between, OpportunityRecord, OpportunityStatus};

/// Sentinel used when a contact has no recorded interaction.
pub const NO_INTERACTION_DAYS: i64 = 999;

/// Per-contact (or per-agent) rollup consumed by the deal-close predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_opportunities: usize,
    pub won_deals: usize,
    pub lost_deals: usize,
    pub active_deals: usize,
    pub total_value: f64,
    pub lifetime_value: f64,
    pub average_deal_size: f64,
    /// Percentage in `0.0..=100.0`.
    pub win_rate: f64,
    pub last_interaction_days: i64,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            total_opportunities: 0,
            won_deals: 0,
            lost_deals: 0,
            active_deals: 0,
            total_value: 0.0,
            lifetime_value: 0.0,
            average_deal_size: 0.0,
            win_rate: 0.0,
            last_interaction_days: NO_INTERACTION_DAYS,
        }
    }
}

impl AggregateStats {
    pub fn from_opportunities<'a, I>(
        opportunities: I,
        last_interaction: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = &'a OpportunityRecord>,
    {
        let mut stats = AggregateStats::default();

        for opportunity in opportunities {
            let value = opportunity.monetary_value();
            stats.total_opportunities += 1;
            stats.total_value += value;
            match opportunity.status {
                OpportunityStatus::Won => {
                    stats.won_deals += 1;
                    stats.lifetime_value += value;
                }
                OpportunityStatus::Lost => stats.lost_deals += 1,
                _ => stats.active_deals += 1,
            }
        }

        if stats.total_opportunities > 0 {
            stats.average_deal_size = stats.total_value / stats.total_opportunities as f64;
        }

        let closed = stats.won_deals + stats.lost_deals;
        if closed > 0 {
            stats.win_rate = stats.won_deals as f64 / closed as f64 * 100.0;
        }

        stats.last_interaction_days = last_interaction
            .map(|at| days_between(at, now))
            .unwrap_or(NO_INTERACTION_DAYS);

        stats
    }
}
