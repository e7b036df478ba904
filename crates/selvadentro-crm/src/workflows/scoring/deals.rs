use chrono::{DateTime, Utc};

use super::super::crm::{days_between, AggregateStats, OpportunityRecord};
use super::tiers::DealTier;
use super::{clamp_score, ScoreResult};

/// Does not inspect `opportunity.status`; callers filter won/lost deals first.
pub(crate) fn score_deal(
    opportunity: &OpportunityRecord,
    stats: &AggregateStats,
    now: DateTime<Utc>,
) -> ScoreResult<DealTier> {
    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    let win_rate = stats.win_rate;
    if win_rate > 50.0 {
        score += 30.0;
        reasons.push(format!("high win rate ({}%)", win_rate.round() as i64));
    } else if win_rate > 25.0 {
        score += 15.0;
        reasons.push(format!("medium win rate ({}%)", win_rate.round() as i64));
    }

    let idle = stats.last_interaction_days;
    if idle < 7 {
        score += 25.0;
        reasons.push("recent activity, last week".to_string());
    } else if idle < 14 {
        score += 15.0;
        reasons.push("recent activity, last 2 weeks".to_string());
    } else if idle < 30 {
        score += 5.0;
        reasons.push("some recent activity".to_string());
    }

    let value = opportunity.monetary_value();
    if value > stats.average_deal_size * 1.5 {
        score += 20.0;
        reasons.push("high-value deal".to_string());
    } else if value > stats.average_deal_size {
        score += 10.0;
        reasons.push("above-average deal".to_string());
    }

    let stage_probability = opportunity.stage.close_probability();
    score += f64::from(stage_probability) * 0.15;
    if stage_probability > 50 {
        reasons.push(format!("advanced stage ({})", opportunity.stage));
    }

    let days_in_pipeline = days_between(opportunity.created_at, now);
    if days_in_pipeline < 30 {
        score += 10.0;
        reasons.push("recent deal — momentum".to_string());
    } else if days_in_pipeline > 90 {
        score -= 10.0;
        reasons.push("aged deal — may be stalled".to_string());
    }

    let score = clamp_score(score);
    let level = DealTier::from_score(score);

    ScoreResult {
        score,
        level,
        reasons,
        suggested_action: level.suggested_action().to_string(),
    }
}
