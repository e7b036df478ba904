use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::crm::{days_between, OpportunityRecord, PipelineStage};
use super::tiers::FollowUpPriority;

/// Urgency verdict for a single open opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResult {
    pub priority: FollowUpPriority,
    pub reason: String,
    pub suggested_action: String,
    pub days_since_last_contact: i64,
}

impl FollowUpResult {
    /// Low-priority deals touched within the last three days are noise and are dropped from lists.
    pub fn is_actionable(&self) -> bool {
        self.priority != FollowUpPriority::Low || self.days_since_last_contact > 3
    }
}

pub(crate) fn prioritize_follow_up(
    opportunity: &OpportunityRecord,
    now: DateTime<Utc>,
) -> FollowUpResult {
    let days = days_between(opportunity.last_update(), now);

    let (priority, reason, suggested_action) = if days > 14 {
        (
            FollowUpPriority::High,
            format!("{days} days without update"),
            "urgent reactivation call",
        )
    } else if days > 7 {
        (
            FollowUpPriority::Medium,
            format!("{days} days without update"),
            "check-in email",
        )
    } else {
        match opportunity.stage {
            PipelineStage::Negotiation => (
                FollowUpPriority::High,
                "in negotiation — close soon".to_string(),
                "push for closing this week",
            ),
            PipelineStage::Proposal => (
                FollowUpPriority::Medium,
                "proposal sent".to_string(),
                "follow up on proposal",
            ),
            _ => (FollowUpPriority::Low, String::new(), ""),
        }
    };

    FollowUpResult {
        priority,
        reason,
        suggested_action: suggested_action.to_string(),
        days_since_last_contact: days,
    }
}
