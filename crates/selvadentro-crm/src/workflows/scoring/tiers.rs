use serde::{Deserialize, Serialize};

/// Score at or above which a lead is labelled hot and a deal is labelled high.
pub const UPPER_TIER_THRESHOLD: u8 = 70;
/// Score at or above which a lead is warm and a deal is medium.
pub const MIDDLE_TIER_THRESHOLD: u8 = 40;

/// Interest heat for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTier {
    Hot,
    Warm,
    Cold,
}

impl LeadTier {
    pub const fn from_score(score: u8) -> Self {
        if score >= UPPER_TIER_THRESHOLD {
            LeadTier::Hot
        } else if score >= MIDDLE_TIER_THRESHOLD {
            LeadTier::Warm
        } else {
            LeadTier::Cold
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LeadTier::Hot => "hot",
            LeadTier::Warm => "warm",
            LeadTier::Cold => "cold",
        }
    }

    pub const fn suggested_action(self) -> &'static str {
        match self {
            LeadTier::Hot => "contact immediately — high priority",
            LeadTier::Warm => "schedule follow-up this week",
            LeadTier::Cold => "keep in nurturing",
        }
    }
}

/// Close probability bucket for an open deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealTier {
    High,
    Medium,
    Low,
}

impl DealTier {
    pub const fn from_score(score: u8) -> Self {
        if score >= UPPER_TIER_THRESHOLD {
            DealTier::High
        } else if score >= MIDDLE_TIER_THRESHOLD {
            DealTier::Medium
        } else {
            DealTier::Low
        }
    }

    pub const fn suggested_action(self) -> &'static str {
        match self {
            DealTier::High => "prioritize closing — strong signals",
            DealTier::Medium => "nurture with a concrete next step",
            DealTier::Low => "re-qualify before investing more time",
        }
    }
}

/// Urgency of a follow-up on an open opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpPriority {
    High,
    Medium,
    Low,
}

impl FollowUpPriority {
    pub const fn label(self) -> &'static str {
        match self {
            FollowUpPriority::High => "high",
            FollowUpPriority::Medium => "medium",
            FollowUpPriority::Low => "low",
        }
    }

    /// Ordering weight, higher sorts first.
    pub const fn rank(self) -> u8 {
        match self {
            FollowUpPriority::High => 3,
            FollowUpPriority::Medium => 2,
            FollowUpPriority::Low => 1,
        }
    }
}

/// Risk bucket for a stale deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_and_deal_tiers_share_boundaries() {
        for score in 0..=100u8 {
            let lead = LeadTier::from_score(score);
            let deal = DealTier::from_score(score);
            let expected = match score {
                0..=39 => (LeadTier::Cold, DealTier::Low),
                40..=69 => (LeadTier::Warm, DealTier::Medium),
                _ => (LeadTier::Hot, DealTier::High),
            };
            assert_eq!((lead, deal), expected, "score {score}");
        }
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(LeadTier::from_score(70), LeadTier::Hot);
        assert_eq!(LeadTier::from_score(69), LeadTier::Warm);
        assert_eq!(DealTier::from_score(40), DealTier::Medium);
        assert_eq!(DealTier::from_score(39), DealTier::Low);
    }

    #[test]
    fn tiers_serialize_as_lowercase_labels() {
        assert_eq!(serde_json::to_string(&LeadTier::Hot).unwrap(), "\"hot\"");
        assert_eq!(
            serde_json::to_string(&FollowUpPriority::Medium).unwrap(),
            "\"medium\""
        );
    }
}
