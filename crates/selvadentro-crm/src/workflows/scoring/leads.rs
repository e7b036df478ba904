use chrono::{DateTime, Utc};

use super::super::crm::{days_between, normalize_label, ContactRecord, OpportunityRecord};
use super::tiers::LeadTier;
use super::{clamp_score, ScoreResult};

const HOT_TAGS: &[&str] = &["hot", "interested", "qualified", "demo", "proposal"];
const WARM_TAGS: &[&str] = &["warm", "contacted", "follow-up"];
const QUALITY_SOURCES: &[&str] = &["referral", "website", "inbound"];

pub(crate) fn score_lead<'a, I>(
    contact: &ContactRecord,
    active_opportunities: I,
    now: DateTime<Utc>,
) -> ScoreResult<LeadTier>
where
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    let mut score: i32 = 0;
    let mut reasons = Vec::new();

    let tags: Vec<String> = contact.normalized_tags().collect();
    if tags.iter().any(|tag| HOT_TAGS.contains(&tag.as_str())) {
        score += 30;
        reasons.push("high-interest tag".to_string());
    } else if tags.iter().any(|tag| WARM_TAGS.contains(&tag.as_str())) {
        score += 15;
        reasons.push("medium-interest tag".to_string());
    }

    if let Some(last_activity) = contact.last_activity {
        match days_between(last_activity, now) {
            days if days < 3 => {
                score += 25;
                reasons.push("very recent activity, last 3 days".to_string());
            }
            days if days < 7 => {
                score += 15;
                reasons.push("recent activity, last week".to_string());
            }
            _ => {}
        }
    }

    let active: Vec<&OpportunityRecord> = active_opportunities
        .into_iter()
        .filter(|opportunity| !opportunity.is_closed())
        .collect();
    if !active.is_empty() {
        score += 20;
        let noun = if active.len() == 1 {
            "opportunity"
        } else {
            "opportunities"
        };
        reasons.push(format!("{} active {noun}", active.len()));

        if active.iter().any(|opportunity| opportunity.stage.is_advanced()) {
            score += 10;
            reasons.push("deal in advanced stage".to_string());
        }
    }

    if contact.has_email() {
        score += 10;
    }
    if contact.has_phone() {
        score += 5;
        reasons.push("complete contact information".to_string());
    }

    if let Some(source) = contact.source.as_deref() {
        if QUALITY_SOURCES.contains(&normalize_label(source).as_str()) {
            score += 10;
            reasons.push(format!("quality source: {}", source.trim()));
        }
    }

    let score = clamp_score(score as f64);
    let level = LeadTier::from_score(score);

    ScoreResult {
        score,
        level,
        reasons,
        suggested_action: level.suggested_action().to_string(),
    }
}
