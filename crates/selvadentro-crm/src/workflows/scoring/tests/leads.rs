use super::common::*;

use crate::workflows::crm::{OpportunityStatus, PipelineStage};
use crate::workflows::scoring::{score_lead, LeadTier, ScoringConfig, ScoringEngine};

#[test]
fn maxed_out_lead_is_clamped_to_one_hundred() {
    let contact = hot_contact("c-1");
    let deals = vec![opportunity("o-1", "c-1", PipelineStage::Negotiation, 3_000_000.0)];

    let result = score_lead(&contact, &deals, now());

    assert_eq!(result.score, 100);
    assert_eq!(result.level, LeadTier::Hot);
    assert_eq!(
        result.reasons,
        vec![
            "high-interest tag",
            "very recent activity, last 3 days",
            "1 active opportunity",
            "deal in advanced stage",
            "complete contact information",
            "quality source: referral",
        ]
    );
    assert_eq!(result.suggested_action, "contact immediately — high priority");
}

#[test]
fn unlisted_tags_earn_no_bonus() {
    let mut contact = contact("c-2", "Mateo Poot");
    contact.tags = vec!["VIP".to_string()];

    let result = score_lead(&contact, std::iter::empty(), now());

    assert_eq!(result.score, 0);
    assert_eq!(result.level, LeadTier::Cold);
    assert!(result.reasons.is_empty());
    assert_eq!(result.suggested_action, "keep in nurturing");
}

#[test]
fn hot_and_warm_tags_are_mutually_exclusive() {
    let mut contact = contact("c-3", "Sofia May");
    contact.tags = vec!["hot".to_string(), "warm".to_string()];

    let result = score_lead(&contact, std::iter::empty(), now());

    assert_eq!(result.score, 30);
    assert_eq!(result.reasons, vec!["high-interest tag"]);
}

#[test]
fn warm_tags_apply_only_without_hot_tags() {
    let mut contact = contact("c-4", "Sofia May");
    contact.tags = vec!["Follow-Up".to_string()];

    let result = score_lead(&contact, std::iter::empty(), now());

    assert_eq!(result.score, 15);
    assert_eq!(result.reasons, vec!["medium-interest tag"]);
}

#[test]
fn recency_brackets_follow_whole_days() {
    let mut contact = contact("c-5", "Diego Ek");

    contact.last_activity = Some(days_ago(3));
    let result = score_lead(&contact, std::iter::empty(), now());
    assert_eq!(result.score, 15);
    assert_eq!(result.reasons, vec!["recent activity, last week"]);

    contact.last_activity = Some(days_ago(7));
    let result = score_lead(&contact, std::iter::empty(), now());
    assert_eq!(result.score, 0);
    assert!(result.reasons.is_empty());
}

#[test]
fn email_alone_scores_without_a_reason() {
    let mut contact = contact("c-6", "Diego Ek");
    contact.email = Some("diego@example.com".to_string());

    let result = score_lead(&contact, std::iter::empty(), now());

    assert_eq!(result.score, 10);
    assert!(result.reasons.is_empty());
}

#[test]
fn closed_deals_do_not_count_as_active() {
    let contact = contact("c-7", "Ana Chi");
    let deals = vec![
        with_status(
            opportunity("o-won", "c-7", PipelineStage::Won, 1_000.0),
            OpportunityStatus::Won,
        ),
        opportunity("o-1", "c-7", PipelineStage::New, 1_000.0),
        opportunity("o-2", "c-7", PipelineStage::Qualified, 1_000.0),
    ];

    let result = score_lead(&contact, &deals, now());

    assert_eq!(result.score, 20);
    assert_eq!(result.reasons, vec!["2 active opportunities"]);
}

#[test]
fn warm_tier_leads_at_sixty_are_still_surfaced() {
    let mut warm = contact("c-warm", "Lucia Pech");
    warm.tags = vec!["interested".to_string()];
    warm.last_activity = Some(days_ago(4));
    warm.email = Some("lucia@example.com".to_string());
    warm.phone = Some("+52 998 000 0000".to_string());

    let mut below = warm.clone();
    below.id.0 = "c-below".to_string();
    below.phone = None;

    let engine = ScoringEngine::default();
    let leads = engine.rank_hot_leads(&[warm, below], &[], now());

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].contact_id.0, "c-warm");
    assert_eq!(leads[0].score, 60);
    assert_eq!(leads[0].level, LeadTier::Warm);
    assert_eq!(leads[0].suggested_action, "schedule follow-up this week");
}

#[test]
fn hot_leads_rank_by_score_and_keep_input_order_on_ties() {
    let first = hot_contact("c-a");
    let second = hot_contact("c-b");
    let best = hot_contact("c-best");
    let deals = vec![opportunity("o-1", "c-best", PipelineStage::Proposal, 900_000.0)];

    let engine = ScoringEngine::default();
    let leads = engine.rank_hot_leads(&[first, second, best], &deals, now());

    let ids: Vec<&str> = leads.iter().map(|lead| lead.contact_id.0.as_str()).collect();
    assert_eq!(ids, vec!["c-best", "c-a", "c-b"]);
    assert_eq!(leads[0].score, 100);
    assert_eq!(leads[1].score, 80);
    assert_eq!(leads[1].email, "valeria@example.com");
}

#[test]
fn scan_limit_caps_contacts_considered() {
    let engine = ScoringEngine::new(ScoringConfig {
        hot_lead_scan_limit: 1,
        ..ScoringConfig::default()
    });

    let leads = engine.rank_hot_leads(&[hot_contact("c-a"), hot_contact("c-b")], &[], now());

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].contact_id.0, "c-a");
}
