use chrono::{DateTime, TimeZone, Utc};
use selvadentro_crm::workflows::assignment::AssignmentRuleSet;
use selvadentro_crm::workflows::crm::{
    AgentId, AggregateStats, ContactId, CrmExportImporter, CrmSnapshot, DealFilter,
    OpportunityStatus, PipelineStage, PipelineSummary,
};
use selvadentro_crm::workflows::scoring::{
    DealTier, FollowUpPriority, LeadTier, RiskLevel, ScoringEngine,
};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0)
        .single()
        .expect("valid as-of")
}

fn sample_snapshot() -> CrmSnapshot {
    let data = include_bytes!("../Selvadentro_Opportunities.csv");
    CrmExportImporter::from_reader(&data[..]).expect("sample export imports")
}

#[test]
fn export_rows_collapse_into_contacts() {
    let snapshot = sample_snapshot();

    assert_eq!(snapshot.contacts.len(), 4);
    assert_eq!(snapshot.opportunities.len(), 5);

    let ana = snapshot
        .contact(&ContactId("c-ana".to_string()))
        .expect("ana imported");
    assert_eq!(ana.tags, vec!["hot".to_string(), "VIP".to_string()]);
    assert_eq!(ana.assigned_to, Some(AgentId("broker-ana".to_string())));
    assert_eq!(
        ana.last_activity,
        Some(Utc.with_ymd_and_hms(2025, 10, 14, 10, 0, 0).unwrap())
    );

    let villa = &snapshot.opportunities[0];
    assert_eq!(villa.value, 4_500_000.0);
    assert_eq!(villa.stage, PipelineStage::Negotiation);
    assert_eq!(snapshot.opportunities[1].status, OpportunityStatus::Won);
}

#[test]
fn dashboard_lists_from_sample_export() {
    let snapshot = sample_snapshot();
    let engine = ScoringEngine::default();

    let hot = engine.rank_hot_leads(&snapshot.contacts, &snapshot.opportunities, as_of());
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].contact_id.0, "c-ana");
    assert_eq!(hot[0].score, 100);
    assert_eq!(hot[0].level, LeadTier::Hot);

    let follow_ups =
        engine.follow_up_suggestions(&snapshot.opportunities, &snapshot.contacts, as_of());
    let summary: Vec<(&str, FollowUpPriority)> = follow_ups
        .iter()
        .map(|entry| (entry.deal_id.0.as_str(), entry.priority))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("opp-101", FollowUpPriority::High),
            ("opp-201", FollowUpPriority::High),
        ]
    );
    assert_eq!(follow_ups[1].reason, "56 days without update");

    let at_risk = engine.deals_at_risk(&snapshot.opportunities, as_of());
    assert_eq!(at_risk.len(), 1);
    assert_eq!(at_risk[0].deal_id.0, "opp-201");
    assert_eq!(at_risk[0].risk_level, RiskLevel::High);
}

#[test]
fn contact_deals_score_against_their_history() {
    let snapshot = sample_snapshot();
    let engine = ScoringEngine::default();
    let ana = snapshot
        .contact(&ContactId("c-ana".to_string()))
        .expect("ana imported");
    let history: Vec<_> = snapshot.opportunities_for(&ana.id).cloned().collect();

    let stats = AggregateStats::from_opportunities(&history, ana.last_activity, as_of());
    assert_eq!(stats.win_rate, 100.0);
    assert_eq!(stats.last_interaction_days, 1);

    let ranked = engine.rank_deals(&history, &stats, as_of());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].deal_id.0, "opp-101");
    assert_eq!(ranked[0].score.score, 86);
    assert_eq!(ranked[0].score.level, DealTier::High);
}

#[test]
fn pipeline_summary_and_filters_cover_open_deals() {
    let snapshot = sample_snapshot();

    let summary = PipelineSummary::build(&snapshot.opportunities, as_of(), 30);
    assert_eq!(summary.total_deals, 3);
    assert_eq!(summary.total_value, 6_500_000.0);
    assert_eq!(summary.stale_deals, 1);

    let filter = DealFilter {
        min_value: Some(1_000_000.0),
        stale: Some(false),
        ..DealFilter::default()
    };
    let matches: Vec<&str> = filter
        .apply(&snapshot.opportunities, as_of(), 30)
        .into_iter()
        .map(|deal| deal.id.0.as_str())
        .collect();
    assert_eq!(matches, vec!["opp-101", "opp-102"]);
}

#[test]
fn default_rules_route_sample_contacts() {
    let snapshot = sample_snapshot();
    let rules = AssignmentRuleSet::default_rules();

    let route = |id: &str| {
        let contact = snapshot
            .contact(&ContactId(id.to_string()))
            .expect("contact imported");
        rules
            .suggest(contact, 0.0)
            .map(|rule| rule.assign_to.0.clone())
    };

    assert_eq!(route("c-ana").as_deref(), Some("senior-team"));
    assert_eq!(route("c-luis").as_deref(), Some("digital-team"));
    assert_eq!(route("c-diego").as_deref(), Some("digital-team"));
    assert_eq!(route("c-sofia"), None);
}

#[test]
fn json_snapshot_round_trips_through_the_engine() {
    let payload = r#"{
        "contacts": [
            {
                "id": "c-1",
                "name": "Valeria Canul",
                "email": "valeria@example.com",
                "tags": ["Interested"],
                "last_activity": "2025-10-13T08:00:00Z"
            }
        ],
        "opportunities": [
            {
                "id": "o-1",
                "name": "Lote 7",
                "value": 950000,
                "status": "open",
                "stage": "contract sent",
                "created_at": "2025-10-01T00:00:00Z",
                "contact_id": "c-1"
            }
        ]
    }"#;

    let snapshot = CrmSnapshot::from_json_reader(payload.as_bytes()).expect("snapshot parses");
    let engine = ScoringEngine::default();

    let hot = engine.rank_hot_leads(&snapshot.contacts, &snapshot.opportunities, as_of());
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].score, 95);
    assert_eq!(snapshot.opportunities[0].stage, PipelineStage::ContractSent);
}
