use crate::infra::{load_snapshot, source_with_overrides, SnapshotProvider};
use chrono::{DateTime, Utc};
use clap::Args;
use selvadentro_crm::config::AppConfig;
use selvadentro_crm::error::AppError;
use selvadentro_crm::workflows::crm::{CrmSnapshot, PipelineSummary};
use selvadentro_crm::workflows::scoring::{
    AgentScope, DealAtRisk, FollowUpSuggestion, HotLead, ScoringConfig, ScoringService,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// JSON snapshot of contacts and opportunities
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// GoHighLevel opportunities CSV export
    #[arg(long)]
    pub(crate) export_csv: Option<PathBuf>,
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Restrict the report to contacts owned by this broker
    #[arg(long)]
    pub(crate) agent: Option<String>,
}

/// Dashboard lists computed over one snapshot at one instant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoringReport {
    pub(crate) as_of: DateTime<Utc>,
    pub(crate) contacts: usize,
    pub(crate) opportunities: usize,
    pub(crate) hot_leads: Vec<HotLead>,
    pub(crate) follow_ups: Vec<FollowUpSuggestion>,
    pub(crate) deals_at_risk: Vec<DealAtRisk>,
    pub(crate) pipeline: PipelineSummary,
}

impl ScoringReport {
    pub(crate) fn build(
        snapshot: CrmSnapshot,
        config: ScoringConfig,
        scope: &AgentScope,
        as_of: DateTime<Utc>,
    ) -> Self {
        let contacts = snapshot.contacts.len();
        let opportunities = snapshot.opportunities.len();
        let service = ScoringService::new(Arc::new(SnapshotProvider::new(snapshot)), config);

        Self {
            as_of,
            contacts,
            opportunities,
            hot_leads: service.hot_leads(scope, as_of),
            follow_ups: service.follow_ups(scope, as_of),
            deals_at_risk: service.deals_at_risk(scope, as_of),
            pipeline: service.pipeline_summary(scope, as_of),
        }
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        export_csv,
        as_of,
        agent,
    } = args;

    let config = AppConfig::load()?;
    let source = source_with_overrides(&config.crm, snapshot, export_csv);
    let snapshot = load_snapshot(&source)?;
    let scope = AgentScope::from_agent_id(agent);
    let as_of = as_of.unwrap_or_else(Utc::now);

    let report = ScoringReport::build(snapshot, config.scoring, &scope, as_of);
    render_report(&report, &scope);
    Ok(())
}

pub(crate) fn render_report(report: &ScoringReport, scope: &AgentScope) {
    println!("Selvadentro lead scoring report");
    println!(
        "Evaluated {} over {} contacts and {} opportunities",
        report.as_of.format("%Y-%m-%d %H:%M UTC"),
        report.contacts,
        report.opportunities
    );
    match scope {
        AgentScope::All => println!("Scope: all brokers"),
        AgentScope::Agent(agent) => println!("Scope: broker {}", agent.0),
    }

    if report.hot_leads.is_empty() {
        println!("\nHot leads: none");
    } else {
        println!("\nHot leads");
        for lead in &report.hot_leads {
            println!(
                "- {} [{}] score {} ({}): {}",
                lead.name,
                lead.contact_id.0,
                lead.score,
                lead.level.label(),
                lead.suggested_action
            );
            if !lead.reasons.is_empty() {
                println!("  {}", lead.reasons.join("; "));
            }
        }
    }

    if report.follow_ups.is_empty() {
        println!("\nFollow-ups: none");
    } else {
        println!("\nFollow-ups");
        for entry in &report.follow_ups {
            let reason = if entry.reason.is_empty() {
                format!("{} days since last contact", entry.days_since_last_contact)
            } else {
                entry.reason.clone()
            };
            println!(
                "- [{}] {} ({}), {:.0} MXN: {}",
                entry.priority.label(),
                entry.name,
                entry.deal_id.0,
                entry.deal_value,
                reason
            );
        }
    }

    if report.deals_at_risk.is_empty() {
        println!("\nDeals at risk: none");
    } else {
        println!("\nDeals at risk");
        for deal in &report.deals_at_risk {
            println!(
                "- {} ({}), {} days idle, {:.0} MXN",
                deal.name, deal.deal_id.0, deal.days_since_update, deal.value
            );
        }
    }

    let pipeline = &report.pipeline;
    println!(
        "\nPipeline: {} open deals, {:.0} MXN total, {:.0} MXN average, {} stale",
        pipeline.total_deals, pipeline.total_value, pipeline.average_deal_size, pipeline.stale_deals
    );
    for stage in &pipeline.stages {
        println!(
            "- {}: {} deals, {:.0} MXN ({}%)",
            stage.stage, stage.deals_count, stage.total_value, stage.percentage
        );
    }
}
