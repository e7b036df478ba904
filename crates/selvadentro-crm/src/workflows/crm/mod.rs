//! Normalized CRM records and the importers that produce them.
//!
//! Contact and opportunity payloads arrive from GoHighLevel either as a JSON
//! snapshot or as an opportunities CSV export. Both are reduced to a
//! [`CrmSnapshot`] before any scoring happens.

pub mod domain;
mod normalizer;
mod parser;
pub mod pipeline;
pub mod stats;

pub use domain::{
    days_between, AgentId, ContactId, ContactRecord, OpportunityId, OpportunityRecord,
    OpportunityStatus, PipelineStage,
};
pub use normalizer::normalize_label;
pub use pipeline::{DealFilter, PipelineSummary, StageBreakdown};
pub use stats::{AggregateStats, NO_INTERACTION_DAYS};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Error raised while loading CRM data from disk or a reader.
#[derive(Debug, thiserror::Error)]
pub enum CrmImportError {
    #[error("failed to read CRM export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CRM CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid CRM snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: unparsable Created On value '{value}'")]
    InvalidTimestamp { row: usize, value: String },
}

/// Contacts and opportunities fetched for one scoring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmSnapshot {
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
    #[serde(default)]
    pub opportunities: Vec<OpportunityRecord>,
}

impl CrmSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CrmImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(file)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CrmImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn contact(&self, id: &ContactId) -> Option<&ContactRecord> {
        self.contacts.iter().find(|contact| &contact.id == id)
    }

    pub fn opportunities_for<'a>(
        &'a self,
        contact_id: &'a ContactId,
    ) -> impl Iterator<Item = &'a OpportunityRecord> + 'a {
        self.opportunities
            .iter()
            .filter(move |opportunity| &opportunity.contact_id == contact_id)
    }
}

/// Builds a [`CrmSnapshot`] from a GoHighLevel opportunities CSV export.
pub struct CrmExportImporter;

impl CrmExportImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CrmSnapshot, CrmImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CrmSnapshot, CrmImportError> {
        let mut snapshot = CrmSnapshot::default();
        let mut contact_index: HashMap<ContactId, usize> = HashMap::new();

        for (index, row) in parser::parse_rows(reader)?.into_iter().enumerate() {
            let created_at = parser::parse_timestamp(&row.created_on).ok_or_else(|| {
                CrmImportError::InvalidTimestamp {
                    // header occupies line 1
                    row: index + 2,
                    value: row.created_on.clone(),
                }
            })?;
            let contact_id = ContactId(row.contact_id.clone());
            let tags = row.tag_list();
            let last_activity = row.last_activity.as_deref().and_then(parser::parse_timestamp);

            match contact_index.get(&contact_id) {
                Some(&position) => {
                    merge_contact(&mut snapshot.contacts[position], tags, last_activity);
                }
                None => {
                    contact_index.insert(contact_id.clone(), snapshot.contacts.len());
                    snapshot.contacts.push(ContactRecord {
                        id: contact_id.clone(),
                        name: row.contact_name.clone(),
                        email: row.email.clone(),
                        phone: row.phone.clone(),
                        tags,
                        source: row.source.clone(),
                        last_activity,
                        assigned_to: row.assigned_to.clone().map(AgentId),
                    });
                }
            }

            snapshot.opportunities.push(OpportunityRecord {
                id: OpportunityId(row.opportunity_id.clone()),
                name: row.opportunity_name.clone(),
                value: row.value(),
                status: row
                    .status
                    .as_deref()
                    .map(OpportunityStatus::parse)
                    .unwrap_or_default(),
                stage: row
                    .pipeline_stage
                    .as_deref()
                    .map(PipelineStage::parse)
                    .unwrap_or_default(),
                created_at,
                last_stage_change: row
                    .last_stage_change
                    .as_deref()
                    .and_then(parser::parse_timestamp),
                contact_id,
            });
        }

        Ok(snapshot)
    }
}

fn merge_contact(
    contact: &mut ContactRecord,
    tags: Vec<String>,
    last_activity: Option<chrono::DateTime<chrono::Utc>>,
) {
    for tag in tags {
        let normalized = normalize_label(&tag);
        if !contact
            .tags
            .iter()
            .any(|existing| normalize_label(existing) == normalized)
        {
            contact.tags.push(tag);
        }
    }

    contact.last_activity = match (contact.last_activity, last_activity) {
        (Some(current), Some(candidate)) => Some(current.max(candidate)),
        (current, candidate) => current.or(candidate),
    };
}
