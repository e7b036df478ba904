use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::normalizer::normalize_label;

/// Identifier wrapper for CRM contacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub String);

/// Identifier wrapper for pipeline opportunities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpportunityId(pub String);

/// Broker or team that owns a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized contact snapshot handed to the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: Option<AgentId>,
}

impl ContactRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ContactId(id.into()),
            name: name.into(),
            email: None,
            phone: None,
            tags: Vec::new(),
            source: None,
            last_activity: None,
            assigned_to: None,
        }
    }

    pub fn has_email(&self) -> bool {
        has_text(self.email.as_deref())
    }

    pub fn has_phone(&self) -> bool {
        has_text(self.phone.as_deref())
    }

    /// Tags lowercased and trimmed for membership checks.
    pub fn normalized_tags(&self) -> impl Iterator<Item = String> + '_ {
        self.tags.iter().map(|tag| normalize_label(tag))
    }

    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            return self.name.trim();
        }
        self.email.as_deref().unwrap_or_default()
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.map(|text| !text.trim().is_empty()).unwrap_or(false)
}

/// Pipeline entry with a monetary value and a stage label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    pub id: OpportunityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub status: OpportunityStatus,
    #[serde(default)]
    pub stage: PipelineStage,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_stage_change: Option<DateTime<Utc>>,
    pub contact_id: ContactId,
}

impl OpportunityRecord {
    /// Timestamp of the last pipeline movement, falling back to creation.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_stage_change.unwrap_or(self.created_at)
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Monetary value with negative or non-finite inputs treated as zero.
    pub fn monetary_value(&self) -> f64 {
        if self.value.is_finite() && self.value > 0.0 {
            self.value
        } else {
            0.0
        }
    }
}

/// CRM lifecycle status. Unrecognized labels fall back to `Open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    #[default]
    Open,
    Won,
    Lost,
    Abandoned,
}

impl OpportunityStatus {
    pub fn parse(value: &str) -> Self {
        match normalize_label(value).as_str() {
            "won" => Self::Won,
            "lost" => Self::Lost,
            "abandoned" => Self::Abandoned,
            _ => Self::Open,
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, OpportunityStatus::Won | OpportunityStatus::Lost)
    }
}

impl<'de> Deserialize<'de> for OpportunityStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Named position in the sales lifecycle. Labels outside the known set are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    #[default]
    New,
    Qualified,
    Proposal,
    Negotiation,
    ContractSent,
    Won,
    Lost,
    Other(String),
}

impl PipelineStage {
    pub fn parse(value: &str) -> Self {
        let normalized = normalize_label(value).replace(['-', '_'], " ");
        match normalized.as_str() {
            "new" => Self::New,
            "qualified" => Self::Qualified,
            "proposal" => Self::Proposal,
            "negotiation" => Self::Negotiation,
            "contract sent" => Self::ContractSent,
            "won" => Self::Won,
            "lost" => Self::Lost,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PipelineStage::New => "new",
            PipelineStage::Qualified => "qualified",
            PipelineStage::Proposal => "proposal",
            PipelineStage::Negotiation => "negotiation",
            PipelineStage::ContractSent => "contract-sent",
            PipelineStage::Won => "won",
            PipelineStage::Lost => "lost",
            PipelineStage::Other(label) => label,
        }
    }

    /// Close probability (percent) used by the deal-close predictor.
    pub const fn close_probability(&self) -> u8 {
        match self {
            PipelineStage::New => 10,
            PipelineStage::Qualified => 25,
            PipelineStage::Proposal => 50,
            PipelineStage::Negotiation => 75,
            PipelineStage::ContractSent => 90,
            PipelineStage::Won => 100,
            PipelineStage::Lost => 0,
            PipelineStage::Other(_) => 25,
        }
    }

    pub const fn is_advanced(&self) -> bool {
        matches!(
            self,
            PipelineStage::Proposal | PipelineStage::Negotiation | PipelineStage::ContractSent
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PipelineStage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PipelineStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Whole days elapsed between `earlier` and `now`, never negative.
pub fn days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - earlier).num_days().max(0)
}
