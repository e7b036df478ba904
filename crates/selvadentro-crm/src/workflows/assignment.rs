//! Rule-based routing of new leads to brokers or teams.

use serde::{Deserialize, Serialize};

use super::crm::{normalize_label, AgentId, ContactRecord};

/// Criteria a contact must satisfy for a rule to fire. Empty criteria always match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConditions {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl AssignmentConditions {
    fn matches(&self, contact: &ContactRecord, pipeline_value: f64) -> bool {
        if !self.tags.is_empty() {
            let wanted: Vec<String> = self.tags.iter().map(|tag| normalize_label(tag)).collect();
            if !contact
                .normalized_tags()
                .any(|tag| wanted.iter().any(|candidate| *candidate == tag))
            {
                return false;
            }
        }

        if !self.sources.is_empty() {
            let Some(source) = contact.source.as_deref().map(normalize_label) else {
                return false;
            };
            if !self
                .sources
                .iter()
                .any(|candidate| normalize_label(candidate) == source)
            {
                return false;
            }
        }

        if self.min_value.is_some_and(|min| pipeline_value < min) {
            return false;
        }
        if self.max_value.is_some_and(|max| pipeline_value > max) {
            return false;
        }

        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRule {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    /// Lower values are evaluated first.
    pub priority: u32,
    #[serde(default)]
    pub conditions: AssignmentConditions,
    pub assign_to: AgentId,
}

/// Ordered collection of assignment rules; the first enabled match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRuleSet {
    rules: Vec<AssignmentRule>,
}

impl AssignmentRuleSet {
    pub fn new(mut rules: Vec<AssignmentRule>) -> Self {
        rules.sort_by_key(|rule| rule.priority);
        Self { rules }
    }

    /// Rules shipped with the dashboard before any broker customisation.
    pub fn default_rules() -> Self {
        Self::new(vec![
            AssignmentRule {
                id: "1".to_string(),
                name: "VIP leads to senior team".to_string(),
                enabled: true,
                priority: 1,
                conditions: AssignmentConditions {
                    tags: vec!["VIP".to_string(), "premium".to_string()],
                    ..AssignmentConditions::default()
                },
                assign_to: AgentId("senior-team".to_string()),
            },
            AssignmentRule {
                id: "2".to_string(),
                name: "Social leads to digital team".to_string(),
                enabled: true,
                priority: 2,
                conditions: AssignmentConditions {
                    sources: vec!["facebook".to_string(), "instagram".to_string()],
                    ..AssignmentConditions::default()
                },
                assign_to: AgentId("digital-team".to_string()),
            },
        ])
    }

    pub fn rules(&self) -> &[AssignmentRule] {
        &self.rules
    }

    /// `pipeline_value` is the contact's total open deal value, checked against value bounds.
    pub fn suggest(&self, contact: &ContactRecord, pipeline_value: f64) -> Option<&AssignmentRule> {
        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .find(|rule| rule.conditions.matches(contact, pipeline_value))
    }
}
