use super::super::crm::{AgentId, ContactId, ContactRecord, OpportunityRecord};

/// Which slice of the CRM a request may see: admins get everything, brokers their own contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentScope {
    All,
    Agent(AgentId),
}

impl AgentScope {
    pub fn from_agent_id(agent_id: Option<String>) -> Self {
        match agent_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => AgentScope::Agent(AgentId(id.trim().to_string())),
            None => AgentScope::All,
        }
    }

    pub fn includes(&self, contact: &ContactRecord) -> bool {
        match self {
            AgentScope::All => true,
            AgentScope::Agent(agent) => contact.assigned_to.as_ref() == Some(agent),
        }
    }
}

/// Source of normalized contact and opportunity records (CRM API, gateway, or snapshot).
pub trait CrmDataProvider: Send + Sync {
    fn contacts(&self, scope: &AgentScope) -> Result<Vec<ContactRecord>, ProviderError>;
    /// Opportunities whose owning contact falls inside `scope`.
    fn opportunities(&self, scope: &AgentScope) -> Result<Vec<OpportunityRecord>, ProviderError>;
    fn contact(&self, id: &ContactId) -> Result<Option<ContactRecord>, ProviderError>;
    fn contact_opportunities(
        &self,
        id: &ContactId,
    ) -> Result<Vec<OpportunityRecord>, ProviderError>;
}

/// Error enumeration for upstream data failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("crm unavailable: {0}")]
    Unavailable(String),
    #[error("crm rejected credentials")]
    Unauthorized,
    #[error("malformed crm payload: {0}")]
    Malformed(String),
}
