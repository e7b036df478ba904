use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use selvadentro_crm::config::CrmSourceConfig;
use selvadentro_crm::error::AppError;
use selvadentro_crm::workflows::crm::{
    ContactId, ContactRecord, CrmExportImporter, CrmSnapshot, OpportunityRecord,
};
use selvadentro_crm::workflows::scoring::{
    AgentScope, CrmDataProvider, ProviderError, ScoringConfig,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) scoring: ScoringConfig,
}

/// Serves scoring requests from a CRM snapshot held in memory.
#[derive(Default, Clone)]
pub(crate) struct SnapshotProvider {
    snapshot: Arc<RwLock<CrmSnapshot>>,
}

impl SnapshotProvider {
    pub(crate) fn new(snapshot: CrmSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CrmSnapshot>, ProviderError> {
        self.snapshot
            .read()
            .map_err(|_| ProviderError::Unavailable("snapshot lock poisoned".to_string()))
    }
}

impl CrmDataProvider for SnapshotProvider {
    fn contacts(&self, scope: &AgentScope) -> Result<Vec<ContactRecord>, ProviderError> {
        let guard = self.read()?;
        Ok(guard
            .contacts
            .iter()
            .filter(|contact| scope.includes(contact))
            .cloned()
            .collect())
    }

    fn opportunities(&self, scope: &AgentScope) -> Result<Vec<OpportunityRecord>, ProviderError> {
        let guard = self.read()?;
        if matches!(scope, AgentScope::All) {
            return Ok(guard.opportunities.clone());
        }

        let visible: HashSet<&ContactId> = guard
            .contacts
            .iter()
            .filter(|contact| scope.includes(contact))
            .map(|contact| &contact.id)
            .collect();
        Ok(guard
            .opportunities
            .iter()
            .filter(|opportunity| visible.contains(&opportunity.contact_id))
            .cloned()
            .collect())
    }

    fn contact(&self, id: &ContactId) -> Result<Option<ContactRecord>, ProviderError> {
        let guard = self.read()?;
        Ok(guard.contact(id).cloned())
    }

    fn contact_opportunities(
        &self,
        id: &ContactId,
    ) -> Result<Vec<OpportunityRecord>, ProviderError> {
        let guard = self.read()?;
        Ok(guard.opportunities_for(id).cloned().collect())
    }
}

/// Loads CRM data from the configured source. A JSON snapshot takes precedence over a CSV export.
pub(crate) fn load_snapshot(source: &CrmSourceConfig) -> Result<CrmSnapshot, AppError> {
    let snapshot = match (&source.snapshot_path, &source.export_csv) {
        (Some(path), _) => CrmSnapshot::from_path(path)?,
        (None, Some(path)) => CrmExportImporter::from_path(path)?,
        (None, None) => {
            warn!("no CRM source configured; serving an empty snapshot");
            return Ok(CrmSnapshot::default());
        }
    };

    info!(
        contacts = snapshot.contacts.len(),
        opportunities = snapshot.opportunities.len(),
        "crm snapshot loaded"
    );
    Ok(snapshot)
}

pub(crate) fn source_with_overrides(
    base: &CrmSourceConfig,
    snapshot: Option<PathBuf>,
    export_csv: Option<PathBuf>,
) -> CrmSourceConfig {
    if snapshot.is_none() && export_csv.is_none() {
        return base.clone();
    }
    CrmSourceConfig {
        snapshot_path: snapshot,
        export_csv,
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_timestamp(&value).map_err(serde::de::Error::custom))
        .transpose()
}
