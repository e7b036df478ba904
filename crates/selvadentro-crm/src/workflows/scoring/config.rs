use serde::{Deserialize, Serialize};

/// List policies applied around the scorers. Tier thresholds are fixed and live in `tiers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum lead score for a contact to be surfaced in the hot-lead list.
    pub hot_lead_threshold: u8,
    /// Maximum number of contacts scanned per hot-lead run.
    pub hot_lead_scan_limit: usize,
    pub follow_up_limit: usize,
    /// Open deals idle longer than this many days count as stale.
    pub stale_after_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            hot_lead_threshold: 60,
            hot_lead_scan_limit: 50,
            follow_up_limit: 20,
            stale_after_days: 30,
        }
    }
}
