//! Lead heat, follow-up urgency, and deal-close scoring for the Selvadentro Tulum
//! broker dashboard, plus the CRM import and assignment plumbing around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
