use super::normalizer::split_tags;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One row of a GoHighLevel opportunities export.
#[derive(Debug, Deserialize)]
pub(crate) struct ExportRow {
    #[serde(rename = "Opportunity ID")]
    pub(crate) opportunity_id: String,
    #[serde(rename = "Opportunity Name", default)]
    pub(crate) opportunity_name: String,
    #[serde(rename = "Contact ID")]
    pub(crate) contact_id: String,
    #[serde(rename = "Contact Name", default)]
    pub(crate) contact_name: String,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    pub(crate) email: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    pub(crate) phone: Option<String>,
    #[serde(
        rename = "Pipeline Stage",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) pipeline_stage: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(
        rename = "Lead Value",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) lead_value: Option<String>,
    #[serde(rename = "Source", default, deserialize_with = "empty_string_as_none")]
    pub(crate) source: Option<String>,
    #[serde(rename = "Tags", default)]
    pub(crate) tags: String,
    #[serde(rename = "Created On")]
    pub(crate) created_on: String,
    #[serde(
        rename = "Last Stage Change",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) last_stage_change: Option<String>,
    #[serde(
        rename = "Last Activity",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) last_activity: Option<String>,
    #[serde(
        rename = "Assigned To",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) assigned_to: Option<String>,
}

impl ExportRow {
    pub(crate) fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }

    /// Lead value with currency symbols and thousands separators stripped.
    pub(crate) fn value(&self) -> f64 {
        self.lead_value
            .as_deref()
            .map(|raw| {
                raw.chars()
                    .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
                    .collect::<String>()
            })
            .and_then(|cleaned| cleaned.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ExportRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<ExportRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    #[test]
    fn parse_timestamp_supports_rfc3339_and_date_strings() {
        assert_eq!(
            parse_timestamp("2025-09-24T10:00:00-05:00"),
            Some(Utc.with_ymd_and_hms(2025, 9, 24, 15, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2025-09-30"),
            Some(Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap())
        );
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn rows_tolerate_missing_optional_cells() {
        let csv = "Opportunity ID,Opportunity Name,Contact ID,Contact Name,Lead Value,Tags,Created On\n\
opp-1,Lote 4,c-1,Ana Ruiz,\"$1,250,000.50\",\"hot, vip\",2025-09-01\n";
        let rows = parse_rows(Cursor::new(csv)).expect("rows parse");
        let row = &rows[0];

        assert_eq!(row.value(), 1_250_000.5);
        assert_eq!(row.tag_list(), vec!["hot".to_string(), "vip".to_string()]);
        assert!(row.email.is_none());
        assert!(row.pipeline_stage.is_none());
    }
}
