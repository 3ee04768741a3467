use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{Baseline, CheckinSnapshot, ClientRecord};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported check-in file format: {0} (expected .json or .csv)")]
    UnsupportedFormat(String),
    #[error("no check-ins found in {0}")]
    Empty(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonExport {
    Record(ClientRecord),
    Checkins(Vec<CheckinSnapshot>),
}

/// Loads a client export. JSON may be a full record (`client`, `baseline`,
/// `checkins`) or a bare array of check-ins; CSV holds one check-in per row.
pub fn load_client_record(path: &Path) -> Result<ClientRecord> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading check-ins: {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let record = match extension.as_str() {
        "json" => parse_json_record(&data)
            .with_context(|| format!("failed parsing JSON check-ins: {}", path.display()))?,
        "csv" => ClientRecord {
            checkins: parse_csv_checkins(&data)
                .with_context(|| format!("failed parsing CSV check-ins: {}", path.display()))?,
            ..ClientRecord::default()
        },
        other => return Err(IngestError::UnsupportedFormat(other.to_string()).into()),
    };
    if record.checkins.is_empty() {
        return Err(IngestError::Empty(path.display().to_string()).into());
    }
    debug!(
        count = record.checkins.len(),
        has_baseline = record.baseline.is_some(),
        "loaded check-ins"
    );
    Ok(record)
}

pub fn load_baseline(path: &Path) -> Result<Baseline> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading baseline: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed parsing baseline JSON: {}", path.display()))
}

pub fn parse_json_record(data: &str) -> Result<ClientRecord> {
    let export: JsonExport = serde_json::from_str(data)?;
    Ok(match export {
        JsonExport::Record(record) => record,
        JsonExport::Checkins(checkins) => ClientRecord {
            checkins,
            ..ClientRecord::default()
        },
    })
}

pub fn parse_csv_checkins(data: &str) -> Result<Vec<CheckinSnapshot>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());
    let mut checkins = Vec::new();
    for (line, row) in reader.deserialize::<CheckinSnapshot>().enumerate() {
        match row {
            Ok(snapshot) => checkins.push(snapshot),
            Err(err) => warn!("skipping malformed check-in row {}: {err}", line + 2),
        }
    }
    Ok(checkins)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_csv_checkins, parse_json_record};

    #[test]
    fn parses_full_json_record() {
        let record = parse_json_record(
            r#"{
                "client": "marina",
                "baseline": {"weight": "74,5", "height": 165, "waist": 84, "hip": "103"},
                "checkins": [
                    {"date": "2024-02-01", "weight": 73.1, "measurements": "Cintura 82 Quadril 102"},
                    {"date": "2024-02-15", "weight": "72,6", "adherence": "90%"}
                ]
            }"#,
        )
        .expect("record should parse");

        assert_eq!(record.client.as_deref(), Some("marina"));
        let baseline = record.baseline.expect("baseline present");
        assert_eq!(baseline.weight_kg(), Some(74.5));
        assert_eq!(baseline.height_cm(), Some(165.0));
        assert_eq!(record.checkins.len(), 2);
        assert_eq!(
            record.checkins[1].date,
            NaiveDate::from_ymd_opt(2024, 2, 15)
        );
    }

    #[test]
    fn parses_bare_checkin_array() {
        let record = parse_json_record(r#"[{"weight": "70"}, {"weight": "69,5"}]"#)
            .expect("array should parse");
        assert!(record.baseline.is_none());
        assert_eq!(record.checkins.len(), 2);
        assert_eq!(record.checkins[1].weight_kg(), Some(69.5));
    }

    #[test]
    fn parses_csv_rows_with_blank_fields() {
        let data = "date,weight,measurement_text,training_sessions,adherence\n\
                    2024-02-01,73.1,Cintura 82 Quadril 102,4,85%\n\
                    2024-02-15,,\"Cintura: 81, Quadril: 101\",,\n";
        let checkins = parse_csv_checkins(data).expect("csv should parse");

        assert_eq!(checkins.len(), 2);
        assert_eq!(checkins[0].weight_kg(), Some(73.1));
        assert_eq!(checkins[0].adherence.as_deref(), Some("85%"));
        assert_eq!(checkins[1].weight, None);
        assert_eq!(
            checkins[1].measurement_text.as_deref(),
            Some("Cintura: 81, Quadril: 101")
        );
        assert_eq!(checkins[1].training_sessions, None);
    }
}
