use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::measurements::normalize::normalize;

/// One submitted check-in as handed over by the persistence layer.
///
/// Numeric fields stay text-typed: storage has accepted free text for years,
/// so every value goes through [`normalize`] before it is compared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckinSnapshot {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "raw_text")]
    pub weight: Option<String>,
    #[serde(default, alias = "measurements")]
    pub measurement_text: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub training_sessions: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub cardio_sessions: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub water_intake: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub sleep_quality: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub free_meals: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub snack_slips: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub adherence: Option<String>,
}

impl CheckinSnapshot {
    pub fn dated(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn with_measurements(mut self, text: impl Into<String>) -> Self {
        self.measurement_text = Some(text.into());
        self
    }

    pub fn with_training(mut self, training: impl Into<String>, cardio: impl Into<String>) -> Self {
        self.training_sessions = Some(training.into());
        self.cardio_sessions = Some(cardio.into());
        self
    }

    pub fn with_habits(mut self, water: impl Into<String>, sleep: impl Into<String>) -> Self {
        self.water_intake = Some(water.into());
        self.sleep_quality = Some(sleep.into());
        self
    }

    pub fn with_diet(
        mut self,
        free_meals: impl Into<String>,
        snack_slips: impl Into<String>,
        adherence: impl Into<String>,
    ) -> Self {
        self.free_meals = Some(free_meals.into());
        self.snack_slips = Some(snack_slips.into());
        self.adherence = Some(adherence.into());
        self
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.as_deref().and_then(normalize)
    }
}

/// A client's one-time anthropometric intake record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Baseline {
    #[serde(default, deserialize_with = "raw_text")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub waist: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub hip: Option<String>,
}

impl Baseline {
    pub fn new(weight: &str, height: &str, waist: &str, hip: &str) -> Self {
        Self {
            weight: non_blank(weight),
            height: non_blank(height),
            waist: non_blank(waist),
            hip: non_blank(hip),
        }
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.as_deref().and_then(normalize)
    }

    pub fn height_cm(&self) -> Option<f64> {
        self.height.as_deref().and_then(normalize)
    }

    pub fn waist_cm(&self) -> Option<f64> {
        self.waist.as_deref().and_then(normalize)
    }

    pub fn hip_cm(&self) -> Option<f64> {
        self.hip.as_deref().and_then(normalize)
    }
}

/// Everything known about one client: optional intake baseline plus check-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientRecord {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub baseline: Option<Baseline>,
    #[serde(default)]
    pub checkins: Vec<CheckinSnapshot>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Text(String),
    Integer(i64),
    Float(f64),
}

// Storage hands back strings, but JSON exports frequently carry bare numbers.
fn raw_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawInput>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawInput::Text(text) => non_blank(&text),
        RawInput::Integer(v) => Some(v.to_string()),
        RawInput::Float(v) => Some(v.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::{Baseline, CheckinSnapshot, ClientRecord};

    #[test]
    fn accepts_numbers_and_strings_for_raw_fields() {
        let snapshot: CheckinSnapshot = serde_json::from_str(
            r#"{
                "date": "2024-03-01",
                "weight": 70.2,
                "measurements": "Cintura 63 Quadril 97",
                "training_sessions": "4",
                "adherence": "85%",
                "free_meals": ""
            }"#,
        )
        .expect("snapshot should parse");

        assert_eq!(snapshot.weight.as_deref(), Some("70.2"));
        assert_eq!(snapshot.training_sessions.as_deref(), Some("4"));
        assert_eq!(snapshot.adherence.as_deref(), Some("85%"));
        assert_eq!(snapshot.free_meals, None);
        assert_eq!(snapshot.cardio_sessions, None);
        assert!((snapshot.weight_kg().expect("weight") - 70.2).abs() < 1e-9);
    }

    #[test]
    fn baseline_reads_comma_decimals() {
        let baseline = Baseline::new("82,4", "1,68", "91", " ");
        assert!((baseline.weight_kg().expect("weight") - 82.4).abs() < 1e-9);
        assert!((baseline.height_cm().expect("height") - 1.68).abs() < 1e-9);
        assert_eq!(baseline.waist_cm(), Some(91.0));
        assert_eq!(baseline.hip, None);
    }

    #[test]
    fn client_record_defaults_missing_sections() {
        let record: ClientRecord =
            serde_json::from_str(r#"{"client": "ana"}"#).expect("record should parse");
        assert_eq!(record.client.as_deref(), Some("ana"));
        assert!(record.baseline.is_none());
        assert!(record.checkins.is_empty());
    }
}
