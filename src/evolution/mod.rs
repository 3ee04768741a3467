pub mod calculator;
pub mod history;
pub mod summary;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use calculator::compute_evolution;

/// Whether a missing value is reported as absent or as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Body measurements: a blank field is absent and yields no delta.
    Anthropometric,
    /// Habit scores and counts: "not recorded" counts as zero.
    Score,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Weight,
    Waist,
    Hip,
    TrainingSessions,
    CardioSessions,
    WaterIntake,
    SleepQuality,
    FreeMeals,
    SnackSlips,
    Adherence,
}

impl MetricKey {
    pub const ALL: [MetricKey; 10] = [
        MetricKey::Weight,
        MetricKey::Waist,
        MetricKey::Hip,
        MetricKey::TrainingSessions,
        MetricKey::CardioSessions,
        MetricKey::WaterIntake,
        MetricKey::SleepQuality,
        MetricKey::FreeMeals,
        MetricKey::SnackSlips,
        MetricKey::Adherence,
    ];

    pub fn kind(self) -> MetricKind {
        match self {
            Self::Weight | Self::Waist | Self::Hip => MetricKind::Anthropometric,
            _ => MetricKind::Score,
        }
    }

    /// Direction a coach reads as progress: body measurements, free meals and
    /// snack slips should go down, everything else up.
    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            Self::Weight | Self::Waist | Self::Hip | Self::FreeMeals | Self::SnackSlips
        )
    }

    pub fn as_slug(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Waist => "waist",
            Self::Hip => "hip",
            Self::TrainingSessions => "training_sessions",
            Self::CardioSessions => "cardio_sessions",
            Self::WaterIntake => "water_intake",
            Self::SleepQuality => "sleep_quality",
            Self::FreeMeals => "free_meals",
            Self::SnackSlips => "snack_slips",
            Self::Adherence => "adherence",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Weight => "kg",
            Self::Waist | Self::Hip => "cm",
            Self::Adherence => "%",
            _ => "",
        }
    }
}

impl Display for MetricKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Weight => "Weight",
            Self::Waist => "Waist",
            Self::Hip => "Hip",
            Self::TrainingSessions => "Training sessions",
            Self::CardioSessions => "Cardio sessions",
            Self::WaterIntake => "Water intake",
            Self::SleepQuality => "Sleep quality",
            Self::FreeMeals => "Free meals",
            Self::SnackSlips => "Snack slips",
            Self::Adherence => "Adherence",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown metric: {0}")]
pub struct MetricKeyParseError(pub String);

impl FromStr for MetricKey {
    type Err = MetricKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "weight" | "peso" => Ok(Self::Weight),
            "waist" | "cintura" => Ok(Self::Waist),
            "hip" | "quadril" => Ok(Self::Hip),
            "training_sessions" | "training" | "treinos" => Ok(Self::TrainingSessions),
            "cardio_sessions" | "cardio" => Ok(Self::CardioSessions),
            "water_intake" | "water" | "agua" | "água" => Ok(Self::WaterIntake),
            "sleep_quality" | "sleep" | "sono" => Ok(Self::SleepQuality),
            "free_meals" | "refeicoes_livres" => Ok(Self::FreeMeals),
            "snack_slips" | "beliscos" => Ok(Self::SnackSlips),
            "adherence" | "adesao" | "adesão" => Ok(Self::Adherence),
            _ => Err(MetricKeyParseError(s.to_string())),
        }
    }
}

/// Which data point the current check-in was compared against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSource {
    NoHistory,
    Baseline,
    PriorSnapshot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Worsened,
    Unchanged,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDelta {
    pub metric: MetricKey,
    pub previous_value: Option<f64>,
    pub current_value: Option<f64>,
    pub delta: Option<f64>,
}

impl MetricDelta {
    pub fn trend(&self) -> Trend {
        match self.delta {
            None => Trend::Unknown,
            Some(d) if d == 0.0 => Trend::Unchanged,
            Some(d) if (d < 0.0) == self.metric.lower_is_better() => Trend::Improved,
            Some(_) => Trend::Worsened,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvolutionReport {
    /// True only when a prior check-in exists, whatever fields it carries.
    pub has_previous: bool,
    pub source: ComparisonSource,
    pub current_date: Option<NaiveDate>,
    pub previous_date: Option<NaiveDate>,
    pub metrics: Vec<MetricDelta>,
}

impl EvolutionReport {
    pub fn metric(&self, key: MetricKey) -> Option<&MetricDelta> {
        self.metrics.iter().find(|m| m.metric == key)
    }

    pub fn delta(&self, key: MetricKey) -> Option<f64> {
        self.metric(key).and_then(|m| m.delta)
    }

    pub fn improved_count(&self) -> usize {
        self.metrics
            .iter()
            .filter(|m| m.trend() == Trend::Improved)
            .count()
    }

    pub fn worsened_count(&self) -> usize {
        self.metrics
            .iter()
            .filter(|m| m.trend() == Trend::Worsened)
            .count()
    }
}
