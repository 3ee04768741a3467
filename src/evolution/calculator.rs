use crate::evolution::{ComparisonSource, EvolutionReport, MetricDelta, MetricKey, MetricKind};
use crate::measurements::normalize::{normalize_or_zero, round_tenth};
use crate::measurements::{extract, MeasurementPair};
use crate::types::{Baseline, CheckinSnapshot};

/// What the current check-in is measured against, chosen once per report.
#[derive(Debug, Clone, Copy)]
pub enum ComparisonBasis<'a> {
    NoHistory,
    BaselineOnly(&'a Baseline),
    PriorSnapshot(&'a CheckinSnapshot),
}

impl<'a> ComparisonBasis<'a> {
    pub fn select(previous: Option<&'a CheckinSnapshot>, baseline: Option<&'a Baseline>) -> Self {
        match (previous, baseline) {
            (Some(previous), _) => Self::PriorSnapshot(previous),
            (None, Some(baseline)) => Self::BaselineOnly(baseline),
            (None, None) => Self::NoHistory,
        }
    }

    pub fn source(&self) -> ComparisonSource {
        match self {
            Self::NoHistory => ComparisonSource::NoHistory,
            Self::BaselineOnly(_) => ComparisonSource::Baseline,
            Self::PriorSnapshot(_) => ComparisonSource::PriorSnapshot,
        }
    }
}

/// Field values of one check-in after normalization and extraction.
struct ResolvedSnapshot<'a> {
    snapshot: &'a CheckinSnapshot,
    pair: MeasurementPair,
}

impl<'a> ResolvedSnapshot<'a> {
    fn new(snapshot: &'a CheckinSnapshot) -> Self {
        let pair = snapshot
            .measurement_text
            .as_deref()
            .map(extract)
            .unwrap_or_default();
        Self { snapshot, pair }
    }

    fn value(&self, key: MetricKey) -> Option<f64> {
        let raw = match key {
            MetricKey::Weight => return self.snapshot.weight_kg(),
            MetricKey::Waist => return self.pair.waist,
            MetricKey::Hip => return self.pair.hip,
            MetricKey::TrainingSessions => &self.snapshot.training_sessions,
            MetricKey::CardioSessions => &self.snapshot.cardio_sessions,
            MetricKey::WaterIntake => &self.snapshot.water_intake,
            MetricKey::SleepQuality => &self.snapshot.sleep_quality,
            MetricKey::FreeMeals => &self.snapshot.free_meals,
            MetricKey::SnackSlips => &self.snapshot.snack_slips,
            MetricKey::Adherence => &self.snapshot.adherence,
        };
        Some(normalize_or_zero(raw.as_deref()))
    }
}

fn baseline_value(baseline: &Baseline, key: MetricKey) -> Option<f64> {
    match key {
        MetricKey::Weight => baseline.weight_kg(),
        MetricKey::Waist => baseline.waist_cm(),
        MetricKey::Hip => baseline.hip_cm(),
        _ => None,
    }
}

/// Compares a check-in against the best prior data point available.
///
/// A prior check-in wins over the baseline, and only a prior check-in sets
/// `has_previous`. Body measurements without both sides have no delta; score
/// fields read blanks as zero and only report a delta against a real prior
/// check-in.
pub fn compute_evolution(
    current: &CheckinSnapshot,
    previous: Option<&CheckinSnapshot>,
    baseline: Option<&Baseline>,
) -> EvolutionReport {
    let basis = ComparisonBasis::select(previous, baseline);
    let current_values = ResolvedSnapshot::new(current);
    let previous_values = match basis {
        ComparisonBasis::PriorSnapshot(snapshot) => Some(ResolvedSnapshot::new(snapshot)),
        _ => None,
    };

    let metrics = MetricKey::ALL
        .iter()
        .map(|&key| {
            let previous_value = match (&basis, &previous_values) {
                (ComparisonBasis::PriorSnapshot(_), Some(values)) => values.value(key),
                (ComparisonBasis::BaselineOnly(baseline), _) => baseline_value(baseline, key),
                _ => None,
            };
            let current_value = current_values.value(key);
            match key.kind() {
                MetricKind::Anthropometric => MetricDelta {
                    metric: key,
                    previous_value,
                    current_value,
                    delta: match (current_value, previous_value) {
                        (Some(current), Some(previous)) => Some(round_tenth(current - previous)),
                        _ => None,
                    },
                },
                MetricKind::Score => {
                    let current = current_value.unwrap_or(0.0);
                    let previous = previous_value.unwrap_or(0.0);
                    let delta = if previous_values.is_some() {
                        round_tenth(current - previous)
                    } else {
                        0.0
                    };
                    MetricDelta {
                        metric: key,
                        previous_value: Some(previous),
                        current_value: Some(current),
                        delta: Some(delta),
                    }
                }
            }
        })
        .collect();

    EvolutionReport {
        has_previous: previous.is_some(),
        source: basis.source(),
        current_date: current.date,
        previous_date: previous.and_then(|p| p.date),
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{compute_evolution, ComparisonBasis};
    use crate::evolution::{ComparisonSource, MetricKey, MetricKind};
    use crate::types::{Baseline, CheckinSnapshot};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    fn full_snapshot(d: u32, weight: &str, measurements: &str) -> CheckinSnapshot {
        CheckinSnapshot::dated(day(d))
            .with_weight(weight)
            .with_measurements(measurements)
            .with_training("4", "2")
            .with_habits("3", "4")
            .with_diet("1", "2", "85%")
    }

    #[test]
    fn weight_delta_against_prior_checkin() {
        let previous = full_snapshot(1, "71,0", "Cintura 80 Quadril 100");
        let current = full_snapshot(15, "70.2", "Cintura 78,5 Quadril 99");
        let report = compute_evolution(&current, Some(&previous), None);

        assert!(report.has_previous);
        assert_eq!(report.source, ComparisonSource::PriorSnapshot);
        assert_eq!(report.delta(MetricKey::Weight), Some(-0.8));
        assert_eq!(report.delta(MetricKey::Waist), Some(-1.5));
        assert_eq!(report.delta(MetricKey::Hip), Some(-1.0));
        assert_eq!(report.previous_date, Some(day(1)));
        assert_eq!(report.current_date, Some(day(15)));
    }

    #[test]
    fn first_checkin_has_no_comparison() {
        let current = full_snapshot(1, "70.2", "Cintura 78 Quadril 99");
        let report = compute_evolution(&current, None, None);

        assert!(!report.has_previous);
        assert_eq!(report.source, ComparisonSource::NoHistory);
        for metric in &report.metrics {
            match metric.metric.kind() {
                MetricKind::Anthropometric => {
                    assert_eq!(metric.delta, None);
                    assert_eq!(metric.previous_value, None);
                }
                MetricKind::Score => assert_eq!(metric.delta, Some(0.0)),
            }
        }
        assert_eq!(
            report.metric(MetricKey::TrainingSessions).and_then(|m| m.current_value),
            Some(4.0)
        );
    }

    #[test]
    fn baseline_fills_in_without_prior_checkin() {
        let baseline = Baseline::new("74", "1,65", "84", "103");
        let current = full_snapshot(1, "72.5", "Cintura 81 Quadril 101");
        let report = compute_evolution(&current, None, Some(&baseline));

        assert!(!report.has_previous);
        assert_eq!(report.source, ComparisonSource::Baseline);
        assert_eq!(report.delta(MetricKey::Weight), Some(-1.5));
        assert_eq!(report.delta(MetricKey::Waist), Some(-3.0));
        assert_eq!(report.delta(MetricKey::Hip), Some(-2.0));
        assert_eq!(report.delta(MetricKey::Adherence), Some(0.0));
    }

    #[test]
    fn prior_checkin_beats_baseline_even_with_blank_fields() {
        let baseline = Baseline::new("74", "", "84", "103");
        let previous = CheckinSnapshot::dated(day(1)).with_measurements("sem medidas");
        let current = full_snapshot(15, "72.5", "Cintura 81 Quadril 101");
        let report = compute_evolution(&current, Some(&previous), Some(&baseline));

        assert!(report.has_previous);
        assert_eq!(report.delta(MetricKey::Weight), None);
        assert_eq!(report.delta(MetricKey::Waist), None);
        assert_eq!(report.delta(MetricKey::TrainingSessions), Some(4.0));
        assert_eq!(
            report.metric(MetricKey::FreeMeals).and_then(|m| m.previous_value),
            Some(0.0)
        );
    }

    #[test]
    fn malformed_fields_degrade_by_kind() {
        let previous = CheckinSnapshot::dated(day(1))
            .with_weight("n/a")
            .with_training("muitos", "2");
        let current = full_snapshot(15, "70", "Cintura 79 Quadril 98");
        let report = compute_evolution(&current, Some(&previous), None);

        assert_eq!(report.delta(MetricKey::Weight), None);
        assert_eq!(report.delta(MetricKey::TrainingSessions), Some(4.0));
        assert_eq!(report.delta(MetricKey::CardioSessions), Some(0.0));
    }

    #[test]
    fn basis_prefers_snapshot_then_baseline() {
        let baseline = Baseline::default();
        let snapshot = CheckinSnapshot::default();
        assert!(matches!(
            ComparisonBasis::select(Some(&snapshot), Some(&baseline)),
            ComparisonBasis::PriorSnapshot(_)
        ));
        assert!(matches!(
            ComparisonBasis::select(None, Some(&baseline)),
            ComparisonBasis::BaselineOnly(_)
        ));
        assert!(matches!(
            ComparisonBasis::select(None, None),
            ComparisonBasis::NoHistory
        ));
    }
}
