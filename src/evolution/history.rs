use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evolution::{compute_evolution, EvolutionReport, MetricKey};
use crate::measurements::normalize::round_tenth;
use crate::types::{Baseline, CheckinSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub report: EvolutionReport,
}

/// Picks the check-in a given date should be compared against: the most
/// recent one dated strictly earlier.
pub fn select_previous(checkins: &[CheckinSnapshot], target: NaiveDate) -> Option<&CheckinSnapshot> {
    checkins
        .iter()
        .filter(|c| c.date.is_some_and(|d| d < target))
        .max_by_key(|c| c.date)
}

/// Finds the check-in for `target` (the latest one when `None`) and its
/// chronological predecessor, the same pairing [`build_timeline`] reports.
/// Two check-ins on one date are compared with each other.
pub fn locate(
    checkins: &[CheckinSnapshot],
    target: Option<NaiveDate>,
) -> Option<(&CheckinSnapshot, Option<&CheckinSnapshot>)> {
    let ordered = chronological(checkins);
    let position = match target {
        Some(date) => ordered.iter().rposition(|c| c.date == Some(date))?,
        None => ordered.len().checked_sub(1)?,
    };
    let previous = position.checked_sub(1).map(|p| ordered[p]);
    Some((ordered[position], previous))
}

/// Reports every check-in against its predecessor; the first one is compared
/// against the baseline when there is one.
pub fn build_timeline(
    checkins: &[CheckinSnapshot],
    baseline: Option<&Baseline>,
) -> Vec<TimelineEntry> {
    let ordered = chronological(checkins);
    ordered
        .iter()
        .enumerate()
        .map(|(index, current)| {
            let previous = index.checked_sub(1).map(|p| ordered[p]);
            TimelineEntry {
                index,
                date: current.date,
                report: compute_evolution(current, previous, baseline),
            }
        })
        .collect()
}

/// Net change of one metric from the first to the last comparable entry.
pub fn cumulative_change(timeline: &[TimelineEntry], metric: MetricKey) -> Option<f64> {
    let values: Vec<f64> = timeline
        .iter()
        .filter_map(|entry| entry.report.metric(metric).and_then(|m| m.current_value))
        .collect();
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() > 1 => Some(round_tenth(last - first)),
        _ => None,
    }
}

fn all_dated(checkins: &[CheckinSnapshot]) -> bool {
    checkins.iter().all(|c| c.date.is_some())
}

fn chronological(checkins: &[CheckinSnapshot]) -> Vec<&CheckinSnapshot> {
    let mut ordered: Vec<&CheckinSnapshot> = checkins.iter().collect();
    if all_dated(checkins) {
        ordered.sort_by_key(|c| c.date);
    } else if checkins.len() > 1 {
        warn!("check-ins without a date found, keeping submission order");
    }
    ordered
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{build_timeline, cumulative_change, locate, select_previous};
    use crate::evolution::{compute_evolution, ComparisonSource, MetricKey};
    use crate::types::{Baseline, CheckinSnapshot};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
    }

    fn checkin(d: u32, weight: &str) -> CheckinSnapshot {
        CheckinSnapshot::dated(day(d)).with_weight(weight)
    }

    #[test]
    fn previous_is_latest_strictly_earlier() {
        let checkins = vec![checkin(20, "70"), checkin(1, "72"), checkin(10, "71")];
        let previous = select_previous(&checkins, day(20)).expect("previous exists");
        assert_eq!(previous.date, Some(day(10)));
        assert!(select_previous(&checkins, day(1)).is_none());
    }

    #[test]
    fn locate_defaults_to_latest_checkin() {
        let checkins = vec![checkin(10, "71"), checkin(20, "70"), checkin(1, "72")];
        let (current, previous) = locate(&checkins, None).expect("checkins present");
        assert_eq!(current.date, Some(day(20)));
        assert_eq!(previous.and_then(|p| p.date), Some(day(10)));

        let (current, previous) = locate(&checkins, Some(day(1))).expect("date present");
        assert_eq!(current.date, Some(day(1)));
        assert!(previous.is_none());
        assert!(locate(&checkins, Some(day(2))).is_none());
        assert!(locate(&[], None).is_none());
    }

    #[test]
    fn timeline_orders_by_date_and_chains_reports() {
        let baseline = Baseline::new("73", "", "", "");
        let checkins = vec![checkin(20, "70"), checkin(1, "72"), checkin(10, "71,4")];
        let timeline = build_timeline(&checkins, Some(&baseline));

        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[0].date, Some(day(1)));
        assert_eq!(timeline[0].report.source, ComparisonSource::Baseline);
        assert!(!timeline[0].report.has_previous);
        assert_eq!(timeline[0].report.delta(MetricKey::Weight), Some(-1.0));
        assert_eq!(timeline[1].report.delta(MetricKey::Weight), Some(-0.6));
        assert_eq!(timeline[2].report.delta(MetricKey::Weight), Some(-1.4));
        assert_eq!(cumulative_change(&timeline, MetricKey::Weight), Some(-2.0));
    }

    #[test]
    fn same_day_checkins_pair_up_like_the_timeline() {
        let checkins = vec![checkin(1, "72"), checkin(10, "71"), checkin(10, "70,5")];
        let (current, previous) = locate(&checkins, None).expect("checkins present");
        assert_eq!(current.weight.as_deref(), Some("70,5"));
        assert_eq!(previous.and_then(|p| p.weight.as_deref()), Some("71"));

        let timeline = build_timeline(&checkins, None);
        let report = compute_evolution(current, previous, None);
        assert_eq!(timeline[2].report, report);
        assert_eq!(report.delta(MetricKey::Weight), Some(-0.5));
    }

    #[test]
    fn undated_checkins_keep_submission_order() {
        let checkins = vec![
            CheckinSnapshot::default().with_weight("80"),
            CheckinSnapshot::default().with_weight("79"),
        ];
        let timeline = build_timeline(&checkins, None);
        assert_eq!(timeline[1].report.delta(MetricKey::Weight), Some(-1.0));

        let (current, previous) = locate(&checkins, None).expect("checkins present");
        assert_eq!(current.weight.as_deref(), Some("79"));
        assert_eq!(previous.and_then(|p| p.weight.as_deref()), Some("80"));
    }
}
