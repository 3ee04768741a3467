use regex::{Captures, Match, Regex};
use tracing::debug;

use crate::measurements::normalize::normalize;
use crate::measurements::patterns::{
    ClauseOrder, LabelPattern, ADJACENT_PAIR, HIP_HINT, HIP_PATTERNS, NUMBERED_ITEM,
    NUMERIC_TOKEN, PAIR_PATTERNS, WAIST_HINT, WAIST_PATTERNS,
};
use crate::measurements::{MeasurementPair, HIP_RANGE, UNLABELED_RANGE, WAIST_RANGE};

/// One step of the extraction cascade. A stage returns `None` when it has
/// nothing acceptable to offer and the next stage should run.
pub struct Stage {
    pub name: &'static str,
    pub run: fn(&str) -> Option<MeasurementPair>,
}

/// Stages in priority order; the first one that answers wins.
pub const CASCADE: [Stage; 4] = [
    Stage {
        name: "combined_labels",
        run: combined_labels,
    },
    Stage {
        name: "numbered_list",
        run: numbered_list,
    },
    Stage {
        name: "independent_labels",
        run: independent_labels,
    },
    Stage {
        name: "unlabeled",
        run: unlabeled,
    },
];

/// Mines a waist/hip pair out of a free-text measurement note.
///
/// Never fails: whatever cannot be validated comes back as `None`, and a
/// pair recorded the wrong way round is swapped when that makes it plausible.
pub fn extract(text: &str) -> MeasurementPair {
    if text.trim().is_empty() {
        return MeasurementPair::default();
    }
    for stage in &CASCADE {
        if let Some(pair) = (stage.run)(text) {
            debug!(stage = stage.name, ?pair, "measurement stage matched");
            return pair.ordered();
        }
    }
    MeasurementPair::default()
}

/// Both labels in one clause, each value inside its own range.
pub fn combined_labels(text: &str) -> Option<MeasurementPair> {
    for pattern in PAIR_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let (Some(first), Some(second)) = (
                standalone_value(text, caps.get(1)),
                standalone_value(text, caps.get(2)),
            ) else {
                continue;
            };
            let (waist, hip) = match pattern.order {
                ClauseOrder::WaistFirst => (first, second),
                ClauseOrder::HipFirst => (second, first),
            };
            let pair = MeasurementPair::validated(Some(waist), Some(hip));
            if pair.is_complete() {
                debug!(pattern = pattern.name, "combined label pattern matched");
                return Some(pair);
            }
        }
    }
    None
}

/// Enumerated "1- 76 cintura, 2- 93 quadril" lists. Items are read
/// independently, so their order does not matter.
pub fn numbered_list(text: &str) -> Option<MeasurementPair> {
    let mut waist = None;
    let mut hip = None;
    for caps in NUMBERED_ITEM.captures_iter(text) {
        let Some(value) = standalone_value(text, caps.get(1)) else {
            continue;
        };
        let label = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        if is_waist_label(&label) {
            waist = waist.or_else(|| WAIST_RANGE.accept(value));
        } else {
            hip = hip.or_else(|| HIP_RANGE.accept(value));
        }
    }
    let pair = MeasurementPair::new(waist, hip);
    pair.is_complete().then_some(pair)
}

/// Searches each circumference on its own. A hip candidate equal to the
/// waist value is the same number seen twice and is skipped.
pub fn independent_labels(text: &str) -> Option<MeasurementPair> {
    let waist = first_labeled(text, &WAIST_PATTERNS, |v| WAIST_RANGE.accept(v));
    let hip = first_labeled(text, &HIP_PATTERNS, |v| {
        HIP_RANGE.accept(v).filter(|hip| Some(*hip) != waist)
    });
    let pair = MeasurementPair::new(waist, hip);
    (!pair.is_empty()).then_some(pair)
}

/// Last resort for notes with no usable label.
pub fn unlabeled(text: &str) -> Option<MeasurementPair> {
    let numbers: Vec<f64> = NUMERIC_TOKEN
        .find_iter(text)
        .filter_map(|m| normalize(m.as_str()))
        .filter(|v| UNLABELED_RANGE.contains(*v))
        .collect();

    let pair = match numbers.as_slice() {
        [value] => single_hinted(text, *value),
        [first, second] => {
            let (a, b) = adjacent_order(text, *first, *second).unwrap_or((*first, *second));
            split_by_size(a, b)
        }
        _ => MeasurementPair::default(),
    };
    (!pair.is_empty()).then_some(pair)
}

// Only an adjacent pair made of the two plausible numbers counts; dates and
// list indexes next to each other are skipped.
fn adjacent_order(text: &str, first: f64, second: f64) -> Option<(f64, f64)> {
    ADJACENT_PAIR.captures_iter(text).find_map(|caps| {
        let (a, b) = (value_of(&caps, 1)?, value_of(&caps, 2)?);
        ((a, b) == (first, second) || (a, b) == (second, first)).then_some((a, b))
    })
}

fn single_hinted(text: &str, value: f64) -> MeasurementPair {
    match (WAIST_HINT.is_match(text), HIP_HINT.is_match(text)) {
        (true, false) => MeasurementPair::validated(Some(value), None),
        (false, true) => MeasurementPair::validated(None, Some(value)),
        _ => MeasurementPair::default(),
    }
}

/// Assigns two unlabeled numbers by size. When both sit in the band where
/// waist and hip overlap this is a best guess: the smaller one becomes waist.
fn split_by_size(a: f64, b: f64) -> MeasurementPair {
    let looks_waist = |v: f64| (50.0..=100.0).contains(&v);
    let looks_hip = |v: f64| (80.0..=150.0).contains(&v);
    let (waist, hip) = if looks_waist(a) && looks_hip(b) && b > a {
        (a, b)
    } else if looks_waist(b) && looks_hip(a) && a > b {
        (b, a)
    } else {
        (a.min(b), a.max(b))
    };
    MeasurementPair::validated(Some(waist), Some(hip))
}

fn first_labeled(
    text: &str,
    patterns: &[LabelPattern],
    accept: impl Fn(f64) -> Option<f64>,
) -> Option<f64> {
    patterns.iter().find_map(|pattern| {
        let found = first_accepted(text, &pattern.regex, &accept);
        if found.is_some() {
            debug!(pattern = pattern.name, value = ?found, "label pattern matched");
        }
        found
    })
}

fn first_accepted(text: &str, regex: &Regex, accept: &impl Fn(f64) -> Option<f64>) -> Option<f64> {
    regex
        .captures_iter(text)
        .find_map(|caps| standalone_value(text, caps.get(1)).and_then(accept))
}

fn is_waist_label(label: &str) -> bool {
    label.starts_with("cint") || label.starts_with("waist")
}

fn value_of(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| normalize(m.as_str()))
}

// A capture glued to further digits ("1234", "7,555") is part of a longer
// number and must not be read on its own.
fn standalone_value(text: &str, capture: Option<Match<'_>>) -> Option<f64> {
    let capture = capture?;
    let before = text[..capture.start()].chars().next_back();
    let after = text[capture.end()..].chars().next();
    if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    normalize(capture.as_str())
}
