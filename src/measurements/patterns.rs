//! Compiled patterns for mining waist/hip values out of staff notes.
//!
//! Notes mix Portuguese and English labels, optional "cm" units, comma or
//! point decimals and several delimiter styles. Every value capture uses
//! [`NUM`], so a candidate is always a 2-3 digit number with an optional
//! one- or two-digit fraction.

use once_cell::sync::Lazy;
use regex::Regex;

const NUM: &str = r"(\d{2,3}(?:[.,]\d{1,2})?)";
const UNIT: &str = r"(?:\s*cm)?";
const WAIST: &str = r"(?:cintura|waist)";
const HIP: &str = r"(?:quadri[ls]|hips?)";
const WAIST_SYNONYM: &str = r"(?:abaixo\s+d[ao]s?\s+costelas|below\s+the\s+ribs)";
const HIP_SYNONYM: &str = r"(?:gl[uú]teos?|glutes?)";
const ANY_LABEL: &str = r"(cintura|waist|quadri[ls]|hips?|gl[uú]teos?|glutes?)";
// A label must end at a word boundary unless a number is glued straight to
// it ("cintura74"), so "hip" never matches inside "hipotireoidismo".
const LABEL_SEP: &str = r"(?:\b\s*[:=\-–]?\s*)?";
const PAIR_SEP: &str = r"\s*(?:,|;|/|\be\b|\band\b)\s*";
// Punctuation, line start or a conjunction must precede a number that sits
// before its label, otherwise "Peso 70 cintura 80" would yield 70.
const LEAD: &str = r"(?:^|[,;:(/|\-–]|\be\b|\band\b)\s*";
const FILLER: &str = r"(?:\b[^\d\n]{0,24}?)?";

/// Which capture group holds the waist value in a [`PairPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseOrder {
    WaistFirst,
    HipFirst,
}

#[derive(Debug)]
pub struct PairPattern {
    pub name: &'static str,
    pub order: ClauseOrder,
    pub regex: Regex,
}

#[derive(Debug)]
pub struct LabelPattern {
    pub name: &'static str,
    pub regex: Regex,
}

/// Sentences naming both circumferences, in priority order.
pub static PAIR_PATTERNS: Lazy<Vec<PairPattern>> = Lazy::new(|| {
    vec![
        PairPattern {
            name: "waist_then_hip_separated",
            order: ClauseOrder::WaistFirst,
            regex: compile(&format!(
                r"(?i)\b{WAIST}{LABEL_SEP}{NUM}{UNIT}{PAIR_SEP}{HIP}{LABEL_SEP}{NUM}"
            )),
        },
        PairPattern {
            name: "waist_then_hip_adjacent",
            order: ClauseOrder::WaistFirst,
            regex: compile(&format!(
                r"(?i)\b{WAIST}{LABEL_SEP}{NUM}{UNIT}\s*{HIP}{LABEL_SEP}{NUM}"
            )),
        },
        PairPattern {
            name: "waist_then_hip_free_form",
            order: ClauseOrder::WaistFirst,
            regex: compile(&format!(
                r"(?is)\b{WAIST}{LABEL_SEP}{NUM}.*?\b{HIP}{LABEL_SEP}{NUM}"
            )),
        },
        PairPattern {
            name: "hip_then_waist_free_form",
            order: ClauseOrder::HipFirst,
            regex: compile(&format!(
                r"(?is)\b{HIP}{LABEL_SEP}{NUM}.*?\b{WAIST}{LABEL_SEP}{NUM}"
            )),
        },
    ]
});

/// One "2- 93 quadril" item of an enumerated worksheet dump.
pub static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?im)(?:^|[\s,;])\d{{1,2}}\s*[-.)–]\s*{NUM}{UNIT}\s*(?:de\s+|of\s+)?{ANY_LABEL}\b"
    ))
});

pub static WAIST_PATTERNS: Lazy<Vec<LabelPattern>> = Lazy::new(|| {
    label_patterns(WAIST, WAIST_SYNONYM)
});

pub static HIP_PATTERNS: Lazy<Vec<LabelPattern>> = Lazy::new(|| label_patterns(HIP, HIP_SYNONYM));

pub static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"\d+(?:[.,]\d+)?"));

/// Two bare numbers next to each other, with at most a unit or a short
/// filler word between them ("97 63", "97cm e 63cm").
pub static ADJACENT_PAIR: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?i){NUM}{UNIT}[^\d]{{0,12}}?{NUM}")));

/// Words that hint at a circumference without naming it.
pub static WAIST_HINT: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:barriga|abd[oô]men|umbigo|belly|tummy)\b"));

pub static HIP_HINT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\b(?:bumbum|culote|butt)\b"));

fn label_patterns(label: &str, synonym: &str) -> Vec<LabelPattern> {
    vec![
        LabelPattern {
            name: "number_before_label",
            regex: compile(&format!(
                r"(?im){LEAD}{NUM}{UNIT}\s*(?:de\s+|of\s+)?\b{label}\b"
            )),
        },
        LabelPattern {
            name: "label_colon_number",
            regex: compile(&format!(r"(?i)\b{label}\s*(?:\([^)]*\))?\s*:\s*{NUM}")),
        },
        LabelPattern {
            name: "label_number",
            regex: compile(&format!(r"(?i)\b{label}{FILLER}{NUM}")),
        },
        LabelPattern {
            name: "synonym_number",
            regex: compile(&format!(r"(?i)\b{synonym}{FILLER}{NUM}")),
        },
        LabelPattern {
            name: "number_synonym",
            regex: compile(&format!(r"(?i){NUM}{UNIT}\s*(?:de\s+|of\s+)?\b{synonym}\b")),
        },
    ]
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid measurement pattern")
}

#[cfg(test)]
mod tests {
    use super::{
        ClauseOrder, ADJACENT_PAIR, HIP_PATTERNS, NUMBERED_ITEM, PAIR_PATTERNS, WAIST_PATTERNS,
    };

    #[test]
    fn all_patterns_compile() {
        assert_eq!(PAIR_PATTERNS.len(), 4);
        assert_eq!(WAIST_PATTERNS.len(), 5);
        assert_eq!(HIP_PATTERNS.len(), 5);
        assert!(NUMBERED_ITEM.is_match("1- 76 cintura"));
        assert!(ADJACENT_PAIR.is_match("97 63"));
    }

    #[test]
    fn pair_patterns_keep_priority_order() {
        let names: Vec<_> = PAIR_PATTERNS.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "waist_then_hip_separated",
                "waist_then_hip_adjacent",
                "waist_then_hip_free_form",
                "hip_then_waist_free_form",
            ]
        );
        assert_eq!(PAIR_PATTERNS[3].order, ClauseOrder::HipFirst);
    }

    #[test]
    fn numbered_items_capture_value_and_label() {
        let items: Vec<(String, String)> = NUMBERED_ITEM
            .captures_iter("1- 76 cintura, 2- 93 quadril")
            .map(|c| (c[1].to_string(), c[2].to_lowercase()))
            .collect();
        assert_eq!(
            items,
            vec![
                ("76".to_string(), "cintura".to_string()),
                ("93".to_string(), "quadril".to_string()),
            ]
        );
    }

    #[test]
    fn number_before_label_needs_a_lead() {
        let number_before = &WAIST_PATTERNS[0].regex;
        assert!(number_before.is_match("76 cintura"));
        assert!(number_before.is_match("medidas: 76cm de cintura"));
        assert!(!number_before.is_match("Peso 70 cintura 80"));
    }

    #[test]
    fn labels_do_not_match_inside_longer_words() {
        let hip_after_label = &HIP_PATTERNS[2].regex;
        assert!(!hip_after_label.is_match("hipotireoidismo, toma 100"));
        assert!(!hip_after_label.is_match("hipertensa 120"));
        assert!(hip_after_label.is_match("hip 98"));
        assert!(hip_after_label.is_match("quadril102"));
        assert!(!HIP_PATTERNS[0].regex.is_match("- 80 hipertensa"));
        assert!(!NUMBERED_ITEM.is_match("1- 80 hipertensa"));
    }
}
