/// Parses locale-ambiguous numeric text ("77,5", "96cm", "85%") into a float.
///
/// Everything except digits, commas and points is dropped. When both a comma
/// and a point survive, the point is the decimal separator and commas are
/// treated as grouping noise; a lone comma is read as the decimal separator.
pub fn normalize(token: &str) -> Option<f64> {
    let kept: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let sanitized = if kept.contains('.') {
        kept.replace(',', "")
    } else {
        kept.replace(',', ".")
    };
    sanitized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalizes a score-like field, where "not recorded" counts as zero.
pub fn normalize_or_zero(token: Option<&str>) -> f64 {
    token.and_then(normalize).unwrap_or(0.0)
}

/// Rounds to one decimal place, the precision every delta is reported in.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
