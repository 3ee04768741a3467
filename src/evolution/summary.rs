use crate::evolution::{EvolutionReport, MetricDelta, MetricKind};

/// Flattens a report into one line per metric, the shape the feedback
/// drafting service expects as its prompt context.
pub fn summarize_report(report: &EvolutionReport) -> String {
    let mut lines = Vec::with_capacity(report.metrics.len() + 1);
    if !report.has_previous {
        lines.push("First check-in: no previous check-in to compare against.".to_string());
    }
    for metric in &report.metrics {
        lines.push(describe(metric, report.has_previous));
    }
    lines.join("\n")
}

fn describe(metric: &MetricDelta, has_previous: bool) -> String {
    let unit = metric.metric.unit();
    let current = format_value(metric.current_value, unit);
    let comparable = has_previous || metric.metric.kind() == MetricKind::Anthropometric;
    if !comparable || metric.previous_value.is_none() {
        return format!("{}: {current}", metric.metric);
    }
    let previous = format_value(metric.previous_value, unit);
    match metric.delta {
        Some(delta) => format!("{}: {previous} → {current} ({delta:+.1})", metric.metric),
        None => format!("{}: {previous} → {current}", metric.metric),
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{v:.1}"),
        Some(v) if unit == "%" => format!("{v:.1}%"),
        Some(v) => format!("{v:.1} {unit}"),
        None => "-".to_string(),
    }
}
