use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::evolution::history::TimelineEntry;
use crate::evolution::{ComparisonSource, EvolutionReport, MetricDelta, MetricKey, Trend};
use crate::measurements::MeasurementPair;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_pairs_table(rows: &[(String, MeasurementPair)]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Text", "Waist (cm)", "Hip (cm)", "Waist/Hip"]);
    for (text, pair) in rows {
        table.add_row(vec![
            text.clone(),
            format_number(pair.waist),
            format_number(pair.hip),
            pair.waist_to_hip_ratio()
                .map(|r| format!("{r:.2}"))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.to_string()
}

pub fn render_evolution_table(report: &EvolutionReport) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Previous", "Current", "Change", "Trend"]);
    for metric in &report.metrics {
        table.add_row(Row::from(vec![
            Cell::new(metric.metric.to_string()),
            Cell::new(format_number(metric.previous_value)),
            Cell::new(format_number(metric.current_value)),
            Cell::new(format_delta(metric)),
            trend_cell(metric.trend()),
        ]));
    }
    table.to_string()
}

pub fn render_timeline_table(timeline: &[TimelineEntry]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "#",
        "Date",
        "Compared To",
        "Weight",
        "Waist",
        "Hip",
        "Improved",
        "Worsened",
    ]);
    for entry in timeline {
        let report = &entry.report;
        table.add_row(vec![
            (entry.index + 1).to_string(),
            entry
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            source_label(report.source).to_string(),
            metric_cell(report, MetricKey::Weight),
            metric_cell(report, MetricKey::Waist),
            metric_cell(report, MetricKey::Hip),
            report.improved_count().to_string(),
            report.worsened_count().to_string(),
        ]);
    }
    table.to_string()
}

fn metric_cell(report: &EvolutionReport, key: MetricKey) -> String {
    match report.metric(key) {
        Some(metric) => match (metric.current_value, metric.delta) {
            (Some(current), Some(delta)) => format!("{current:.1} ({delta:+.1})"),
            (Some(current), None) => format!("{current:.1}"),
            _ => "-".to_string(),
        },
        None => "-".to_string(),
    }
}

fn format_number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

fn format_delta(metric: &MetricDelta) -> String {
    metric
        .delta
        .map(|d| format!("{d:+.1}"))
        .unwrap_or_else(|| "-".to_string())
}

fn trend_cell(trend: Trend) -> Cell {
    match trend {
        Trend::Improved => Cell::new("IMPROVED").fg(Color::Green),
        Trend::Worsened => Cell::new("WORSENED").fg(Color::Red),
        Trend::Unchanged => Cell::new("="),
        Trend::Unknown => Cell::new("-"),
    }
}

pub fn source_label(source: ComparisonSource) -> &'static str {
    match source {
        ComparisonSource::NoHistory => "none",
        ComparisonSource::Baseline => "baseline",
        ComparisonSource::PriorSnapshot => "previous check-in",
    }
}
