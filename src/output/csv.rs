use anyhow::Result;

use crate::evolution::history::TimelineEntry;
use crate::evolution::EvolutionReport;
use crate::measurements::MeasurementPair;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

pub fn pairs_to_csv(rows: &[(String, MeasurementPair)]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["text", "waist_cm", "hip_cm"])?;
    for (text, pair) in rows {
        writer.write_record([text.clone(), cell(pair.waist), cell(pair.hip)])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn evolution_to_csv(report: &EvolutionReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["metric", "previous", "current", "delta", "trend"])?;
    for metric in &report.metrics {
        writer.write_record([
            metric.metric.as_slug().to_string(),
            cell(metric.previous_value),
            cell(metric.current_value),
            cell(metric.delta),
            format!("{:?}", metric.trend()).to_lowercase(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Long format: one row per check-in and metric.
pub fn timeline_to_csv(timeline: &[TimelineEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["index", "date", "metric", "previous", "current", "delta"])?;
    for entry in timeline {
        let date = entry.date.map(|d| d.to_string()).unwrap_or_default();
        for metric in &entry.report.metrics {
            writer.write_record([
                entry.index.to_string(),
                date.clone(),
                metric.metric.as_slug().to_string(),
                cell(metric.previous_value),
                cell(metric.current_value),
                cell(metric.delta),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
