use std::io::Write;
use std::path::Path;

use crate::payload::{AnalysisPayload, StockInfo};
use crate::profile::histogram::Histogram;
use crate::stats::Statistics;
use finstock_common::{FinstockError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub stock_info: StockInfo,
    pub statistics: Statistics,
    pub histogram: Option<Histogram>, // None when there are no returns
}

impl AnalysisReport {
    pub fn new(payload: &AnalysisPayload, histogram: Option<Histogram>) -> Result<Self> {
        Ok(Self {
            stock_info: payload.stock_info.clone(),
            statistics: match payload.statistics_or_computed() {
                Ok(s) => s,
                Err(FinstockError::EmptySeries(_)) => Statistics::default(),
                Err(e) => return Err(e),
            },
            histogram,
        })
    }
}

fn opt(v: Option<f64>, suffix: &str) -> String {
    v.map_or("-".into(), |x| format!("{x:.2}{suffix}"))
}

/// `{symbol}.{ext}` with anything outside `[A-Za-z0-9._-]` replaced, so a
/// symbol such as `BRK/B` cannot escape the export directory.
pub fn report_file_name(symbol: &str, ext: &str) -> String {
    let stem: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let stem = if stem.trim_matches('.').is_empty() { "report".to_string() } else { stem };
    format!("{stem}.{ext}")
}

// --- headless summary output ---

pub fn print_summary(report: &AnalysisReport) {
    let info = &report.stock_info;
    let s = &report.statistics;
    println!("{:<20} {} ({})", "Symbol:", info.symbol, info.display_name());
    println!("{:<20} {}", "Price:", opt(info.current_price, ""));
    println!(
        "{:<20} {} .. {}",
        "Period:",
        s.start_date.as_deref().unwrap_or("-"),
        s.end_date.as_deref().unwrap_or("-")
    );
    println!("{:<20} {}", "Mean close:", opt(s.mean, ""));
    println!("{:<20} {}", "Std deviation:", opt(s.std_deviation, ""));
    println!("{:<20} {}", "Mean daily return:", opt(s.mean_daily_return_percent, "%"));
    println!("{:<20} {}", "P(up day):", opt(s.probability_next_day_up, "%"));
    println!("{:<20} {}", "P(down day):", opt(s.probability_next_day_down, "%"));
    match &report.histogram {
        Some(h) => println!("{:<20} {} bins over {} days", "Return histogram:", h.bins.len(), h.sample_count),
        None => println!("{:<20} no data", "Return histogram:"),
    }
}

// --- JSON export ---

pub fn export_json(output_path: &Path, report: &AnalysisReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    tracing::info!(path = %output_path.display(), "exported JSON report");
    Ok(())
}

// --- CSV export ---

pub fn export_csv(output_path: &Path, histogram: &Histogram) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "range_start,range_end,count,label")?;
    for (bin, label) in histogram.bins.iter().zip(&histogram.labels) {
        writeln!(file, "{},{},{},{}", bin.range_start, bin.range_end, bin.count, label)?;
    }
    tracing::info!(path = %output_path.display(), bins = histogram.bins.len(), "exported CSV histogram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_plain_symbols() {
        assert_eq!(report_file_name("RELIANCE.NS", "json"), "RELIANCE.NS.json");
        assert_eq!(report_file_name("^NSEI", "csv"), "_NSEI.csv");
    }

    #[test]
    fn file_name_cannot_leave_directory() {
        assert_eq!(report_file_name("BRK/B", "json"), "BRK_B.json");
        assert_eq!(report_file_name("..", "json"), "report.json");
        assert_eq!(report_file_name("", "csv"), "report.csv");
        assert!(!report_file_name("../../etc/x", "json").contains('/'));
    }
}
