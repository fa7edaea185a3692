use crate::profile::histogram::{histogram_for_config, Histogram};
use crate::returns::ReturnSeries;
use crate::stats::PricePoint;
use finstock_common::{HistogramConfig, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinRange {
    pub start: f64,
    pub end: f64,
}

/// Bar-chart input: parallel labels, counts and tooltip ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramChartData {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    pub tooltip_ranges: Vec<BinRange>,
}

impl From<&Histogram> for HistogramChartData {
    fn from(h: &Histogram) -> Self {
        Self {
            labels: h.labels.clone(),
            counts: h.counts(),
            tooltip_ranges: h
                .bins
                .iter()
                .map(|b| BinRange { start: b.range_start, end: b.range_end })
                .collect(),
        }
    }
}

impl HistogramChartData {
    pub fn tooltip(&self, i: usize) -> Option<String> {
        let r = self.tooltip_ranges.get(i)?;
        let c = self.counts.get(i)?;
        Some(format!("Range: {:.2}% to {:.2}% | Frequency: {}", r.start, r.end, c))
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnDistribution {
    NoData,
    Ready(HistogramChartData),
}

impl ReturnDistribution {
    /// Empty series short-circuits to `NoData` without binning.
    pub fn from_series(series: &ReturnSeries, cfg: &HistogramConfig) -> Result<Self> {
        Ok(match histogram_for_config(series, cfg)? {
            Some(h) => Self::Ready(HistogramChartData::from(&h)),
            None => Self::NoData,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChartData {
    pub labels: Vec<String>,
    pub closes: Vec<f64>,
}

impl PriceChartData {
    pub fn from_points(points: &[PricePoint]) -> Self {
        let (labels, closes) = points
            .iter()
            .filter(|p| p.close.is_finite())
            .map(|p| (p.date.clone(), p.close))
            .unzip();
        Self { labels, closes }
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.closes.iter().enumerate().map(|(i, &c)| (i as f64, c)).collect()
    }

    /// Close range padded by 5% on each side; flat series get a unit pad.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        let lo = self.closes.iter().copied().reduce(f64::min)?;
        let hi = self.closes.iter().copied().reduce(f64::max)?;
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
        Some([lo - pad, hi + pad])
    }
}

/// A live render object bound to one canvas.
pub trait ChartHandle {
    fn dispose(&mut self);
}

/// Owns at most one active chart handle. The previous handle is disposed
/// before the replacement is built.
#[derive(Debug)]
pub struct ChartSlot<H: ChartHandle> {
    name: &'static str,
    active: Option<H>,
    generation: u64,
}

impl<H: ChartHandle> ChartSlot<H> {
    pub fn new(name: &'static str) -> Self {
        Self { name, active: None, generation: 0 }
    }

    pub fn replace<F>(&mut self, build: F) -> &mut H
    where
        F: FnOnce() -> H,
    {
        self.clear();
        self.generation += 1;
        tracing::debug!(slot = self.name, generation = self.generation, "creating chart");
        self.active.insert(build())
    }

    pub fn clear(&mut self) {
        if let Some(mut old) = self.active.take() {
            tracing::debug!(slot = self.name, generation = self.generation, "disposing chart");
            old.dispose();
        }
    }

    pub fn get(&self) -> Option<&H> {
        self.active.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut H> {
        self.active.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<H: ChartHandle> Drop for ChartSlot<H> {
    fn drop(&mut self) {
        self.clear();
    }
}
