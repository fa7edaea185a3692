use crate::returns::ReturnSeries;
use finstock_common::{FinstockError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub range_start: f64,
    pub range_end: f64,
    pub count: u64,
}

impl HistogramBin {
    pub fn label(&self) -> String {
        format!("{:.2}%", self.range_start)
    }

    pub fn tooltip(&self) -> String {
        format!("{:.2}% to {:.2}%", self.range_start, self.range_end)
    }
}

/// Clamp bounds for the sqrt bin-count rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinPolicy {
    pub min_bins: usize,
    pub max_bins: usize,
}

impl Default for BinPolicy {
    fn default() -> Self {
        Self { min_bins: 10, max_bins: 20 }
    }
}

impl From<&finstock_common::HistogramConfig> for BinPolicy {
    fn from(cfg: &finstock_common::HistogramConfig) -> Self {
        Self { min_bins: cfg.min_bins, max_bins: cfg.max_bins }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub labels: Vec<String>,
    pub width: f64,
    pub min: f64,
    pub max: f64,
    pub sample_count: usize,
}

impl Histogram {
    pub fn counts(&self) -> Vec<u64> {
        self.bins.iter().map(|b| b.count).collect()
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// `clamp(ceil(sqrt(n) / 2), 10, 20)`
pub fn bin_count(n: usize) -> usize {
    bin_count_with(n, BinPolicy::default())
}

pub fn bin_count_with(n: usize, policy: BinPolicy) -> usize {
    let raw = ((n as f64).sqrt() / 2.0).ceil() as usize;
    raw.clamp(policy.min_bins, policy.max_bins.max(policy.min_bins))
}

pub fn build_histogram(series: &ReturnSeries) -> Result<Histogram> {
    build_histogram_with_bins(series, bin_count(series.len()))
}

pub fn build_histogram_with_policy(series: &ReturnSeries, policy: BinPolicy) -> Result<Histogram> {
    build_histogram_with_bins(series, bin_count_with(series.len(), policy))
}

pub fn build_histogram_with_bins(series: &ReturnSeries, num_bins: usize) -> Result<Histogram> {
    if num_bins == 0 {
        return Err(FinstockError::InvalidBinCount(num_bins));
    }
    let (Some(min), Some(max)) = (series.min(), series.max()) else {
        return Err(FinstockError::EmptySeries("daily returns"));
    };
    // all-identical samples: unit width, everything lands in bin 0
    let n = num_bins as f64;
    // a finite range can still overflow max - min; scale before subtracting
    let overflow = !(max - min).is_finite();
    let width = if max <= min {
        1.0
    } else if overflow {
        max / n - min / n
    } else {
        (max - min) / n
    };
    let offset = |r: f64| if overflow { r / width - min / width } else { (r - min) / width };
    let last = num_bins - 1;
    let mut counts = vec![0u64; num_bins];
    for &r in series.as_slice() {
        let idx = if r == max && max > min {
            last
        } else {
            (offset(r).floor().max(0.0) as usize).min(last)
        };
        counts[idx] += 1;
    }
    let bins: Vec<HistogramBin> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| HistogramBin {
            range_start: if i == 0 { min } else { min + i as f64 * width },
            range_end: if i == last { max } else { min + (i + 1) as f64 * width },
            count: c,
        })
        .collect();
    let labels = bins.iter().map(HistogramBin::label).collect();
    tracing::debug!(samples = series.len(), num_bins, width, min, max, "built return histogram");
    Ok(Histogram { bins, labels, width, min, max, sample_count: series.len() })
}

/// Binning as configured: a fixed bin count when set, otherwise the clamped
/// sqrt rule. Empty series yield `None` (no data) instead of an error.
pub fn histogram_for_config(
    series: &ReturnSeries,
    cfg: &finstock_common::HistogramConfig,
) -> Result<Option<Histogram>> {
    if series.is_empty() {
        return Ok(None);
    }
    let h = match cfg.fixed_bins {
        Some(n) => build_histogram_with_bins(series, n)?,
        None => build_histogram_with_policy(series, BinPolicy::from(cfg))?,
    };
    Ok(Some(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(v: &[f64]) -> ReturnSeries {
        ReturnSeries::new(v.to_vec()).unwrap()
    }

    #[test]
    fn bin_count_lower_clamp() {
        assert_eq!(bin_count(4), 10);
        assert_eq!(bin_count(1), 10);
    }

    #[test]
    fn bin_count_upper_clamp() {
        assert_eq!(bin_count(10_000), 20);
    }

    #[test]
    fn bin_count_exact_at_400() {
        assert_eq!(bin_count(400), 10);
    }

    #[test]
    fn bin_count_mid_range() {
        // sqrt(900)/2 = 15
        assert_eq!(bin_count(900), 15);
        // sqrt(1000)/2 = 15.8 -> 16
        assert_eq!(bin_count(1000), 16);
    }

    #[test]
    fn bin_count_custom_policy() {
        let p = BinPolicy { min_bins: 5, max_bins: 8 };
        assert_eq!(bin_count_with(4, p), 5);
        assert_eq!(bin_count_with(10_000, p), 8);
    }

    #[test]
    fn degenerate_range() {
        let h = build_histogram(&series(&[2.0, 2.0, 2.0])).unwrap();
        assert_eq!(h.bins.len(), 10);
        assert_eq!(h.width, 1.0);
        assert_eq!(h.bins[0].count, 3);
        assert!(h.bins[1..].iter().all(|b| b.count == 0));
        assert!(h.is_degenerate());
        assert_eq!(h.bins[0].range_start, 2.0);
        assert_eq!(h.bins[9].range_end, 2.0);
    }

    #[test]
    fn single_sample_is_degenerate() {
        let h = build_histogram(&series(&[-0.75])).unwrap();
        assert_eq!(h.bins[0].count, 1);
        assert_eq!(h.counts().iter().sum::<u64>(), 1);
    }

    #[test]
    fn max_lands_in_last_bin() {
        let h = build_histogram_with_bins(&series(&[-1.0, 0.0, 1.0, 2.0, 3.0]), 10).unwrap();
        assert_eq!(h.bins.len(), 10);
        assert_eq!(h.bins[9].count, 1);
        assert_eq!(h.bins[9].range_end, 3.0);
        assert_eq!(h.bins[0].range_start, -1.0);
        assert_eq!(h.counts().iter().sum::<u64>(), 5);
    }

    #[test]
    fn floating_point_max_not_dropped() {
        // 0.3 / width is not exactly 3.0 in binary floating point
        let h = build_histogram_with_bins(&series(&[0.0, 0.1, 0.2, 0.3]), 3).unwrap();
        assert_eq!(h.bins[2].range_end, 0.3);
        assert_eq!(h.counts().iter().sum::<u64>(), 4);
        assert!(h.bins[2].count >= 1);
    }

    #[test]
    fn bins_are_contiguous() {
        let v: Vec<f64> = (0..250).map(|i| ((i * 37) % 101) as f64 / 10.0 - 5.0).collect();
        let h = build_histogram(&series(&v)).unwrap();
        for pair in h.bins.windows(2) {
            assert!(pair[0].range_start <= pair[0].range_end);
            assert!(pair[0].range_end <= pair[1].range_start + 1e-12);
        }
        assert_eq!(h.counts().iter().sum::<u64>(), 250);
    }

    #[test]
    fn labels_use_start_with_two_decimals() {
        let h = build_histogram_with_bins(&series(&[-1.0, 3.0]), 10).unwrap();
        assert_eq!(h.labels[0], "-1.00%");
        assert_eq!(h.labels[1], "-0.60%");
        assert_eq!(h.bins[0].tooltip(), "-1.00% to -0.60%");
    }

    #[test]
    fn zero_bins_rejected() {
        let err = build_histogram_with_bins(&series(&[1.0]), 0).unwrap_err();
        assert!(matches!(err, FinstockError::InvalidBinCount(0)));
    }

    #[test]
    fn configured_fixed_bins() {
        let cfg = finstock_common::HistogramConfig { fixed_bins: Some(4), ..Default::default() };
        let h = histogram_for_config(&series(&[0.0, 1.0, 2.0]), &cfg).unwrap().unwrap();
        assert_eq!(h.bins.len(), 4);
        let none = histogram_for_config(&ReturnSeries::default(), &cfg).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = build_histogram(&ReturnSeries::default()).unwrap_err();
        assert!(matches!(err, FinstockError::EmptySeries(_)));
    }

    #[test]
    fn range_wider_than_f64_max() {
        let h = build_histogram_with_bins(&series(&[-1e308, 0.0, 1e308]), 10).unwrap();
        assert!(h.width.is_finite());
        assert_eq!(h.bins[0].range_start, -1e308);
        assert_eq!(h.bins[9].range_end, 1e308);
        assert!(h.bins.iter().all(|b| b.range_start.is_finite() && b.range_end.is_finite()));
        let counts = h.counts();
        assert_eq!(counts.iter().sum::<u64>(), 3);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[9], 1);
        // 0.0 sits at the midpoint, within rounding of the bin 4/5 boundary
        assert_eq!(counts[4] + counts[5], 1);
    }
}
