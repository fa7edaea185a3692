use serde::{Deserialize, Serialize};

/// Descriptive statistics over a price column. Moments follow the
/// sample (n - 1) conventions; a value is `None` when the sample is too
/// small for it to be defined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericProfile {
    pub count: u64,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub stddev: Option<f64>,
    pub variance: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl NumericProfile {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }

    pub fn coeff_of_variation(&self) -> f64 {
        match self.stddev {
            Some(sd) if self.mean != 0.0 => sd / self.mean * 100.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct NumericAccumulator {
    values: Vec<f64>,
    sum: f64,
}

impl NumericAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite values are skipped.
    pub fn add(&mut self, v: f64) {
        if v.is_finite() {
            self.values.push(v);
            self.sum += v;
        }
    }

    pub fn finish(mut self) -> Option<NumericProfile> {
        if self.values.is_empty() {
            return None;
        }
        self.values.sort_by(f64::total_cmp);
        let v = &self.values;
        let n = v.len() as f64;
        let mean = self.sum / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in v {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let variance = (v.len() >= 2).then(|| m2 / (n - 1.0));
        let skewness = (v.len() >= 3).then(|| {
            if m2 == 0.0 {
                0.0
            } else {
                n * (n - 1.0).sqrt() / (n - 2.0) * (m3 / m2.powf(1.5))
            }
        });
        let kurtosis = (v.len() >= 4).then(|| {
            let denom = (n - 2.0) * (n - 3.0) * m2 * m2;
            if denom == 0.0 {
                0.0
            } else {
                let adj = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
                n * (n + 1.0) * (n - 1.0) * m4 / denom - adj
            }
        });
        let p50 = quantile_sorted(v, 0.5);
        Some(NumericProfile {
            count: v.len() as u64,
            mean,
            median: p50,
            mode: mode_sorted(v),
            min: v[0],
            max: v[v.len() - 1],
            p25: quantile_sorted(v, 0.25),
            p50,
            p75: quantile_sorted(v, 0.75),
            stddev: variance.map(f64::sqrt),
            variance,
            skewness,
            kurtosis,
        })
    }
}

pub fn describe(values: &[f64]) -> Option<NumericProfile> {
    let mut acc = NumericAccumulator::new();
    values.iter().for_each(|&v| acc.add(v));
    acc.finish()
}

/// Linear interpolation between the closest ranks.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// smallest of the most frequent values
fn mode_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_run {
            best_run = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}
