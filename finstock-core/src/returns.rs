use finstock_common::{FinstockError, Result};
use serde::{Deserialize, Serialize};

/// Ordered daily returns in percent. Every value is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FinstockError::NonFiniteReturn { index, value });
        }
        Ok(Self { values })
    }

    /// `null` entries from a JSON array are rejected, not skipped.
    pub fn from_optional(values: Vec<Option<f64>>) -> Result<Self> {
        let mut out = Vec::with_capacity(values.len());
        for (index, v) in values.into_iter().enumerate() {
            match v {
                Some(v) => out.push(v),
                None => {
                    return Err(FinstockError::MissingValue {
                        field: "daily_returns_histogram",
                        index,
                    })
                }
            }
        }
        Self::new(out)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

impl TryFrom<Vec<f64>> for ReturnSeries {
    type Error = FinstockError;
    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<ReturnSeries> for Vec<f64> {
    fn from(series: ReturnSeries) -> Self {
        series.values
    }
}

/// Percent change between consecutive closes, rounded to 4 decimals.
pub fn daily_returns_from_closes(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| (w[1] / w[0] - 1.0) * 100.0)
        .filter(|r| r.is_finite())
        .map(|r| (r * 10_000.0).round() / 10_000.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan_with_index() {
        let err = ReturnSeries::new(vec![0.5, f64::NAN, 1.0]).unwrap_err();
        assert!(matches!(err, FinstockError::NonFiniteReturn { index: 1, .. }));
    }

    #[test]
    fn rejects_infinity() {
        let err = ReturnSeries::new(vec![f64::NEG_INFINITY]).unwrap_err();
        assert!(matches!(err, FinstockError::NonFiniteReturn { index: 0, .. }));
    }

    #[test]
    fn rejects_null_entry() {
        let err = ReturnSeries::from_optional(vec![Some(1.0), Some(2.0), None]).unwrap_err();
        assert!(matches!(err, FinstockError::MissingValue { index: 2, .. }));
    }

    #[test]
    fn empty_is_allowed() {
        let s = ReturnSeries::new(Vec::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.min(), None);
        assert_eq!(s.max(), None);
    }

    #[test]
    fn preserves_order_and_extremes() {
        let s = ReturnSeries::new(vec![1.5, -2.0, 0.25]).unwrap();
        assert_eq!(s.as_slice(), &[1.5, -2.0, 0.25]);
        assert_eq!(s.min(), Some(-2.0));
        assert_eq!(s.max(), Some(1.5));
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let s: ReturnSeries = serde_json::from_str("[1.0, -0.5]").unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn returns_from_closes() {
        let r = daily_returns_from_closes(&[100.0, 110.0, 99.0]);
        assert_eq!(r, vec![10.0, -10.0]);
    }

    #[test]
    fn returns_from_closes_rounds_to_four_places() {
        let r = daily_returns_from_closes(&[3.0, 4.0]);
        assert_eq!(r, vec![33.3333]);
    }

    #[test]
    fn zero_close_is_dropped() {
        let r = daily_returns_from_closes(&[0.0, 5.0, 10.0]);
        assert_eq!(r, vec![100.0]);
    }

    #[test]
    fn single_close_has_no_returns() {
        assert!(daily_returns_from_closes(&[42.0]).is_empty());
    }
}
