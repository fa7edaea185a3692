use crate::profile::numeric::describe;
use crate::returns::daily_returns_from_closes;
use finstock_common::{FinstockError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String, // YYYY-MM-DD
    pub close: f64,
}

/// Summary statistics block of an analysis. Percentile keys keep the
/// backend's numeric-prefixed names on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<f64>,
    pub std_deviation: Option<f64>,
    pub variance: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub range: Option<f64>,
    pub iqr: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(rename = "25_percentile")]
    pub percentile_25: Option<f64>,
    #[serde(rename = "50_percentile")]
    pub percentile_50: Option<f64>,
    #[serde(rename = "75_percentile")]
    pub percentile_75: Option<f64>,
    pub coeff_of_variation: Option<f64>,
    pub probability_next_day_up: Option<f64>,
    pub probability_next_day_down: Option<f64>,
    pub mean_daily_return_percent: Option<f64>,
    pub std_dev_daily_return_percent: Option<f64>,
    pub cond_prob_up_given_up: Option<f64>,
    pub cond_prob_down_given_down: Option<f64>,
    pub prob_2_days_up_streak: Option<f64>,
    pub prob_2_days_down_streak: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnProbabilities {
    pub prob_down_day: Option<f64>,
    pub cond_prob_up_given_up: Option<f64>,
    pub cond_prob_down_given_down: Option<f64>,
    pub prob_2_days_up_streak: Option<f64>,
    pub prob_2_days_down_streak: Option<f64>,
}

fn pct(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64 * 100.0
    }
}

/// Day-over-day probabilities from fractional returns, in percent.
pub fn return_probabilities(returns: &[f64]) -> ReturnProbabilities {
    if returns.len() < 2 {
        return ReturnProbabilities::default();
    }
    let (mut up_up, mut down_down, mut was_up, mut was_down) = (0, 0, 0, 0);
    for w in returns.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        if prev > 0.0 {
            was_up += 1;
            if cur > 0.0 {
                up_up += 1;
            }
        }
        if prev < 0.0 {
            was_down += 1;
            if cur < 0.0 {
                down_down += 1;
            }
        }
    }
    let pairs = returns.len() - 1;
    let downs = returns.iter().filter(|&&r| r < 0.0).count();
    ReturnProbabilities {
        prob_down_day: Some(pct(downs, returns.len())),
        cond_prob_up_given_up: Some(pct(up_up, was_up)),
        cond_prob_down_given_down: Some(pct(down_down, was_down)),
        prob_2_days_up_streak: Some(pct(up_up, pairs)),
        prob_2_days_down_streak: Some(pct(down_down, pairs)),
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Statistics over closing prices plus the percent daily returns used by
/// the histogram. Rows with a non-finite close are dropped first.
pub fn calculate_statistics(points: &[PricePoint]) -> Result<(Statistics, Vec<f64>)> {
    let clean: Vec<&PricePoint> = points.iter().filter(|p| p.close.is_finite()).collect();
    if clean.len() < points.len() {
        tracing::warn!(dropped = points.len() - clean.len(), "dropped non-finite closes");
    }
    let closes: Vec<f64> = clean.iter().map(|p| p.close).collect();
    let Some(profile) = describe(&closes) else {
        return Err(FinstockError::EmptySeries("historical closes"));
    };
    let start_date = clean.iter().map(|p| p.date.as_str()).min().map(str::to_owned);
    let end_date = clean.iter().map(|p| p.date.as_str()).max().map(str::to_owned);

    let fractional: Vec<f64> = closes
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| !r.is_nan()) // 0 -> 0 is no change; 0 -> x>0 stays as +inf, an up day
        .collect();
    let ret_profile = describe(&fractional);
    let probs = return_probabilities(&fractional);
    let prob_up = if fractional.is_empty() {
        0.0
    } else {
        pct(fractional.iter().filter(|&&r| r > 0.0).count(), fractional.len())
    };

    let stats = Statistics {
        start_date,
        end_date,
        mean: finite(Some(profile.mean)),
        median: finite(Some(profile.median)),
        mode: finite(Some(profile.mode)),
        std_deviation: finite(profile.stddev),
        variance: finite(profile.variance),
        skewness: finite(profile.skewness),
        kurtosis: finite(profile.kurtosis),
        range: finite(Some(profile.range())),
        iqr: finite(Some(profile.iqr())),
        min: finite(Some(profile.min)),
        max: finite(Some(profile.max)),
        percentile_25: finite(Some(profile.p25)),
        percentile_50: finite(Some(profile.p50)),
        percentile_75: finite(Some(profile.p75)),
        coeff_of_variation: finite(Some(profile.coeff_of_variation())),
        probability_next_day_up: Some(prob_up),
        probability_next_day_down: finite(probs.prob_down_day),
        mean_daily_return_percent: finite(Some(ret_profile.as_ref().map_or(0.0, |r| r.mean * 100.0))),
        std_dev_daily_return_percent: finite(
            ret_profile.as_ref().map_or(Some(0.0), |r| r.stddev.map(|s| s * 100.0)),
        ),
        cond_prob_up_given_up: finite(probs.cond_prob_up_given_up),
        cond_prob_down_given_down: finite(probs.cond_prob_down_given_down),
        prob_2_days_up_streak: finite(probs.prob_2_days_up_streak),
        prob_2_days_down_streak: finite(probs.prob_2_days_down_streak),
    };
    Ok((stats, daily_returns_from_closes(&closes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint { date: format!("2024-01-{:02}", i + 1), close: c })
            .collect()
    }

    #[test]
    fn probabilities_need_two_returns() {
        assert_eq!(return_probabilities(&[0.01]), ReturnProbabilities::default());
    }

    #[test]
    fn streak_probabilities() {
        // pairs: (+,+) (+,-) (-,-) (-,+)
        let p = return_probabilities(&[0.01, 0.02, -0.01, -0.02, 0.03]);
        assert_eq!(p.prob_down_day, Some(40.0));
        assert_eq!(p.cond_prob_up_given_up, Some(50.0));
        assert_eq!(p.cond_prob_down_given_down, Some(50.0));
        assert_eq!(p.prob_2_days_up_streak, Some(25.0));
        assert_eq!(p.prob_2_days_down_streak, Some(25.0));
    }

    #[test]
    fn conditional_without_condition_is_zero() {
        let p = return_probabilities(&[0.01, 0.02, 0.03]);
        assert_eq!(p.cond_prob_down_given_down, Some(0.0));
        assert_eq!(p.cond_prob_up_given_up, Some(100.0));
    }

    #[test]
    fn statistics_from_closes() {
        let (s, returns) = calculate_statistics(&pts(&[100.0, 110.0, 99.0, 99.0])).unwrap();
        assert_eq!(s.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(s.end_date.as_deref(), Some("2024-01-04"));
        assert_eq!(s.min, Some(99.0));
        assert_eq!(s.max, Some(110.0));
        assert_eq!(s.mode, Some(99.0));
        assert_eq!(returns, vec![10.0, -10.0, 0.0]);
        let up = s.probability_next_day_up.unwrap();
        assert!((up - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_closes_dropped() {
        let (s, returns) = calculate_statistics(&pts(&[10.0, f64::NAN, 20.0])).unwrap();
        assert_eq!(s.mean, Some(15.0));
        assert_eq!(returns, vec![100.0]);
    }

    #[test]
    fn rise_from_zero_close_counts_as_up_day() {
        // returns: +inf, +1.0, -0.5 and a 0 -> 0 step that is dropped
        let (s, returns) = calculate_statistics(&pts(&[0.0, 0.0, 1.0, 2.0, 1.0])).unwrap();
        let up = s.probability_next_day_up.unwrap();
        assert!((up - 200.0 / 3.0).abs() < 1e-9);
        let down = s.probability_next_day_down.unwrap();
        assert!((down - 100.0 / 3.0).abs() < 1e-9);
        assert!(s.mean_daily_return_percent.is_none());
        assert_eq!(returns, vec![100.0, -50.0]);
    }

    #[test]
    fn single_close_has_undefined_spread() {
        let (s, returns) = calculate_statistics(&pts(&[42.0])).unwrap();
        assert!(s.std_deviation.is_none());
        assert!(s.probability_next_day_down.is_none());
        assert_eq!(s.probability_next_day_up, Some(0.0));
        assert!(returns.is_empty());
    }

    #[test]
    fn no_closes_is_no_data() {
        let err = calculate_statistics(&[]).unwrap_err();
        assert!(matches!(err, FinstockError::EmptySeries(_)));
    }

    #[test]
    fn percentile_keys_on_the_wire() {
        let s = Statistics { percentile_25: Some(1.0), ..Default::default() };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["25_percentile"], 1.0);
        let back: Statistics = serde_json::from_str(r#"{"75_percentile": 3.5}"#).unwrap();
        assert_eq!(back.percentile_75, Some(3.5));
    }
}
