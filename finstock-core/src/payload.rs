use crate::feed::IntradayPrediction;
use crate::returns::ReturnSeries;
use crate::stats::{calculate_statistics, PricePoint, Statistics};
use finstock_common::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub previous_close: Option<f64>,
}

impl StockInfo {
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.symbol)
    }

    /// Percent move of the current price against the previous close.
    pub fn day_change_pct(&self) -> Option<f64> {
        match (self.current_price, self.previous_close) {
            (Some(cur), Some(prev)) if prev != 0.0 => Some((cur / prev - 1.0) * 100.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermPrediction {
    pub forecast_1y: Option<f64>,
    pub recommendation: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortTermPrediction {
    pub forecast_7d_percent: Option<f64>,
    pub recommendation: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiPredictions {
    pub long_term: LongTermPrediction,
    pub short_term: ShortTermPrediction,
    pub intraday: IntradayPrediction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub source: String,
    pub headline: String,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockNewsSentiment {
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    pub overall_sentiment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketSentiment {
    pub overall_market_sentiment: String,
    pub trending_topic: String,
    #[serde(default)]
    pub key_headlines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSentiment {
    pub stock_news: StockNewsSentiment,
    pub global_market: GlobalMarketSentiment,
}

/// Full analysis response for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub stock_info: StockInfo,
    #[serde(default)]
    pub statistics: Option<Statistics>,
    #[serde(default)]
    pub ai_predictions: AiPredictions,
    #[serde(default)]
    pub news_sentiment: NewsSentiment,
    #[serde(default)]
    pub historical_data: Vec<PricePoint>,
    // raw on purpose: element nulls are rejected in `returns()`
    #[serde(default)]
    pub daily_returns_histogram: Option<Vec<Option<f64>>>,
}

impl AnalysisPayload {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let payload = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            symbol = %payload.stock_info.symbol,
            points = payload.historical_data.len(),
            "loaded analysis payload"
        );
        Ok(payload)
    }

    /// Validated daily returns. A missing array is treated as empty.
    pub fn returns(&self) -> Result<ReturnSeries> {
        match &self.daily_returns_histogram {
            Some(values) => ReturnSeries::from_optional(values.clone()),
            None => Ok(ReturnSeries::default()),
        }
    }

    pub fn price_points(&self) -> &[PricePoint] {
        &self.historical_data
    }

    /// Payload statistics, or statistics computed from the price history
    /// when the payload carries none.
    pub fn statistics_or_computed(&self) -> Result<Statistics> {
        match &self.statistics {
            Some(s) => Ok(s.clone()),
            None => calculate_statistics(&self.historical_data).map(|(s, _)| s),
        }
    }

    /// Daily returns from the payload, falling back to the price history.
    pub fn returns_or_computed(&self) -> Result<ReturnSeries> {
        let series = self.returns()?;
        if !series.is_empty() || self.historical_data.len() < 2 {
            return Ok(series);
        }
        let (_, computed) = calculate_statistics(&self.historical_data)?;
        ReturnSeries::new(computed)
    }

    pub fn apply_intraday(&mut self, update: IntradayPrediction) {
        tracing::debug!(updated = %update.last_updated, "patched intraday prediction");
        self.ai_predictions.intraday = update;
    }
}
