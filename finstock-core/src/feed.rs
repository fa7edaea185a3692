use finstock_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntradayPrediction {
    pub last_updated: String,
    pub similar_pattern_found: String,
    pub prediction: String,
    pub probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

pub const INTRADAY_UPDATE: &str = "intraday_update";

/// Decodes one feed message. Message types other than `intraday_update`
/// are ignored.
pub fn decode_feed_message(text: &str) -> Result<Option<IntradayPrediction>> {
    let env: Envelope = serde_json::from_str(text)?;
    if env.kind != INTRADAY_UPDATE {
        tracing::debug!(kind = %env.kind, "ignoring feed message");
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(env.data)?))
}

/// Last intraday update in a JSON-lines feed dump; undecodable lines are skipped.
pub fn latest_intraday<'a, I>(lines: I) -> Option<IntradayPrediction>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| match decode_feed_message(l) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed feed line");
                None
            }
        })
        .last()
}
