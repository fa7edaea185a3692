pub mod chart;
pub mod export;
pub mod feed;
pub mod payload;
pub mod profile;
pub mod returns;
pub mod stats;

pub use finstock_common::{FinstockError, HistogramConfig, Result};

pub use chart::{
    BinRange, ChartHandle, ChartSlot, HistogramChartData, PriceChartData, ReturnDistribution,
};
pub use export::{export_csv, export_json, print_summary, report_file_name, AnalysisReport};
pub use feed::{decode_feed_message, latest_intraday, IntradayPrediction};
pub use payload::{AiPredictions, AnalysisPayload, NewsSentiment, StockInfo};
pub use profile::{
    bin_count, bin_count_with, build_histogram, build_histogram_with_bins,
    build_histogram_with_policy, histogram_for_config, BinPolicy, Histogram, HistogramBin,
};
pub use returns::{daily_returns_from_closes, ReturnSeries};
pub use stats::{calculate_statistics, return_probabilities, PricePoint, Statistics};
