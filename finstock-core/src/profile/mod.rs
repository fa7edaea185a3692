pub mod histogram;
pub mod numeric;

pub use histogram::{
    bin_count, bin_count_with, build_histogram, build_histogram_with_bins,
    build_histogram_with_policy, histogram_for_config, BinPolicy, Histogram, HistogramBin,
};
pub use numeric::{describe, NumericAccumulator, NumericProfile};
