pub mod config;
pub use config::{Config, HistogramConfig, LogConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinstockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("non-finite return {value} at index {index}")]
    NonFiniteReturn { index: usize, value: f64 },
    #[error("missing value in `{field}` at index {index}")]
    MissingValue { field: &'static str, index: usize },
    #[error("no data: {0} is empty")]
    EmptySeries(&'static str),
    #[error("bin count must be at least 1, got {0}")]
    InvalidBinCount(usize),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinstockError>;
