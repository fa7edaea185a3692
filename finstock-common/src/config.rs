use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_price_height")]
    pub price_chart_height_pct: u16, // share of the chart area given to the price line
}

fn default_theme() -> String {
    "dark".into()
}
fn default_price_height() -> u16 {
    85
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            price_chart_height_pct: default_price_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    #[serde(default = "default_min_bins")]
    pub min_bins: usize,
    #[serde(default = "default_max_bins")]
    pub max_bins: usize,
    #[serde(default)]
    pub fixed_bins: Option<usize>, // overrides the sqrt policy when set
}

fn default_min_bins() -> usize {
    10
}
fn default_max_bins() -> usize {
    20
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            min_bins: default_min_bins(),
            max_bins: default_max_bins(),
            fixed_bins: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn,finstock=info".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub histogram: HistogramConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("finstock")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("FINSTOCK_CONFIG") {
            PathBuf::from(env_path) // $FINSTOCK_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::FinstockError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let h = &self.histogram;
        if h.min_bins == 0 || h.min_bins > h.max_bins {
            return Err(crate::FinstockError::Config(format!(
                "histogram bins: min_bins={} max_bins={} (need 1 <= min <= max)",
                h.min_bins, h.max_bins
            )));
        }
        if h.fixed_bins == Some(0) {
            return Err(crate::FinstockError::Config("histogram fixed_bins must be at least 1".into()));
        }
        Ok(())
    }

    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::FinstockError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
