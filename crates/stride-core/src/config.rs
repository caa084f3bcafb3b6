//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An override file (explicit path, else ~/.config/stride/config.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Only the implicit location may be absent; a missing explicit path is an
//! error.
//!
//! Environment variables are applied last:
//! - `STRIDE_FORECAST_HORIZON`
//! - `STRIDE_MIN_OBSERVATIONS` (training gate and trailing insight window)
//! - `STRIDE_TRAINING_WINDOW`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/stride.toml");

/// Observations needed before a trend model is fitted, and the size of the
/// trailing window compared by the recent-trend recommendation
pub const MIN_OBSERVATIONS: usize = 7;

/// Default number of days to forecast
pub const DEFAULT_HORIZON: usize = 7;

/// Longest horizon accepted from config or requests
pub const MAX_HORIZON: usize = 366;

pub const HORIZON_ENV: &str = "STRIDE_FORECAST_HORIZON";
pub const MIN_OBSERVATIONS_ENV: &str = "STRIDE_MIN_OBSERVATIONS";
pub const TRAINING_WINDOW_ENV: &str = "STRIDE_TRAINING_WINDOW";

/// Forecaster settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastConfig {
    /// Days predicted when the caller does not ask for a specific count
    pub horizon: usize,
    /// Observations required before (re)training
    pub min_observations: usize,
    /// Most recent observations used for the trend fit
    pub training_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            min_observations: MIN_OBSERVATIONS,
            training_window: 28,
        }
    }
}

/// Recommendation thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    pub activity_target: u32,
    pub weekday_gap: u32,
    pub trailing_window: usize,
    pub decline_percent: u32,
    pub improvement_percent: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            activity_target: 7000,
            weekday_gap: 3000,
            trailing_window: MIN_OBSERVATIONS,
            decline_percent: 80,
            improvement_percent: 120,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub forecast: ForecastConfig,
    pub insights: InsightConfig,
}

impl EngineConfig {
    /// Load config from the default override location or embedded defaults,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load config from an explicit path (falls back to defaults if missing)
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = parse_config(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STRIDE_*` environment variable overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source
    ///
    /// `STRIDE_MIN_OBSERVATIONS` moves the training gate and the trailing
    /// insight window together, as [`MIN_OBSERVATIONS`] does for defaults.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(horizon) = parse_usize(HORIZON_ENV, lookup(HORIZON_ENV))? {
            self.forecast.horizon = horizon;
        }
        if let Some(min) = parse_usize(MIN_OBSERVATIONS_ENV, lookup(MIN_OBSERVATIONS_ENV))? {
            self.forecast.min_observations = min;
            self.insights.trailing_window = min;
        }
        if let Some(window) = parse_usize(TRAINING_WINDOW_ENV, lookup(TRAINING_WINDOW_ENV))? {
            self.forecast.training_window = window;
        }
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let f = &self.forecast;
        if f.horizon == 0 || f.horizon > MAX_HORIZON {
            return Err(Error::Config(format!(
                "forecast.horizon must be between 1 and {}, got {}",
                MAX_HORIZON, f.horizon
            )));
        }
        if f.min_observations < 2 {
            return Err(Error::Config(format!(
                "forecast.min_observations must be at least 2, got {}",
                f.min_observations
            )));
        }
        if f.training_window < f.min_observations {
            return Err(Error::Config(format!(
                "forecast.training_window ({}) must be >= forecast.min_observations ({})",
                f.training_window, f.min_observations
            )));
        }

        let i = &self.insights;
        if i.trailing_window == 0 {
            return Err(Error::Config(
                "insights.trailing_window must be at least 1".to_string(),
            ));
        }
        if i.decline_percent >= i.improvement_percent {
            return Err(Error::Config(format!(
                "insights.decline_percent ({}) must be below insights.improvement_percent ({})",
                i.decline_percent, i.improvement_percent
            )));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stride").join("config.toml"))
}

fn parse_usize(name: &str, value: Option<String>) -> Result<Option<usize>> {
    match value {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be a positive integer, got {:?}", name, value))),
        _ => Ok(None),
    }
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<EngineConfig> {
    let path = match override_path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    forecast: Option<RawForecast>,
    insights: Option<RawInsights>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    horizon: Option<usize>,
    min_observations: Option<usize>,
    training_window: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    activity_target: Option<u32>,
    weekday_gap: Option<u32>,
    trailing_window: Option<usize>,
    decline_percent: Option<u32>,
    improvement_percent: Option<u32>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(forecast) = raw.forecast {
        if let Some(horizon) = forecast.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(min) = forecast.min_observations {
            config.forecast.min_observations = min;
        }
        if let Some(window) = forecast.training_window {
            config.forecast.training_window = window;
        }
    }

    if let Some(insights) = raw.insights {
        if let Some(target) = insights.activity_target {
            config.insights.activity_target = target;
        }
        if let Some(gap) = insights.weekday_gap {
            config.insights.weekday_gap = gap;
        }
        if let Some(window) = insights.trailing_window {
            config.insights.trailing_window = window;
        }
        if let Some(pct) = insights.decline_percent {
            config.insights.decline_percent = pct;
        }
        if let Some(pct) = insights.improvement_percent {
            config.insights.improvement_percent = pct;
        }
    }

    Ok(config)
}
