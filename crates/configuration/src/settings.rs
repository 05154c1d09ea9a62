use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{CrashYear, Instrument, InstrumentRole};
use serde::Deserialize;
use std::collections::HashSet;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub universe: Universe,
    pub history: History,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    pub data_source: DataSource,
    #[serde(default)]
    pub output: Output,
}

/// The fixed set of instruments every report covers.
#[derive(Debug, Clone, Deserialize)]
pub struct Universe {
    /// The benchmark index (e.g., "^GSPC").
    pub index: InstrumentSpec,
    /// The sector proxies compared against the index, in display order.
    pub sectors: Vec<InstrumentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSpec {
    pub symbol: String,
    pub name: String,
}

impl Universe {
    pub fn index(&self) -> Instrument {
        Instrument::new(&self.index.symbol, &self.index.name, InstrumentRole::Index)
    }

    pub fn sectors(&self) -> Vec<Instrument> {
        self.sectors
            .iter()
            .map(|s| Instrument::new(&s.symbol, &s.name, InstrumentRole::Sector))
            .collect()
    }

    /// The index followed by every sector. This is also the fetch order.
    pub fn instruments(&self) -> Vec<Instrument> {
        let mut all = vec![self.index()];
        all.extend(self.sectors());
        all
    }
}

/// The span of history downloaded once per session.
#[derive(Debug, Clone, Deserialize)]
pub struct History {
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    /// The crash years a user may pick from.
    pub crash_years: Vec<CrashYear>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSettings {
    /// Number of return observations in each rolling volatility window.
    pub volatility_window: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            volatility_window: 30,
        }
    }
}

/// Where historical prices are downloaded from.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSource {
    /// Base URL of the chart API (e.g., "https://query1.finance.yahoo.com").
    pub base_url: String,
    pub timeout_secs: u64,
    /// Some providers reject requests without a browser-like user agent.
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How finished reports are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal tables with a colored correlation heatmap.
    #[default]
    Table,
    Json,
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.sectors.is_empty() {
            return Err(ConfigError::ValidationError(
                "universe.sectors must list at least one sector".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for symbol in std::iter::once(&self.universe.index.symbol)
            .chain(self.universe.sectors.iter().map(|s| &s.symbol))
        {
            if symbol.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "instrument symbols must not be empty".to_string(),
                ));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "symbol '{}' appears more than once in the universe",
                    symbol
                )));
            }
        }

        if self.analytics.volatility_window < 2 {
            return Err(ConfigError::ValidationError(format!(
                "analytics.volatility_window must be at least 2, got {}",
                self.analytics.volatility_window
            )));
        }

        if self.history.end <= self.history.start {
            return Err(ConfigError::ValidationError(format!(
                "history.end ({}) must be after history.start ({})",
                self.history.end, self.history.start
            )));
        }

        if self.history.crash_years.is_empty() {
            return Err(ConfigError::ValidationError(
                "history.crash_years must not be empty".to_string(),
            ));
        }

        for crash in &self.history.crash_years {
            let window = crash
                .window()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
            if window.start < self.history.start || window.end > self.history.end {
                return Err(ConfigError::ValidationError(format!(
                    "crash year {} needs history from {} to {}, but only {} to {} is downloaded",
                    crash, window.start, window.end, self.history.start, self.history.end
                )));
            }
        }

        Ok(())
    }
}
