use crate::error::ConfigError;
use crate::settings::Config;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalyticsSettings, DataSource, History, InstrumentSpec, Output, OutputFormat, Universe,
};

/// Loads the application configuration from the `config.toml` file.
///
/// Values can be overridden with `CRASHSCOPE__<SECTION>__<KEY>` environment
/// variables, e.g. `CRASHSCOPE__ANALYTICS__VOLATILITY_WINDOW=21`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads and validates the configuration from an explicit path.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("CRASHSCOPE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    finish(builder)
}

/// Parses a configuration from TOML text, without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        sectors = config.universe.sectors.len(),
        start = %config.history.start,
        end = %config.history.end,
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CrashYear, InstrumentRole};

    const SAMPLE: &str = r#"
[universe]
index = { symbol = "^GSPC", name = "S&P 500" }
sectors = [
    { symbol = "XLK", name = "Technology" },
    { symbol = "XLE", name = "Energy" },
]

[history]
start = "2007-01-01"
end = "2024-01-01"
crash_years = [2008, 2020, 2022]

[data_source]
base_url = "https://query1.finance.yahoo.com"
timeout_secs = 30
user_agent = "crashscope"
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.analytics.volatility_window, 30);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(
            config.history.crash_years,
            vec![CrashYear::GlobalFinancialCrisis, CrashYear::Covid, CrashYear::RateShock]
        );

        let instruments = config.universe.instruments();
        assert_eq!(instruments.len(), 3);
        assert_eq!(instruments[0].role, InstrumentRole::Index);
        assert_eq!(instruments[0].symbol, "^GSPC");
        assert!(instruments[1..].iter().all(|i| i.role == InstrumentRole::Sector));
    }

    #[test]
    fn shipped_config_is_valid() {
        let config = parse_config(include_str!("../../../config.toml")).unwrap();
        assert_eq!(config.universe.index().symbol, "^GSPC");
        assert_eq!(config.universe.sectors().len(), 5);
        assert_eq!(config.history.crash_years.len(), 3);
    }

    #[test]
    fn rejects_tiny_volatility_window() {
        let toml = format!("{}\n[analytics]\nvolatility_window = 1\n", SAMPLE);
        let err = parse_config(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_crash_year_outside_history() {
        let toml = SAMPLE.replace("start = \"2007-01-01\"", "start = \"2010-01-01\"");
        let err = parse_config(&toml).unwrap_err();
        assert!(err.to_string().contains("2008"));
    }

    #[test]
    fn rejects_unknown_crash_year() {
        let toml = SAMPLE.replace("[2008, 2020, 2022]", "[2001]");
        assert!(matches!(parse_config(&toml), Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let toml = SAMPLE.replace("\"XLE\"", "\"XLK\"");
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
