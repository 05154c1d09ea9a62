use anyhow::{Context, Result, bail};
use api_client::PriceSource;
use configuration::settings::Config;
use core_types::CrashYear;
use crash_report::{CrashReport, ReportAssembler};
use price_store::PriceStore;

/// One analyst session: the price history is downloaded once at start-up and
/// every crash-year selection afterwards is sliced from it.
pub struct Session {
    store: PriceStore,
    assembler: ReportAssembler,
    years: Vec<CrashYear>,
}

impl Session {
    /// Downloads the whole configured history for the universe and ingests it.
    ///
    /// Any fetch or shape failure is fatal; there is no retry.
    pub async fn start(config: &Config, source: &dyn PriceSource) -> Result<Self> {
        let universe = config.universe.instruments();
        let symbols: Vec<String> = universe.iter().map(|i| i.symbol.clone()).collect();

        tracing::info!(
            symbols = symbols.len(),
            start = %config.history.start,
            end = %config.history.end,
            "Downloading price history"
        );
        let dataset = source
            .fetch_history(&symbols, config.history.start, config.history.end)
            .await
            .context("Failed to download price history")?;

        let store = PriceStore::ingest(&dataset, &universe)
            .context("Failed to normalize downloaded price history")?;
        tracing::info!(instruments = store.len(), "Price history ready");

        Ok(Self {
            store,
            assembler: ReportAssembler::new(
                config.universe.index(),
                config.universe.sectors(),
                config.analytics.volatility_window,
            ),
            years: config.history.crash_years.clone(),
        })
    }

    /// The crash years this session offers.
    pub fn years(&self) -> &[CrashYear] {
        &self.years
    }

    pub fn report(&self, year: CrashYear) -> Result<CrashReport> {
        if !self.years.contains(&year) {
            bail!(
                "crash year {} is not offered; choose one of {}",
                year,
                self.years_label()
            );
        }
        self.assembler
            .assemble(&self.store, year)
            .with_context(|| format!("Failed to build the {} crash report", year))
    }

    pub fn years_label(&self) -> String {
        self.years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
