use crate::error::ReportError;
use analytics::{
    CorrelationMatrix, Drawdown, DrawdownCurve, NormalizedSeries, Recovery, ReturnSeries,
    VolatilitySeries, correlation_matrix, drawdown_curve, max_drawdown, normalize, pct_change,
    recovery_time, rolling_volatility,
};
use core_types::{CrashYear, Instrument, PricePoint, PriceView, Window};
use price_store::PriceStore;
use serde::Serialize;

/// Everything the presentation layer shows for one crash year.
///
/// This struct is the final output of the `ReportAssembler` and is rebuilt from
/// scratch for every year selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrashReport {
    pub year: CrashYear,
    pub window: Window,
    pub index: Instrument,
    /// The index closes inside the window, for charting.
    pub index_series: Vec<PricePoint>,
    pub drawdown: Drawdown,
    pub drawdown_curve: DrawdownCurve,
    pub recovery: Recovery,
    /// Rebased performance of every sector, in universe order.
    pub sectors: Vec<SectorPerformance>,
    /// Rolling volatility of the index's daily returns.
    pub volatility: VolatilitySeries,
    /// Return correlations across the index and every sector, labelled by name.
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub instrument: Instrument,
    pub normalized: NormalizedSeries,
}

/// Sequences the analytics for a crash year over a fixed universe.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    index: Instrument,
    sectors: Vec<Instrument>,
    volatility_window: usize,
}

impl ReportAssembler {
    pub fn new(index: Instrument, sectors: Vec<Instrument>, volatility_window: usize) -> Self {
        Self {
            index,
            sectors,
            volatility_window,
        }
    }

    /// Builds the report for `year` from the prices held in `store`.
    pub fn assemble(&self, store: &PriceStore, year: CrashYear) -> Result<CrashReport, ReportError> {
        let window = year.window()?;
        tracing::info!(%year, start = %window.start, end = %window.end, "Assembling crash report");

        // 1. Index: drawdown and recovery
        let index_view = non_empty(store.window(&self.index.symbol, &window)?, &window)?;
        let drawdown = max_drawdown(index_view)?;
        let recovery = recovery_time(index_view)?;

        // 2. Sectors: rebased performance
        let mut sector_views = Vec::with_capacity(self.sectors.len());
        let mut sectors = Vec::with_capacity(self.sectors.len());
        for instrument in &self.sectors {
            let view = non_empty(store.window(&instrument.symbol, &window)?, &window)?;
            sectors.push(SectorPerformance {
                instrument: instrument.clone(),
                normalized: normalize(view)?,
            });
            sector_views.push(view);
        }

        // 3. Index returns and volatility
        let index_returns = pct_change(index_view);
        let volatility = rolling_volatility(&index_returns, self.volatility_window)?;

        // 4. Correlation across index + sectors
        let sector_returns: Vec<ReturnSeries> =
            sector_views.iter().map(|view| pct_change(*view)).collect();
        let mut named: Vec<(&str, &ReturnSeries)> = vec![(self.index.name.as_str(), &index_returns)];
        named.extend(
            self.sectors
                .iter()
                .map(|s| s.name.as_str())
                .zip(sector_returns.iter()),
        );
        let correlation = correlation_matrix(&named)?;

        tracing::info!(
            %year,
            max_drawdown_pct = drawdown.as_pct(),
            recovery_days = ?recovery.days(),
            common_dates = correlation.observations,
            "Crash report ready"
        );

        Ok(CrashReport {
            year,
            window,
            index: self.index.clone(),
            index_series: index_view.to_vec(),
            drawdown,
            drawdown_curve: drawdown_curve(index_view),
            recovery,
            sectors,
            volatility,
            correlation,
        })
    }
}

fn non_empty<'a>(view: PriceView<'a>, window: &Window) -> Result<PriceView<'a>, ReportError> {
    if view.is_empty() {
        return Err(ReportError::EmptyWindow {
            symbol: view.symbol().to_string(),
            window: *window,
        });
    }
    Ok(view)
}
