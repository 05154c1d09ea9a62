use crate::error::StoreError;
use crate::normalize::close_series;
use api_client::PriceDataset;
use core_types::{Instrument, PriceSeries, PriceView, Window};
use std::collections::BTreeMap;

/// The closing-price history of every instrument in the universe.
///
/// Built once from a fetched dataset; every later window selection slices
/// the same immutable series.
#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceStore {
    /// Normalizes `dataset` into one series per instrument of `universe`.
    pub fn ingest(dataset: &PriceDataset, universe: &[Instrument]) -> Result<Self, StoreError> {
        let mut series = BTreeMap::new();
        for instrument in universe {
            let closes = close_series(dataset, &instrument.symbol)?;
            tracing::debug!(
                symbol = %instrument.symbol,
                rows = closes.len(),
                first = ?closes.points().first().map(|p| p.date),
                last = ?closes.points().last().map(|p| p.date),
                "Ingested price series"
            );
            series.insert(instrument.symbol.clone(), closes);
        }
        Ok(Self { series })
    }

    pub fn series(&self, symbol: &str) -> Result<&PriceSeries, StoreError> {
        self.series
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownInstrument(symbol.to_string()))
    }

    /// The part of `symbol`'s history that falls inside `window`.
    pub fn window(&self, symbol: &str, window: &Window) -> Result<PriceView<'_>, StoreError> {
        Ok(slice(self.series(symbol)?, window))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Returns the points of `series` dated within `[window.start, window.end)`.
///
/// A window reaching past either end of the data yields whatever overlaps,
/// which may be nothing.
pub fn slice<'a>(series: &'a PriceSeries, window: &Window) -> PriceView<'a> {
    let points = series.points();
    let lo = points.partition_point(|p| p.date < window.start);
    let hi = points.partition_point(|p| p.date < window.end);
    series.sub_view(lo..hi)
}
