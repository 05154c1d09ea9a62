use crate::error::StoreError;
use api_client::{PriceDataset, PriceField, PriceTable};
use core_types::{PricePoint, PriceSeries};

/// Extracts one instrument's closing-price series from a raw dataset.
///
/// Both dataset shapes normalize to the same [`PriceSeries`]. A flat dataset
/// only answers for the symbol it was fetched for; a grouped dataset must
/// carry a table for `symbol`. Rows with no close are skipped.
pub fn close_series(dataset: &PriceDataset, symbol: &str) -> Result<PriceSeries, StoreError> {
    let table = match dataset {
        PriceDataset::Flat {
            symbol: held,
            table,
        } => {
            if held != symbol {
                return Err(StoreError::ShapeMismatch(format!(
                    "flat dataset holds '{}', cannot answer for '{}'",
                    held, symbol
                )));
            }
            table
        }
        PriceDataset::Grouped(tables) => tables.get(symbol).ok_or_else(|| {
            StoreError::ShapeMismatch(format!(
                "grouped dataset has no table for '{}' (has: {})",
                symbol,
                dataset.symbols().join(", ")
            ))
        })?,
    };

    table_to_series(symbol, table)
}

fn table_to_series(symbol: &str, table: &PriceTable) -> Result<PriceSeries, StoreError> {
    let closes = table.column(PriceField::Close).ok_or_else(|| {
        StoreError::ShapeMismatch(format!("table for '{}' has no Close column", symbol))
    })?;

    if closes.len() != table.dates.len() {
        return Err(StoreError::ShapeMismatch(format!(
            "table for '{}' has {} closes for {} dates",
            symbol,
            closes.len(),
            table.dates.len()
        )));
    }

    let points: Vec<PricePoint> = table
        .dates
        .iter()
        .zip(closes)
        .filter_map(|(date, close)| close.map(|price| PricePoint::new(*date, price)))
        .collect();

    let skipped = table.dates.len() - points.len();
    if skipped > 0 {
        tracing::warn!(symbol, skipped, "Dropped rows without a close price");
    }

    Ok(PriceSeries::try_new(symbol, points)?)
}
