use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A column of a daily price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// A daily table of `date -> field` values for one instrument.
///
/// Values are optional because providers emit nulls for bars they have no
/// quote for. Every column is expected to have one entry per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<PriceField, Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, field: PriceField, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(field, values);
        self
    }

    pub fn column(&self, field: PriceField) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// The raw result of a history query.
///
/// The shape depends on how many instruments were requested together: a single
/// symbol yields one flat table, several symbols yield one table per symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceDataset {
    Flat { symbol: String, table: PriceTable },
    Grouped(BTreeMap<String, PriceTable>),
}

impl PriceDataset {
    /// The symbols this dataset holds prices for.
    pub fn symbols(&self) -> Vec<&str> {
        match self {
            PriceDataset::Flat { symbol, .. } => vec![symbol.as_str()],
            PriceDataset::Grouped(tables) => tables.keys().map(String::as_str).collect(),
        }
    }
}
