use chrono::NaiveDate;
use serde::Serialize;

/// A single dated value of a derived series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A derived daily series, tagged with the instrument it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedSeries {
    pub symbol: String,
    pub observations: Vec<Observation>,
}

impl DatedSeries {
    pub fn new(symbol: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            symbol: symbol.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }
}

/// Day-over-day fractional price changes, dated by the later observation.
pub type ReturnSeries = DatedSeries;

/// Prices rebased so the first observation is 1.0.
pub type NormalizedSeries = DatedSeries;

/// `(price - running_max) / running_max` for every date.
pub type DrawdownCurve = DatedSeries;
