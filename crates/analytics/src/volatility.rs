use crate::error::AnalyticsError;
use crate::series::ReturnSeries;
use crate::stats::sample_std;
use chrono::NaiveDate;
use serde::Serialize;

/// Default number of return observations per volatility window.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    /// `None` until a full window of history is available.
    pub value: Option<f64>,
}

/// Rolling sample standard deviation of a return series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilitySeries {
    pub symbol: String,
    pub window: usize,
    pub points: Vec<VolatilityPoint>,
}

impl VolatilitySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of entries still warming up.
    pub fn missing(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_none()).count()
    }

    /// The highest volatility reading, with its date.
    pub fn peak(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
            .fold(None, |best, (date, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((date, v)),
            })
    }
}

/// Computes the trailing `window`-observation sample standard deviation of `returns`.
///
/// The first `window - 1` entries are `None`; a series shorter than `window`
/// is entirely `None`.
pub fn rolling_volatility(
    returns: &ReturnSeries,
    window: usize,
) -> Result<VolatilitySeries, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "volatility window must be at least 2 observations, got {}",
            window
        )));
    }

    let values: Vec<f64> = returns.values().collect();
    let points = returns
        .observations
        .iter()
        .enumerate()
        .map(|(i, obs)| VolatilityPoint {
            date: obs.date,
            value: if i + 1 >= window {
                sample_std(&values[i + 1 - window..=i])
            } else {
                None
            },
        })
        .collect();

    Ok(VolatilitySeries {
        symbol: returns.symbol.clone(),
        window,
        points,
    })
}
