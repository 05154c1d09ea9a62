use crate::error::AnalyticsError;
use crate::series::{DrawdownCurve, Observation};
use chrono::NaiveDate;
use core_types::PriceView;
use serde::Serialize;

/// The deepest peak-to-trough decline of a price slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Drawdown {
    /// `min((price - running_max) / running_max)`, in `(-1, 0]`.
    pub max_drawdown: f64,
    pub trough_index: usize,
    pub trough_date: NaiveDate,
    /// The highest price at or before the trough.
    pub peak_price: f64,
    /// First date the peak price was reached.
    pub peak_date: NaiveDate,
}

impl Drawdown {
    pub fn as_pct(&self) -> f64 {
        self.max_drawdown * 100.0
    }
}

/// How long the slice took to climb back to its pre-trough peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recovery {
    Recovered {
        /// Calendar days from the trough to the recovery date.
        days: i64,
        trough_date: NaiveDate,
        recovery_date: NaiveDate,
    },
    /// The price never regained the peak within the slice.
    Unrecovered { trough_date: NaiveDate },
}

impl Recovery {
    pub fn days(&self) -> Option<i64> {
        match self {
            Recovery::Recovered { days, .. } => Some(*days),
            Recovery::Unrecovered { .. } => None,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Recovery::Recovered { .. })
    }
}

/// Computes the maximum drawdown of `prices`.
///
/// The trough is the earliest point of deepest decline. A single observation
/// has a drawdown of 0; an empty slice is rejected.
pub fn max_drawdown(prices: PriceView<'_>) -> Result<Drawdown, AnalyticsError> {
    let points = prices.points();
    let first = points.first().ok_or_else(|| {
        AnalyticsError::NotEnoughData(format!("max drawdown of empty '{}' slice", prices.symbol()))
    })?;

    let mut peak = *first;
    let mut best = Drawdown {
        max_drawdown: 0.0,
        trough_index: 0,
        trough_date: first.date,
        peak_price: first.price,
        peak_date: first.date,
    };

    for (i, point) in points.iter().enumerate() {
        if point.price > peak.price {
            peak = *point;
        }
        let drawdown = (point.price - peak.price) / peak.price;
        // Strict comparison keeps the earliest trough on ties.
        if drawdown < best.max_drawdown {
            best = Drawdown {
                max_drawdown: drawdown,
                trough_index: i,
                trough_date: point.date,
                peak_price: peak.price,
                peak_date: peak.date,
            };
        }
    }

    Ok(best)
}

/// Computes the time from the drawdown trough back to the pre-trough peak.
///
/// The peak is the maximum price over `[0, trough]`. Recovery is the first
/// date at or after the trough whose price is at least that peak.
pub fn recovery_time(prices: PriceView<'_>) -> Result<Recovery, AnalyticsError> {
    let drawdown = max_drawdown(prices)?;
    let points = &prices.points()[drawdown.trough_index..];

    let recovered = points.iter().find(|p| p.price >= drawdown.peak_price);

    Ok(match recovered {
        Some(point) => Recovery::Recovered {
            days: (point.date - drawdown.trough_date).num_days(),
            trough_date: drawdown.trough_date,
            recovery_date: point.date,
        },
        None => Recovery::Unrecovered {
            trough_date: drawdown.trough_date,
        },
    })
}

/// The underwater curve: drawdown from the running maximum at every date.
pub fn drawdown_curve(prices: PriceView<'_>) -> DrawdownCurve {
    let mut running_max = f64::NEG_INFINITY;
    let observations = prices
        .points()
        .iter()
        .map(|p| {
            running_max = running_max.max(p.price);
            Observation {
                date: p.date,
                value: (p.price - running_max) / running_max,
            }
        })
        .collect();
    DrawdownCurve::new(prices.symbol(), observations)
}
