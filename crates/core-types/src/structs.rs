use crate::enums::InstrumentRole;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A tradable instrument in the analysis universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// The ticker used by the data source (e.g., "^GSPC", "XLK").
    pub symbol: String,
    /// Human-readable label used in reports (e.g., "Technology").
    pub name: String,
    pub role: InstrumentRole,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, role: InstrumentRole) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            role,
        }
    }
}

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// A half-open date range `[start, end)` used to slice price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end <= start {
            return Err(CoreError::InvalidInput(
                "window".to_string(),
                format!("end {} must be after start {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// `[year-1-01-01, year+1-01-01)`
    pub fn around_year(year: i32) -> Result<Self, CoreError> {
        let first_day = |y: i32| {
            NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| {
                CoreError::InvalidInput("year".to_string(), format!("{} is out of range", y))
            })
        };
        Self::new(first_day(year - 1)?, first_day(year + 1)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// An immutable daily price history for one instrument.
///
/// Dates are strictly increasing and every price is positive and finite. The
/// only way to build one is [`PriceSeries::try_new`], so every consumer can rely
/// on those guarantees without re-checking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn try_new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    symbol,
                    date: point.date,
                    price: point.price,
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(CoreError::UnorderedDates {
                    symbol,
                    date: point.date,
                });
            }
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// A read-only view over the whole series.
    pub fn view(&self) -> PriceView<'_> {
        PriceView {
            symbol: &self.symbol,
            points: &self.points,
        }
    }

    /// A read-only view over `range`, clamped to the bounds of the series.
    pub fn sub_view(&self, range: Range<usize>) -> PriceView<'_> {
        let start = range.start.min(self.points.len());
        let end = range.end.clamp(start, self.points.len());
        PriceView {
            symbol: &self.symbol,
            points: &self.points[start..end],
        }
    }
}

/// A borrowed, contiguous slice of a [`PriceSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceView<'a> {
    symbol: &'a str,
    points: &'a [PricePoint],
}

impl<'a> PriceView<'a> {
    pub fn symbol(&self) -> &'a str {
        self.symbol
    }

    pub fn points(&self) -> &'a [PricePoint] {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&'a PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&'a PricePoint> {
        self.points.last()
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + 'a {
        self.points.iter().map(|p| p.price)
    }

    pub fn to_vec(&self) -> Vec<PricePoint> {
        self.points.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    #[test]
    fn rejects_duplicate_and_unordered_dates() {
        let dup = vec![PricePoint::new(day(2), 1.0), PricePoint::new(day(2), 2.0)];
        assert!(matches!(
            PriceSeries::try_new("X", dup),
            Err(CoreError::UnorderedDates { .. })
        ));

        let backwards = vec![PricePoint::new(day(3), 1.0), PricePoint::new(day(2), 2.0)];
        assert!(PriceSeries::try_new("X", backwards).is_err());
    }

    #[test]
    fn rejects_non_positive_prices() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let points = vec![PricePoint::new(day(2), 1.0), PricePoint::new(day(3), bad)];
            assert!(matches!(
                PriceSeries::try_new("X", points),
                Err(CoreError::InvalidPrice { .. })
            ));
        }
    }

    #[test]
    fn sub_view_clamps_to_bounds() {
        let series = PriceSeries::try_new(
            "X",
            vec![PricePoint::new(day(2), 1.0), PricePoint::new(day(3), 2.0)],
        )
        .unwrap();

        let tail = series.sub_view(1..2);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail.first().unwrap().price, 2.0);
        assert_eq!(tail.symbol(), "X");
        assert_eq!(series.sub_view(1..9).len(), 1);
        assert!(series.sub_view(5..9).is_empty());
        assert!(series.sub_view(2..2).is_empty());
    }

    #[test]
    fn window_is_half_open() {
        let window = Window::new(day(2), day(4)).unwrap();
        assert!(window.contains(day(2)));
        assert!(window.contains(day(3)));
        assert!(!window.contains(day(4)));
        assert!(Window::new(day(4), day(4)).is_err());
    }
}
