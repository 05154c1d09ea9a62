use crate::error::AnalyticsError;
use crate::series::{NormalizedSeries, Observation, ReturnSeries};
use core_types::PriceView;

/// Day-over-day fractional change of `prices`, one element shorter than the input.
pub fn pct_change(prices: PriceView<'_>) -> ReturnSeries {
    let observations = prices
        .points()
        .windows(2)
        .map(|w| Observation {
            date: w[1].date,
            value: w[1].price / w[0].price - 1.0,
        })
        .collect();
    ReturnSeries::new(prices.symbol(), observations)
}

/// Rebases `prices` so that the first observation equals 1.0.
pub fn normalize(prices: PriceView<'_>) -> Result<NormalizedSeries, AnalyticsError> {
    let base = prices.first().ok_or_else(|| {
        AnalyticsError::NotEnoughData(format!("cannot normalize empty '{}' slice", prices.symbol()))
    })?;
    if base.price == 0.0 {
        return Err(AnalyticsError::DivisionByZero(format!(
            "normalize '{}'",
            prices.symbol()
        )));
    }

    let observations = prices
        .points()
        .iter()
        .map(|p| Observation {
            date: p.date,
            value: p.price / base.price,
        })
        .collect();
    Ok(NormalizedSeries::new(prices.symbol(), observations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{PricePoint, PriceSeries};

    fn series(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PricePoint::new(NaiveDate::from_ymd_opt(2022, 5, i as u32 + 2).unwrap(), *p)
            })
            .collect();
        PriceSeries::try_new("XLE", points).unwrap()
    }

    #[test]
    fn pct_change_drops_first_and_keeps_later_dates() {
        let s = series(&[100.0, 110.0, 99.0]);
        let r = pct_change(s.view());

        assert_eq!(r.len(), 2);
        assert_eq!(r.symbol, "XLE");
        assert_eq!(r.observations[0].date, s.points()[1].date);
        assert!((r.observations[0].value - 0.10).abs() < 1e-12);
        assert!((r.observations[1].value + 0.10).abs() < 1e-12);
    }

    #[test]
    fn pct_change_of_short_slices_is_empty() {
        assert!(pct_change(series(&[1.0]).view()).is_empty());
        let s = series(&[1.0]);
        assert!(pct_change(s.sub_view(0..0)).is_empty());
    }

    #[test]
    fn normalize_rebases_to_one() {
        let s = series(&[80.0, 40.0, 120.0]);
        let n = normalize(s.view()).unwrap();
        let values: Vec<f64> = n.values().collect();
        assert_eq!(values, vec![1.0, 0.5, 1.5]);
    }

    #[test]
    fn normalize_rejects_empty_slice() {
        let s = series(&[80.0]);
        assert!(matches!(
            normalize(s.sub_view(1..1)),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }
}
