use analytics::{
    Recovery, correlation_matrix, max_drawdown, normalize, pct_change, recovery_time,
    rolling_volatility,
};
use chrono::{Days, NaiveDate};
use core_types::{PricePoint, PriceSeries};
use proptest::prelude::*;

fn build(prices: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2019, 1, 2).unwrap();
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, p)| PricePoint::new(start + Days::new(i as u64), *p))
        .collect();
    PriceSeries::try_new("^GSPC", points).unwrap()
}

fn positive_prices(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1_000.0, 1..max_len)
}

proptest! {
    #[test]
    fn non_decreasing_series_has_no_drawdown(mut prices in positive_prices(120)) {
        prices.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let series = build(&prices);

        let dd = max_drawdown(series.view()).unwrap();
        prop_assert_eq!(dd.max_drawdown, 0.0);
        prop_assert_eq!(recovery_time(series.view()).unwrap().days(), Some(0));
    }

    #[test]
    fn drawdown_stays_in_range(prices in positive_prices(120)) {
        let dd = max_drawdown(build(&prices).view()).unwrap();
        prop_assert!(dd.max_drawdown <= 0.0);
        prop_assert!(dd.max_drawdown > -1.0);
    }

    #[test]
    fn single_decline_then_recovery_counts_exact_days(
        peak in 50.0f64..500.0,
        depth in 0.05f64..0.9,
        down in 1usize..20,
        up in 1usize..20,
        overshoot in 0.0f64..0.5,
    ) {
        let trough = peak * (1.0 - depth);
        let mut prices = vec![peak];
        prices.extend((1..=down).map(|i| peak - (peak - trough) * i as f64 / down as f64));
        prices.extend((1..up).map(|i| trough + (peak - trough) * i as f64 / up as f64 * 0.99));
        prices.push(peak * (1.0 + overshoot));

        let series = build(&prices);
        match recovery_time(series.view()).unwrap() {
            Recovery::Recovered { days, .. } => prop_assert_eq!(days, up as i64),
            Recovery::Unrecovered { .. } => prop_assert!(false, "should recover"),
        }
    }

    #[test]
    fn normalized_series_starts_at_one(prices in positive_prices(60)) {
        let n = normalize(build(&prices).view()).unwrap();
        prop_assert_eq!(n.observations[0].value, 1.0);
        prop_assert_eq!(n.len(), prices.len());
    }

    #[test]
    fn volatility_warm_up_length(prices in prop::collection::vec(1.0f64..1_000.0, 2..90)) {
        let returns = pct_change(build(&prices).view());
        let vol = rolling_volatility(&returns, 30).unwrap();

        let expected_missing = if returns.len() >= 30 { 29 } else { returns.len() };
        prop_assert_eq!(vol.missing(), expected_missing);
        prop_assert!(vol.points[..expected_missing].iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn correlation_is_symmetric(
        a in prop::collection::vec(1.0f64..1_000.0, 3..60),
        b in prop::collection::vec(1.0f64..1_000.0, 3..60),
    ) {
        let ra = pct_change(build(&a).view());
        let rb = pct_change(build(&b).view());
        let m = correlation_matrix(&[("a", &ra), ("b", &rb), ("a again", &ra)]).unwrap();

        for i in 0..3 {
            for j in 0..3 {
                prop_assert_eq!(m.values[i][j], m.values[j][i]);
            }
        }
        if let Some(rho) = m.values[0][2] {
            prop_assert!((rho - 1.0).abs() < 1e-9);
        }
        if let Some(rho) = m.values[0][1] {
            prop_assert!((-1.0..=1.0).contains(&rho));
        }
    }
}

#[test]
fn strictly_decreasing_is_unrecovered() {
    let series = build(&[120.0, 110.0, 100.0, 90.0]);
    assert!(!recovery_time(series.view()).unwrap().is_recovered());
}
