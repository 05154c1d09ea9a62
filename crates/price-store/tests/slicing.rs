use chrono::{Days, NaiveDate};
use core_types::{PricePoint, PriceSeries, Window};
use price_store::slice;
use proptest::prelude::*;

/// Strictly increasing trading dates built from random gaps.
fn trading_days() -> impl Strategy<Value = Vec<NaiveDate>> {
    prop::collection::vec(1u64..5, 0..200).prop_map(|gaps| {
        let mut day = NaiveDate::from_ymd_opt(2006, 12, 1).unwrap();
        gaps.into_iter()
            .map(|gap| {
                day = day.checked_add_days(Days::new(gap)).unwrap();
                day
            })
            .collect()
    })
}

fn build(dates: &[NaiveDate]) -> PriceSeries {
    let points = dates
        .iter()
        .map(|d| PricePoint::new(*d, 50.0))
        .collect();
    PriceSeries::try_new("XLK", points).unwrap()
}

proptest! {
    #[test]
    fn slice_matches_date_filter(dates in trading_days(), start_offset in 0u64..400, len in 1u64..400) {
        let series = build(&dates);
        let start = NaiveDate::from_ymd_opt(2006, 11, 1).unwrap() + Days::new(start_offset);
        let window = Window::new(start, start + Days::new(len)).unwrap();

        let view = slice(&series, &window);
        let expected: Vec<NaiveDate> = dates.iter().copied().filter(|d| window.contains(*d)).collect();
        let actual: Vec<NaiveDate> = view.points().iter().map(|p| p.date).collect();

        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn crash_windows_never_fail_on_short_history() {
    let series = build(&[
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 6, 2).unwrap(),
    ]);

    for year in [2008, 2020, 2022] {
        let view = slice(&series, &Window::around_year(year).unwrap());
        assert!(view.len() <= 2);
    }
    assert_eq!(slice(&series, &Window::around_year(2022).unwrap()).len(), 2);
}
