use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unsupported crash year {0}; expected one of 2008, 2020, 2022")]
    UnsupportedCrashYear(i32),

    #[error("Series '{symbol}' is not strictly increasing at {date}")]
    UnorderedDates { symbol: String, date: NaiveDate },

    #[error("Series '{symbol}' has a non-positive or non-finite price {price} on {date}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        price: f64,
    },
}
