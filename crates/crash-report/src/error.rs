use analytics::AnalyticsError;
use core_types::{CoreError, Window};
use price_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No prices for '{symbol}' between {} and {}", .window.start, .window.end)]
    EmptyWindow { symbol: String, window: Window },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
