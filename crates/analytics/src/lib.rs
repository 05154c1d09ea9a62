//! # Crash Analytics Engine
//!
//! This crate provides the numerical core of crash analysis: how deep a market
//! fell, how long it took to come back, how sectors moved relative to each
//! other, and how volatile the ride was.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every metric is a free function from a read-only
//!   `PriceView` (or a derived series) to a freshly allocated result. Nothing is
//!   cached and no input is mutated.
//! - **Explicit Undefined Values:** Statistics that cannot be computed are `None`
//!   or `Recovery::Unrecovered`, never a silent zero.
//!
//! ## Public API
//!
//! - `max_drawdown`, `recovery_time`, `drawdown_curve`: peak-to-trough analysis.
//! - `pct_change`, `normalize`: return and rebased-performance series.
//! - `rolling_volatility`: trailing sample standard deviation of returns.
//! - `correlation_matrix`: date-aligned pairwise Pearson correlation.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod correlation;
pub mod drawdown;
pub mod error;
pub mod returns;
pub mod series;
mod stats;
pub mod volatility;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use drawdown::{Drawdown, Recovery, drawdown_curve, max_drawdown, recovery_time};
pub use error::AnalyticsError;
pub use returns::{normalize, pct_change};
pub use series::{DatedSeries, DrawdownCurve, NormalizedSeries, Observation, ReturnSeries};
pub use volatility::{
    DEFAULT_VOLATILITY_WINDOW, VolatilityPoint, VolatilitySeries, rolling_volatility,
};
