//! # Price Store
//!
//! Holds the daily closing-price history of every instrument in the universe
//! and hands out windowed, read-only slices of it.
//!
//! The raw dataset from the data source comes in one of two shapes (see
//! [`api_client::PriceDataset`]). [`PriceStore::ingest`] resolves that shape once,
//! so nothing downstream ever has to know how the data was fetched.

pub mod error;
pub mod normalize;
pub mod store;

pub use error::StoreError;
pub use normalize::close_series;
pub use store::{PriceStore, slice};
