use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use configuration::DataSource;
use futures::future::join_all;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod dataset;
pub mod error;
pub mod responses;
// --- Public API ---
pub use dataset::{PriceDataset, PriceField, PriceTable};
pub use responses::{ChartError, ChartResponse};

/// The abstract interface for a historical price provider.
/// The session only ever talks to this trait, so the live implementation can
/// be swapped for an in-memory one in tests.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches split- and dividend-adjusted daily prices for `symbols` over `[start, end)`.
    ///
    /// A single symbol yields [`PriceDataset::Flat`]; several yield
    /// [`PriceDataset::Grouped`]. Any symbol that fails or comes back empty
    /// fails the whole request.
    async fn fetch_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceDataset, ApiError>;
}

/// A concrete implementation of the `PriceSource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(source: &DataSource) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(source.user_agent.as_str())
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: source.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_table(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        tracing::debug!(symbol, %start, %end, "Requesting daily history");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // The chart API reports unknown symbols with a JSON error body and a 404,
        // so the body is worth parsing even when the status is not a success.
        let table = match parse_chart(symbol, &text) {
            Ok(table) => table,
            Err(ApiError::Deserialization(_)) if !status.is_success() => {
                return Err(ApiError::ApiError(format!(
                    "HTTP {} while fetching '{}'",
                    status, symbol
                )));
            }
            Err(e) => return Err(e),
        };

        // `period2` is inclusive on the provider side.
        let table = table.before(end);
        if table.is_empty() {
            return Err(ApiError::EmptyResponse(symbol.to_string()));
        }

        tracing::debug!(symbol, bars = table.len(), "Fetched daily history");
        Ok(table)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceDataset, ApiError> {
        if end <= start {
            return Err(ApiError::InvalidRequest(format!(
                "end {} must be after start {}",
                end, start
            )));
        }

        match symbols {
            [] => Err(ApiError::InvalidRequest(
                "at least one symbol is required".to_string(),
            )),
            [symbol] => {
                let table = self.fetch_table(symbol, start, end).await?;
                Ok(PriceDataset::Flat {
                    symbol: symbol.clone(),
                    table,
                })
            }
            many => {
                let tasks = many.iter().map(|symbol| self.fetch_table(symbol, start, end));
                let results = join_all(tasks).await;

                let mut grouped = BTreeMap::new();
                for (symbol, result) in many.iter().zip(results) {
                    grouped.insert(symbol.clone(), result?);
                }
                Ok(PriceDataset::Grouped(grouped))
            }
        }
    }
}

impl PriceTable {
    /// Drops every row dated on or after `end`.
    fn before(mut self, end: NaiveDate) -> Self {
        let keep = self.dates.partition_point(|d| *d < end);
        self.dates.truncate(keep);
        for values in self.columns.values_mut() {
            values.truncate(keep);
        }
        self
    }
}

/// Parses a chart API body into a price table.
///
/// Open, high, low and close are rescaled by the adjusted-close ratio so that
/// every price column is split- and dividend-adjusted. Instruments without an
/// adjusted-close indicator keep their raw prices.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceTable, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(ApiError::ApiError(format!(
            "{} for '{}': {}",
            err.code, symbol, err.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
        .ok_or_else(|| ApiError::EmptyResponse(symbol.to_string()))?;

    let offset = result.meta.gmtoffset;
    let dates = result
        .timestamp
        .iter()
        .map(|&ts| {
            DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ts)))
        })
        .collect::<Result<Vec<NaiveDate>, ApiError>>()?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjusted = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose);

    let n = dates.len();
    for (name, len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
    ] {
        if len != n {
            return Err(ApiError::InvalidData(format!(
                "'{}' has {} {} values for {} timestamps",
                symbol, len, name, n
            )));
        }
    }

    let (open, high, low, close) = match adjusted {
        Some(adj) => {
            if adj.len() != n {
                return Err(ApiError::InvalidData(format!(
                    "'{}' has {} adjusted closes for {} timestamps",
                    symbol,
                    adj.len(),
                    n
                )));
            }
            let ratio: Vec<Option<f64>> = adj
                .iter()
                .zip(&quote.close)
                .map(|(a, c)| match (a, c) {
                    (Some(a), Some(c)) if *c != 0.0 => Some(a / c),
                    _ => None,
                })
                .collect();
            let scale = |col: &[Option<f64>]| -> Vec<Option<f64>> {
                col.iter()
                    .zip(&ratio)
                    .map(|(v, r)| v.zip(*r).map(|(v, r)| v * r))
                    .collect()
            };
            (scale(&quote.open), scale(&quote.high), scale(&quote.low), adj)
        }
        None => (quote.open, quote.high, quote.low, quote.close),
    };

    let mut table = PriceTable::new(dates)
        .with_column(PriceField::Open, open)
        .with_column(PriceField::High, high)
        .with_column(PriceField::Low, low)
        .with_column(PriceField::Close, close);
    if quote.volume.len() == n {
        table = table.with_column(PriceField::Volume, quote.volume);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2020-03-02 .. 2020-03-04 14:30 UTC, New York offset -5h.
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "XLK", "gmtoffset": -18000, "exchangeTimezoneName": "America/New_York" },
                "timestamp": [1583159400, 1583245800, 1583332200],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 102.0, null],
                        "high":   [104.0, 103.0, null],
                        "low":    [ 99.0, 100.0, null],
                        "close":  [100.0, 101.0, null],
                        "volume": [1000, 1100, null]
                    }],
                    "adjclose": [{ "adjclose": [50.0, 50.5, null] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_adjusted_table() {
        let table = parse_chart("XLK", BODY).unwrap();

        assert_eq!(table.dates, vec![date(2020, 3, 2), date(2020, 3, 3), date(2020, 3, 4)]);
        assert_eq!(
            table.column(PriceField::Close).unwrap(),
            &[Some(50.0), Some(50.5), None]
        );
        // Scaled by adjclose / close = 0.5.
        assert_eq!(
            table.column(PriceField::Open).unwrap(),
            &[Some(50.0), Some(51.0), None]
        );
        assert_eq!(table.column(PriceField::Volume).unwrap()[1], Some(1100.0));
    }

    #[test]
    fn falls_back_to_raw_close_without_adjclose() {
        let body = BODY.replace(r#"[{ "adjclose": [50.0, 50.5, null] }]"#, "[]");
        let table = parse_chart("XLK", &body).unwrap();
        assert_eq!(
            table.column(PriceField::Close).unwrap(),
            &[Some(100.0), Some(101.0), None]
        );
    }

    #[test]
    fn surfaces_provider_errors() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", body).unwrap_err();
        assert!(matches!(err, ApiError::ApiError(msg) if msg.contains("NOPE")));
    }

    #[test]
    fn rejects_ragged_columns() {
        let body = BODY.replace("[100.0, 101.0, null]", "[100.0, 101.0]");
        assert!(matches!(
            parse_chart("XLK", &body),
            Err(ApiError::InvalidData(_))
        ));
    }

    #[test]
    fn before_truncates_every_column() {
        let table = parse_chart("XLK", BODY).unwrap().before(date(2020, 3, 3));
        assert_eq!(table.len(), 1);
        assert!(table.columns.values().all(|c| c.len() == 1));
    }

    #[tokio::test]
    async fn rejects_empty_symbol_list() {
        let client = YahooClient::new(&DataSource {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            user_agent: "test".to_string(),
        })
        .unwrap();

        let err = client
            .fetch_history(&[], date(2020, 1, 1), date(2021, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
