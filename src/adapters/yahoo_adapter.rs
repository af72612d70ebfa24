//! Yahoo Finance data adapter.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Yahoo has no official
//! API and changes formats without notice; the CSV adapter is the fallback
//! when this path breaks. Null quote entries (halted days) are skipped.

use crate::domain::error::SwingtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooAdapter {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("reqwest client with static settings");

        Self {
            client,
            base_url: "https://query2.finance.yahoo.com/v8/finance/chart".into(),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new()
        }
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, start_ts, end_ts
        )
    }

    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError> {
        let fetch_err = |reason: String| SwingtraderError::Fetch {
            symbol: symbol.to_string(),
            reason,
        };

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => fetch_err(format!("{}: {}", err.code, err.description)),
            None => fetch_err("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| fetch_err("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| fetch_err("no timestamps in response".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| fetch_err("no quote data in response".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| fetch_err(format!("bad timestamp {}", ts)))?
                .date_naive();

            // Yahoo reports halted or missing days as nulls across the row.
            let (open, high, low, close) = match (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            ) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for YahooAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError> {
        let url = self.chart_url(symbol, start_date, end_date);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SwingtraderError::Fetch {
                symbol: symbol.to_string(),
                reason: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwingtraderError::Fetch {
                symbol: symbol.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let chart: ChartResponse = response.json().map_err(|e| SwingtraderError::Fetch {
            symbol: symbol.to_string(),
            reason: format!("unexpected response format: {}", e),
        })?;

        Self::parse_response(symbol, chart)
    }
}
