#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use swingtrader::domain::error::SwingtraderError;
pub use swingtrader::domain::ohlcv::OhlcvBar;
use swingtrader::ports::data_port::DataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.0),
        close,
        volume: 1000,
    }
}

/// Daily bars with closes from a function of the bar index.
pub fn generate_bars<F>(symbol: &str, start: NaiveDate, count: usize, close_fn: F) -> Vec<OhlcvBar>
where
    F: Fn(usize) -> f64,
{
    (0..count)
        .map(|i| {
            make_bar(
                symbol,
                start + chrono::Duration::days(i as i64),
                close_fn(i),
            )
        })
        .collect()
}

pub fn rising_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    generate_bars(symbol, date(2024, 1, 1), count, |i| 10.0 + i as f64)
}

pub fn flat_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    generate_bars(symbol, date(2024, 1, 1), count, |_| 100.0)
}

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtraderError::Fetch {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }
}
