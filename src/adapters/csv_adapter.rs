//! CSV file data adapter.
//!
//! Reads one price history file with a header row. A full file carries
//! date,open,high,low,close,volume; a close-only file (date,close) is also
//! accepted, with open/high/low copied from close and volume zero. Column
//! names are matched case-insensitively.

use crate::domain::error::SwingtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<f64, SwingtraderError> {
    record
        .get(index)
        .ok_or_else(|| SwingtraderError::Fetch {
            symbol: symbol.to_string(),
            reason: format!("missing {} field", name),
        })?
        .trim()
        .parse()
        .map_err(|e| SwingtraderError::Fetch {
            symbol: symbol.to_string(),
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError> {
        let fetch_err = |reason: String| SwingtraderError::Fetch {
            symbol: symbol.to_string(),
            reason,
        };

        let mut rdr = csv::Reader::from_path(&self.path)
            .map_err(|e| fetch_err(format!("failed to open {}: {}", self.path.display(), e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| fetch_err(format!("missing header row: {}", e)))?
            .clone();

        let date_col = column_index(&headers, "date")
            .ok_or_else(|| fetch_err("no date column".into()))?;
        let close_col = column_index(&headers, "close")
            .ok_or_else(|| fetch_err("no close column".into()))?;
        let open_col = column_index(&headers, "open");
        let high_col = column_index(&headers, "high");
        let low_col = column_index(&headers, "low");
        let volume_col = column_index(&headers, "volume");

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| fetch_err(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| fetch_err("missing date field".into()))?
                .trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| fetch_err(format!("invalid date '{}': {}", date_str, e)))?;

            if date < start_date || date > end_date {
                continue;
            }

            let close = parse_field(&record, close_col, "close", symbol)?;
            let open = match open_col {
                Some(col) => parse_field(&record, col, "open", symbol)?,
                None => close,
            };
            let high = match high_col {
                Some(col) => parse_field(&record, col, "high", symbol)?,
                None => close,
            };
            let low = match low_col {
                Some(col) => parse_field(&record, col, "low", symbol)?,
                None => close,
            };
            let volume = match volume_col {
                Some(col) => parse_field(&record, col, "volume", symbol)? as i64,
                None => 0,
            };

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
