//! OHLCV bar representation and series validation.

use chrono::NaiveDate;

use super::error::SwingtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Validate a bar series before it enters the pipeline.
///
/// Dates must be strictly increasing (sorted, no duplicates), all prices
/// finite and non-negative, volume non-negative. The first violation is
/// returned as `InvalidBar`; nothing downstream sees a malformed series.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), SwingtraderError> {
    let mut prev_date: Option<NaiveDate> = None;

    for bar in bars {
        if let Some(prev) = prev_date {
            if bar.date <= prev {
                return Err(SwingtraderError::InvalidBar {
                    date: bar.date.to_string(),
                    reason: format!("date not after previous bar {}", prev),
                });
            }
        }
        prev_date = Some(bar.date);

        for (name, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() {
                return Err(SwingtraderError::InvalidBar {
                    date: bar.date.to_string(),
                    reason: format!("non-finite {}", name),
                });
            }
            if value < 0.0 {
                return Err(SwingtraderError::InvalidBar {
                    date: bar.date.to_string(),
                    reason: format!("negative {}", name),
                });
            }
        }

        if bar.volume < 0 {
            return Err(SwingtraderError::InvalidBar {
                date: bar.date.to_string(),
                reason: "negative volume".into(),
            });
        }
    }

    Ok(())
}
