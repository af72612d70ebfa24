//! Price-series provider port.

use crate::domain::error::SwingtraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Supplies daily bars for one symbol over a date range, sorted ascending.
/// Resampling and validation happen on the domain side of this boundary.
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError>;
}
