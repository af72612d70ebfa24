//! Position and trade records produced by the backtest executor.

use chrono::NaiveDate;

/// The single open long position during a simulation.
///
/// `invested` is the account equity committed at entry (after the entry
/// commission); full reinvestment means the whole account rides the trade.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub invested: f64,
    /// Account equity immediately before the entry fill, for realized pnl.
    pub equity_before_entry: f64,
}

impl OpenPosition {
    /// Mark the position to a price with full reinvestment.
    pub fn marked_equity(&self, price: f64) -> f64 {
        self.invested * price / self.entry_price
    }
}

/// A closed round trip. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pnl: f64,
    pub holding_bars: usize,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn marked_equity_scales_with_price() {
        let pos = OpenPosition {
            entry_index: 5,
            entry_date: date(2024, 1, 15),
            entry_price: 50.0,
            invested: 10_000.0,
            equity_before_entry: 10_000.0,
        };
        assert!((pos.marked_equity(55.0) - 11_000.0).abs() < 1e-9);
        assert!((pos.marked_equity(45.0) - 9_000.0).abs() < 1e-9);
        assert!((pos.marked_equity(50.0) - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn trade_win_classification() {
        let trade = ClosedTrade {
            symbol: "TEST".into(),
            entry_date: date(2024, 1, 15),
            entry_price: 50.0,
            exit_date: date(2024, 2, 1),
            exit_price: 55.0,
            pnl: 1_000.0,
            holding_bars: 3,
        };
        assert!(trade.is_win());

        let loser = ClosedTrade {
            pnl: -250.0,
            ..trade.clone()
        };
        assert!(!loser.is_win());

        let breakeven = ClosedTrade { pnl: 0.0, ..trade };
        assert!(!breakeven.is_win());
    }
}
