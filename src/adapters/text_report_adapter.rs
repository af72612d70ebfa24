//! Plain-text report adapter.
//!
//! Renders the winning simulation as a fixed-width summary, metrics block
//! and trade ledger. Output goes to a file so the stderr progress log stays
//! separate from the report itself.

use crate::domain::error::SwingtraderError;
use crate::domain::optimizer::OptimizationOutcome;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn render(symbol: &str, outcome: &OptimizationOutcome) -> String {
        let metrics = &outcome.metrics;
        let mut out = String::new();

        let _ = writeln!(out, "swingtrader backtest report");
        let _ = writeln!(out, "===========================");
        let _ = writeln!(out, "symbol:        {}", symbol);
        let _ = writeln!(
            out,
            "delays:        entry {} bars, exit {} bars",
            outcome.entry_delay, outcome.exit_delay
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "total return:  {:>8.2}%", metrics.total_return * 100.0);
        let _ = writeln!(
            out,
            "annualized:    {:>8.2}%",
            metrics.annualized_return * 100.0
        );
        let _ = writeln!(out, "sharpe ratio:  {:>8.2}", metrics.sharpe_ratio);
        let _ = writeln!(out, "max drawdown:  {:>8.2}%", metrics.max_drawdown * 100.0);
        let _ = writeln!(out, "trades:        {:>8}", metrics.total_trades);
        let _ = writeln!(out, "win rate:      {:>8.1}%", metrics.win_rate * 100.0);
        if metrics.profit_factor.is_finite() {
            let _ = writeln!(out, "profit factor: {:>8.2}", metrics.profit_factor);
        } else {
            let _ = writeln!(out, "profit factor:      inf");
        }
        let _ = writeln!(
            out,
            "avg holding:   {:>8.1} bars",
            metrics.avg_holding_bars
        );

        if !outcome.result.trades.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:<12} {:>10} {:<12} {:>10} {:>12} {:>6}",
                "entry", "price", "exit", "price", "pnl", "bars"
            );
            for trade in &outcome.result.trades {
                let _ = writeln!(
                    out,
                    "{:<12} {:>10.2} {:<12} {:>10.2} {:>+12.2} {:>6}",
                    trade.entry_date.to_string(),
                    trade.entry_price,
                    trade.exit_date.to_string(),
                    trade.exit_price,
                    trade.pnl,
                    trade.holding_bars
                );
            }
        }

        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        symbol: &str,
        outcome: &OptimizationOutcome,
        output_path: &str,
    ) -> Result<(), SwingtraderError> {
        fs::write(output_path, Self::render(symbol, outcome))?;
        Ok(())
    }
}
