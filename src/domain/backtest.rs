//! Backtest executor: replays a confirmed signal sequence as a
//! single-position state machine.
//!
//! States are Flat and Long only; no shorting, no pyramiding. A signal on
//! bar i fills at bar i+1's open, never the signal bar's close, so no
//! decision uses information from its own fill bar. A position still open
//! after the last bar is force-closed at the final close price so the run
//! always ends Flat with fully realized equity; this is a deliberate policy,
//! not an accident of the loop.

use super::error::SwingtraderError;
use super::ohlcv::OhlcvBar;
use super::position::{ClosedTrade, EquityPoint, OpenPosition};
use super::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Commission per fill as a percentage of traded value. 0 disables.
    pub commission_pct: f64,
    /// Close below entry * (1 - pct/100) triggers an exit. 0 disables.
    pub stop_loss_pct: f64,
    /// Close above entry * (1 + pct/100) triggers an exit. 0 disables.
    pub take_profit_pct: f64,
    /// Exit after holding this many bars. 0 disables.
    pub max_holding_bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_pct: 0.0,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
            max_holding_bars: 0,
        }
    }
}

/// Trade ledger and equity curve for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_equity: f64,
}

impl SimulationResult {
    pub fn total_return(&self, initial_capital: f64) -> f64 {
        if initial_capital > 0.0 {
            (self.final_equity - initial_capital) / initial_capital
        } else {
            0.0
        }
    }
}

/// Action scheduled on a signal bar, executed at the next bar's open.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Enter,
    Exit,
}

/// Run the state machine over bars and their confirmed signals.
///
/// The equity curve holds one point per bar, marked to close while Long and
/// flat while in cash. Fails with `EmptySeries` for zero bars; the signal
/// sequence must be aligned one-to-one with the bars.
pub fn simulate(
    bars: &[OhlcvBar],
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<SimulationResult, SwingtraderError> {
    if bars.is_empty() {
        return Err(SwingtraderError::EmptySeries);
    }
    if signals.len() != bars.len() {
        return Err(SwingtraderError::InvalidConfiguration {
            reason: format!(
                "{} signals for {} bars; sequences must align",
                signals.len(),
                bars.len()
            ),
        });
    }

    let commission = config.commission_pct / 100.0;
    let mut equity = config.initial_capital;
    let mut position: Option<OpenPosition> = None;
    let mut pending: Option<Pending> = None;
    let mut trades: Vec<ClosedTrade> = Vec::new();
    let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        // 1. Fill the action scheduled on the previous bar at this open.
        match pending.take() {
            Some(Pending::Enter) if position.is_none() => {
                let invested = equity * (1.0 - commission);
                position = Some(OpenPosition {
                    entry_index: i,
                    entry_date: bar.date,
                    entry_price: bar.open,
                    invested,
                    equity_before_entry: equity,
                });
            }
            Some(Pending::Exit) => {
                if let Some(pos) = position.take() {
                    equity =
                        settle_exit(&pos, bar, bar.open, i, commission, &mut trades);
                }
            }
            _ => {}
        }

        // 2. Decide the next transition from this bar's close.
        pending = match &position {
            Some(pos) => {
                let exit_signal = signals[i] == Signal::Sell;
                let stopped = config.stop_loss_pct > 0.0
                    && bar.close <= pos.entry_price * (1.0 - config.stop_loss_pct / 100.0);
                let took_profit = config.take_profit_pct > 0.0
                    && bar.close >= pos.entry_price * (1.0 + config.take_profit_pct / 100.0);
                let timed_out = config.max_holding_bars > 0
                    && i - pos.entry_index >= config.max_holding_bars;

                (exit_signal || stopped || took_profit || timed_out).then_some(Pending::Exit)
            }
            // A Sell while Flat is suppressed, as is a Buy while Long above.
            None => (signals[i] == Signal::Buy).then_some(Pending::Enter),
        };

        // 3. Mark equity to this bar's close.
        let marked = match &position {
            Some(pos) => pos.marked_equity(bar.close),
            None => equity,
        };
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity: marked,
        });
    }

    // Force-close any open position at the final close so the run ends Flat.
    if let Some(pos) = position.take() {
        let last = bars.last().expect("non-empty series");
        equity = settle_exit(&pos, last, last.close, bars.len() - 1, commission, &mut trades);
        if let Some(point) = equity_curve.last_mut() {
            point.equity = equity;
        }
    }

    Ok(SimulationResult {
        trades,
        equity_curve,
        final_equity: equity,
    })
}

fn settle_exit(
    pos: &OpenPosition,
    bar: &OhlcvBar,
    price: f64,
    bar_index: usize,
    commission: f64,
    trades: &mut Vec<ClosedTrade>,
) -> f64 {
    let proceeds = pos.marked_equity(price) * (1.0 - commission);
    trades.push(ClosedTrade {
        symbol: bar.symbol.clone(),
        entry_date: pos.entry_date,
        entry_price: pos.entry_price,
        exit_date: bar.date,
        exit_price: price,
        pnl: proceeds - pos.equity_before_entry,
        holding_bars: bar_index - pos.entry_index,
    });
    proceeds
}
