//! Entry/exit delay grid search.
//!
//! Every (entry delay, exit delay) pair is an independent read-only
//! simulation over the same bars and raw signals, so cells run in parallel
//! with rayon. The reduction walks the row-major cell list in order, never
//! completion order, so the winner is deterministic across runs and thread
//! counts.

use rayon::prelude::*;
use std::str::FromStr;

use super::backtest::{simulate, BacktestConfig, SimulationResult};
use super::delay::confirm_signals;
use super::error::SwingtraderError;
use super::metrics::Metrics;
use super::ohlcv::OhlcvBar;
use super::signal::Signal;

/// Metric the grid search maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    #[default]
    TotalReturn,
    SharpeRatio,
    WinRate,
}

impl Objective {
    fn score(&self, metrics: &Metrics) -> f64 {
        match self {
            Objective::TotalReturn => metrics.total_return,
            Objective::SharpeRatio => metrics.sharpe_ratio,
            Objective::WinRate => metrics.win_rate,
        }
    }
}

impl FromStr for Objective {
    type Err = SwingtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "total_return" => Ok(Objective::TotalReturn),
            "sharpe_ratio" => Ok(Objective::SharpeRatio),
            "win_rate" => Ok(Objective::WinRate),
            other => Err(SwingtraderError::InvalidConfiguration {
                reason: format!("unknown objective '{}'", other),
            }),
        }
    }
}

/// The delay combinations to search.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayGrid {
    pub entry_delays: Vec<usize>,
    pub exit_delays: Vec<usize>,
}

impl DelayGrid {
    /// Inclusive 0..=max ranges on both axes.
    pub fn up_to(max_entry: usize, max_exit: usize) -> Self {
        DelayGrid {
            entry_delays: (0..=max_entry).collect(),
            exit_delays: (0..=max_exit).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entry_delays.len() * self.exit_delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_delays.is_empty() || self.exit_delays.is_empty()
    }

    /// Row-major cell order: entry delay outer, exit delay inner. This
    /// order defines the final tie-break.
    fn cells(&self) -> Vec<(usize, usize)> {
        self.entry_delays
            .iter()
            .flat_map(|&entry| self.exit_delays.iter().map(move |&exit| (entry, exit)))
            .collect()
    }
}

impl Default for DelayGrid {
    fn default() -> Self {
        DelayGrid::up_to(5, 5)
    }
}

/// The winning cell with its full simulation, so reporting never re-runs.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub entry_delay: usize,
    pub exit_delay: usize,
    pub result: SimulationResult,
    pub metrics: Metrics,
}

/// Exhaustive search over the delay grid.
///
/// Ties on the objective break toward fewer trades, then toward the
/// earlier cell in row-major order. The first failure any cell observes is
/// propagated instead of a partial result.
pub fn optimize(
    bars: &[OhlcvBar],
    raw_signals: &[Signal],
    grid: &DelayGrid,
    objective: Objective,
    backtest_config: &BacktestConfig,
    periods_per_year: f64,
) -> Result<OptimizationOutcome, SwingtraderError> {
    if grid.is_empty() {
        return Err(SwingtraderError::InvalidConfiguration {
            reason: "delay search grid is empty".into(),
        });
    }

    let evaluated: Vec<OptimizationOutcome> = grid
        .cells()
        .par_iter()
        .map(|&(entry_delay, exit_delay)| {
            let confirmed = confirm_signals(raw_signals, entry_delay, exit_delay);
            let result = simulate(bars, &confirmed, backtest_config)?;
            let metrics = Metrics::compute(&result, backtest_config.initial_capital, periods_per_year);
            Ok(OptimizationOutcome {
                entry_delay,
                exit_delay,
                result,
                metrics,
            })
        })
        .collect::<Result<Vec<_>, SwingtraderError>>()?;

    let mut winner: Option<OptimizationOutcome> = None;
    for candidate in evaluated {
        let replace = match &winner {
            None => true,
            Some(best) => {
                let candidate_score = objective.score(&candidate.metrics);
                let best_score = objective.score(&best.metrics);
                candidate_score > best_score
                    || (candidate_score == best_score
                        && candidate.result.trades.len() < best.result.trades.len())
            }
        };
        if replace {
            winner = Some(candidate);
        }
    }

    Ok(winner.expect("non-empty grid yields a winner"))
}
