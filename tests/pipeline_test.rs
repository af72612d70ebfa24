//! End-to-end pipeline tests: bars -> indicators -> signals -> delay search
//! -> simulation -> metrics, plus the failure paths.

mod common;

use common::*;
use swingtrader::domain::backtest::{simulate, BacktestConfig};
use swingtrader::domain::delay::confirm_signals;
use swingtrader::domain::error::SwingtraderError;
use swingtrader::domain::indicator::{IndicatorConfig, IndicatorFrame};
use swingtrader::domain::metrics::Metrics;
use swingtrader::domain::ohlcv::validate_series;
use swingtrader::domain::optimizer::{optimize, DelayGrid, Objective};
use swingtrader::domain::resample::{resample, ResampleRule};
use swingtrader::domain::signal::{generate_signals, Signal, SignalConfig};
use swingtrader::ports::data_port::DataPort;

fn run_pipeline(
    bars: &[OhlcvBar],
    signal_config: &SignalConfig,
    grid: &DelayGrid,
) -> Result<swingtrader::domain::optimizer::OptimizationOutcome, SwingtraderError> {
    validate_series(bars)?;
    let frame = IndicatorFrame::compute(bars, &IndicatorConfig::default())?;
    let raw = generate_signals(&frame, signal_config)?;
    optimize(
        bars,
        &raw,
        grid,
        Objective::TotalReturn,
        &BacktestConfig::default(),
        52.0,
    )
}

#[test]
fn rising_series_holds_long_or_stays_out_without_losses() {
    let bars = rising_bars("UP", 45);
    let outcome = run_pipeline(&bars, &SignalConfig::default(), &DelayGrid::up_to(2, 2)).unwrap();

    // A monotone rise never dips into oversold territory, so the strategy
    // enters at most once and can never close a losing trade.
    assert!(outcome.result.trades.len() <= 1);
    assert!(outcome.result.trades.iter().all(|t| t.pnl >= 0.0));
    assert!(outcome.metrics.total_return >= 0.0);
}

#[test]
fn flat_series_produces_no_trades_and_zero_return() {
    let bars = flat_bars("FLAT", 60);
    let outcome = run_pipeline(&bars, &SignalConfig::default(), &DelayGrid::up_to(2, 2)).unwrap();

    assert!(outcome.result.trades.is_empty());
    assert!(outcome.metrics.total_return.abs() < f64::EPSILON);
    assert_eq!(outcome.result.equity_curve.len(), bars.len());
}

#[test]
fn dip_and_recovery_produces_a_profitable_trade() {
    // 30 flat bars to clear warm-up, a sharp 10-bar decline, then a steep
    // recovery. With a 1-vote rule the oversold RSI alone triggers entry.
    let bars = generate_bars("DIP", date(2024, 1, 1), 55, |i| {
        if i < 30 {
            100.0
        } else if i < 40 {
            100.0 - 3.0 * (i as f64 - 29.0)
        } else {
            70.0 + 5.0 * (i as f64 - 39.0)
        }
    });
    let signal_config = SignalConfig {
        min_votes: 1,
        ..SignalConfig::default()
    };
    let outcome = run_pipeline(&bars, &signal_config, &DelayGrid::up_to(1, 1)).unwrap();

    assert!(!outcome.result.trades.is_empty());
    assert!(outcome.metrics.total_return > 0.0);

    let warmup = IndicatorConfig::default().warmup_bars();
    for trade in &outcome.result.trades {
        assert!(trade.entry_date > bars[warmup].date);
        assert!(trade.exit_date >= trade.entry_date);
    }
}

#[test]
fn trades_never_overlap() {
    let bars = generate_bars("CHOP", date(2024, 1, 1), 120, |i| {
        100.0 + 20.0 * ((i as f64) * 0.35).sin()
    });
    let signal_config = SignalConfig {
        min_votes: 1,
        ..SignalConfig::default()
    };
    let outcome = run_pipeline(&bars, &signal_config, &DelayGrid::up_to(1, 1)).unwrap();

    for pair in outcome.result.trades.windows(2) {
        assert!(
            pair[1].entry_date > pair[0].exit_date,
            "trade {:?} overlaps {:?}",
            pair[1],
            pair[0]
        );
    }
}

#[test]
fn raw_signals_hold_through_warmup() {
    let bars = generate_bars("WARM", date(2024, 1, 1), 50, |i| {
        100.0 + ((i * 17) % 23) as f64 - 11.0
    });
    let frame = IndicatorFrame::compute(&bars, &IndicatorConfig::default()).unwrap();
    let signals = generate_signals(&frame, &SignalConfig::default()).unwrap();

    let warmup = IndicatorConfig::default().warmup_bars();
    for (i, signal) in signals.iter().enumerate().take(warmup + 1) {
        assert_eq!(*signal, Signal::Hold, "bar {} leaked a signal", i);
    }
}

#[test]
fn short_series_fails_with_insufficient_history() {
    let bars = rising_bars("SHORT", 20);
    let err = run_pipeline(&bars, &SignalConfig::default(), &DelayGrid::up_to(1, 1)).unwrap_err();
    assert!(matches!(err, SwingtraderError::InsufficientHistory { .. }));
}

#[test]
fn zero_bars_never_produce_a_report() {
    let err = run_pipeline(&[], &SignalConfig::default(), &DelayGrid::up_to(1, 1)).unwrap_err();
    assert!(matches!(
        err,
        SwingtraderError::InsufficientHistory { bars: 0, .. }
    ));

    let err = simulate(&[], &[], &BacktestConfig::default()).unwrap_err();
    assert!(matches!(err, SwingtraderError::EmptySeries));
}

#[test]
fn pipeline_is_deterministic_end_to_end() {
    let bars = generate_bars("DET", date(2024, 1, 1), 100, |i| {
        100.0 + 15.0 * ((i as f64) * 0.2).sin() + (i % 7) as f64
    });
    let signal_config = SignalConfig {
        min_votes: 1,
        ..SignalConfig::default()
    };

    let first = run_pipeline(&bars, &signal_config, &DelayGrid::up_to(3, 3)).unwrap();
    let second = run_pipeline(&bars, &signal_config, &DelayGrid::up_to(3, 3)).unwrap();

    assert_eq!(
        (first.entry_delay, first.exit_delay),
        (second.entry_delay, second.exit_delay)
    );
    assert_eq!(first.result.trades, second.result.trades);
    assert_eq!(first.result.equity_curve, second.result.equity_curve);
}

#[test]
fn equity_curve_stays_aligned_with_bars() {
    let bars = generate_bars("ALIGN", date(2024, 1, 1), 80, |i| {
        100.0 + 10.0 * ((i as f64) * 0.3).sin()
    });
    let frame = IndicatorFrame::compute(&bars, &IndicatorConfig::default()).unwrap();
    let raw = generate_signals(&frame, &SignalConfig::default()).unwrap();
    let confirmed = confirm_signals(&raw, 1, 1);
    let result = simulate(&bars, &confirmed, &BacktestConfig::default()).unwrap();

    assert_eq!(result.equity_curve.len(), bars.len());
    for (bar, point) in bars.iter().zip(&result.equity_curve) {
        assert_eq!(bar.date, point.date);
        assert!(point.equity.is_finite());
        assert!(point.equity > 0.0);
    }
}

#[test]
fn weekly_resample_feeds_the_pipeline() {
    // Two years of daily data collapse into enough weekly bars for warm-up.
    let daily = generate_bars("WKLY", date(2023, 1, 2), 500, |i| {
        100.0 + 25.0 * ((i as f64) * 0.05).sin()
    });
    let weekly = resample(&daily, ResampleRule::Weekly);

    assert!(weekly.len() >= IndicatorConfig::default().min_bars());
    assert!(weekly.len() < daily.len() / 4);
    validate_series(&weekly).unwrap();

    let signal_config = SignalConfig {
        min_votes: 1,
        ..SignalConfig::default()
    };
    let outcome = run_pipeline(&weekly, &signal_config, &DelayGrid::up_to(2, 2)).unwrap();
    let recomputed = Metrics::compute(
        &outcome.result,
        BacktestConfig::default().initial_capital,
        ResampleRule::Weekly.periods_per_year(),
    );
    assert_eq!(outcome.metrics, recomputed);
}

#[test]
fn mock_port_errors_propagate() {
    let port = MockDataPort::new().with_error("BAD", "remote rejected the request");
    let err = port
        .fetch_ohlcv("BAD", date(2024, 1, 1), date(2024, 6, 1))
        .unwrap_err();
    assert!(matches!(err, SwingtraderError::Fetch { .. }));
    assert!(err.to_string().contains("remote rejected"));
}

#[test]
fn mock_port_filters_by_range() {
    let port = MockDataPort::new().with_bars("AAPL", rising_bars("AAPL", 30));
    let bars = port
        .fetch_ohlcv("AAPL", date(2024, 1, 10), date(2024, 1, 19))
        .unwrap();
    assert_eq!(bars.len(), 10);
}

#[test]
fn invalid_bars_are_rejected_before_the_core() {
    let mut bars = rising_bars("BADBAR", 40);
    bars[5].close = f64::INFINITY;
    let err = run_pipeline(&bars, &SignalConfig::default(), &DelayGrid::up_to(1, 1)).unwrap_err();
    assert!(matches!(err, SwingtraderError::InvalidBar { .. }));
}
