//! Configuration validation.
//!
//! All config fields are checked before any data is fetched, so a bad
//! threshold fails the run instead of silently producing a meaningless
//! backtest.

use crate::domain::error::SwingtraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    for key in ["rsi_period", "macd_fast", "macd_slow", "macd_signal", "cci_period"] {
        let value = config.get_int("indicators", key, 1);
        if value < 1 {
            return Err(SwingtraderError::ConfigInvalid {
                section: "indicators".to_string(),
                key: key.to_string(),
                reason: format!("{} must be at least 1", key),
            });
        }
    }

    let fast = config.get_int("indicators", "macd_fast", 12);
    let slow = config.get_int("indicators", "macd_slow", 26);
    if fast >= slow {
        return Err(SwingtraderError::ConfigInvalid {
            section: "indicators".to_string(),
            key: "macd_fast".to_string(),
            reason: "macd_fast must be below macd_slow".to_string(),
        });
    }

    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    let oversold = config.get_double("signals", "rsi_oversold", 30.0);
    let overbought = config.get_double("signals", "rsi_overbought", 70.0);

    for (key, value) in [("rsi_oversold", oversold), ("rsi_overbought", overbought)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(SwingtraderError::ConfigInvalid {
                section: "signals".to_string(),
                key: key.to_string(),
                reason: format!("{} must be within [0, 100]", key),
            });
        }
    }
    if oversold >= overbought {
        return Err(SwingtraderError::ConfigInvalid {
            section: "signals".to_string(),
            key: "rsi_oversold".to_string(),
            reason: "rsi_oversold must be below rsi_overbought".to_string(),
        });
    }

    let cci_oversold = config.get_double("signals", "cci_oversold", -100.0);
    let cci_overbought = config.get_double("signals", "cci_overbought", 100.0);
    if cci_oversold >= cci_overbought {
        return Err(SwingtraderError::ConfigInvalid {
            section: "signals".to_string(),
            key: "cci_oversold".to_string(),
            reason: "cci_oversold must be below cci_overbought".to_string(),
        });
    }

    let min_votes = config.get_int("signals", "min_votes", 2);
    if !(1..=3).contains(&min_votes) {
        return Err(SwingtraderError::ConfigInvalid {
            section: "signals".to_string(),
            key: "min_votes".to_string(),
            reason: "min_votes must be between 1 and 3".to_string(),
        });
    }

    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    for key in ["max_entry_delay", "max_exit_delay"] {
        let value = config.get_int("optimizer", key, 5);
        if value < 0 {
            return Err(SwingtraderError::ConfigInvalid {
                section: "optimizer".to_string(),
                key: key.to_string(),
                reason: format!("{} must be non-negative", key),
            });
        }
    }

    if let Some(objective) = config.get_string("optimizer", "objective") {
        objective
            .parse::<crate::domain::optimizer::Objective>()
            .map_err(|_| SwingtraderError::ConfigInvalid {
                section: "optimizer".to_string(),
                key: "objective".to_string(),
                reason: format!(
                    "unknown objective '{}' (expected total_return, sharpe_ratio or win_rate)",
                    objective
                ),
            })?;
    }

    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    let capital = config.get_double("backtest", "initial_capital", 10_000.0);
    if capital <= 0.0 {
        return Err(SwingtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }

    for key in ["commission_pct", "stop_loss_pct"] {
        let value = config.get_double("backtest", key, 0.0);
        if !(0.0..100.0).contains(&value) {
            return Err(SwingtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{} must be within [0, 100)", key),
            });
        }
    }

    let take_profit = config.get_double("backtest", "take_profit_pct", 0.0);
    if take_profit < 0.0 {
        return Err(SwingtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "take_profit_pct".to_string(),
            reason: "take_profit_pct must be non-negative".to_string(),
        });
    }

    let max_holding = config.get_int("backtest", "max_holding_bars", 0);
    if max_holding < 0 {
        return Err(SwingtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "max_holding_bars".to_string(),
            reason: "max_holding_bars must be non-negative".to_string(),
        });
    }

    Ok(())
}

/// Run every section validator in order, stopping at the first failure.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    validate_indicator_config(config)?;
    validate_signal_config(config)?;
    validate_optimizer_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}
