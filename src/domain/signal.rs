//! Raw trade signal generation.
//!
//! Combines the per-bar indicator frame into Buy/Sell/Hold with a vote rule:
//! a side fires when at least `min_votes` of its three conditions hold.
//! Crossing conditions compare against the immediately preceding bar, so the
//! first bar after warm-up is forced to Hold.

use super::error::SwingtraderError;
use super::indicator::{FrameEntry, IndicatorFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Thresholds and the vote rule for the signal generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub cci_oversold: f64,
    pub cci_overbought: f64,
    /// Conditions required per side: 3 = unanimous, 2 = majority, 1 = any.
    pub min_votes: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            cci_oversold: -100.0,
            cci_overbought: 100.0,
            min_votes: 2,
        }
    }
}

/// One raw signal per frame row, stateless across bars.
///
/// Warm-up rows hold; so does the first valid row (no predecessor to detect
/// a crossing against). Conflicting Buy and Sell votes on the same bar
/// cancel to Hold.
pub fn generate_signals(
    frame: &IndicatorFrame,
    config: &SignalConfig,
) -> Result<Vec<Signal>, SwingtraderError> {
    if frame.is_empty() {
        return Err(SwingtraderError::EmptySeries);
    }

    let mut signals = Vec::with_capacity(frame.len());

    for i in 0..frame.len() {
        let signal = match (i.checked_sub(1).and_then(|p| frame.entry(p)), frame.entry(i)) {
            (Some(prev), Some(curr)) => classify(&prev, &curr, config),
            _ => Signal::Hold,
        };
        signals.push(signal);
    }

    Ok(signals)
}

fn classify(prev: &FrameEntry, curr: &FrameEntry, config: &SignalConfig) -> Signal {
    let buy_votes = [
        curr.rsi < config.rsi_oversold,
        prev.macd_histogram < 0.0 && curr.macd_histogram >= 0.0,
        prev.cci <= config.cci_oversold && curr.cci > config.cci_oversold,
    ]
    .into_iter()
    .filter(|&v| v)
    .count();

    let sell_votes = [
        curr.rsi > config.rsi_overbought,
        prev.macd_histogram > 0.0 && curr.macd_histogram <= 0.0,
        prev.cci >= config.cci_overbought && curr.cci < config.cci_overbought,
    ]
    .into_iter()
    .filter(|&v| v)
    .count();

    let buy = buy_votes >= config.min_votes;
    let sell = sell_votes >= config.min_votes;

    match (buy, sell) {
        (true, false) => Signal::Buy,
        (false, true) => Signal::Sell,
        _ => Signal::Hold,
    }
}
