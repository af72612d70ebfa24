//! Technical indicator engine.
//!
//! Per-indicator calculators produce an `IndicatorSeries` aligned one-to-one
//! with the bar series; warm-up positions are marked `valid: false` rather
//! than carrying a placeholder number. [`IndicatorFrame::compute`] bundles
//! the three strategy indicators and enforces the warm-up contract.

pub mod ema;
pub mod rsi;
pub mod macd;
pub mod cci;

use chrono::NaiveDate;
use std::fmt;

use super::error::SwingtraderError;
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

impl IndicatorValue {
    pub fn simple(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            IndicatorValue::Macd { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Cci(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

/// Lookback periods for the three strategy indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub cci_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            cci_period: 20,
        }
    }
}

impl IndicatorConfig {
    /// Index of the first bar where all three indicators are valid.
    ///
    /// RSI needs `period` price changes, MACD needs the slow EMA plus the
    /// signal EMA seeded, CCI needs a full SMA window.
    pub fn warmup_bars(&self) -> usize {
        let rsi = self.rsi_period;
        let macd = self.macd_slow.saturating_sub(1) + self.macd_signal.saturating_sub(1);
        let cci = self.cci_period.saturating_sub(1);
        rsi.max(macd).max(cci)
    }

    /// Minimum series length that yields at least one fully-valid frame row.
    pub fn min_bars(&self) -> usize {
        self.warmup_bars() + 1
    }
}

/// One fully-valid row of the frame, as consumed by the signal generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEntry {
    pub rsi: f64,
    pub macd_histogram: f64,
    pub cci: f64,
}

/// RSI, MACD and CCI series aligned one-to-one with the source bars.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub rsi: IndicatorSeries,
    pub macd: IndicatorSeries,
    pub cci: IndicatorSeries,
    len: usize,
}

impl IndicatorFrame {
    /// Compute all three indicators over the bar series.
    ///
    /// Fails with `InsufficientHistory` when the series cannot produce a
    /// single fully-valid row, rather than emitting partially-defined
    /// indicators.
    pub fn compute(
        bars: &[OhlcvBar],
        config: &IndicatorConfig,
    ) -> Result<Self, SwingtraderError> {
        if bars.len() < config.min_bars() {
            return Err(SwingtraderError::InsufficientHistory {
                bars: bars.len(),
                minimum: config.min_bars(),
            });
        }

        Ok(IndicatorFrame {
            rsi: rsi::calculate_rsi(bars, config.rsi_period),
            macd: macd::calculate_macd(
                bars,
                config.macd_fast,
                config.macd_slow,
                config.macd_signal,
            ),
            cci: cci::calculate_cci(bars, config.cci_period),
            len: bars.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The frame row at `index`, or `None` while any indicator is warming up.
    pub fn entry(&self, index: usize) -> Option<FrameEntry> {
        let rsi_point = self.rsi.values.get(index)?;
        let macd_point = self.macd.values.get(index)?;
        let cci_point = self.cci.values.get(index)?;

        if !rsi_point.valid || !macd_point.valid || !cci_point.valid {
            return None;
        }

        let histogram = match macd_point.value {
            IndicatorValue::Macd { histogram, .. } => histogram,
            _ => return None,
        };

        Some(FrameEntry {
            rsi: rsi_point.value.simple(),
            macd_histogram: histogram,
            cci: cci_point.value.simple(),
        })
    }
}
