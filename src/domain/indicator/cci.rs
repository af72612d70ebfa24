//! CCI (Commodity Channel Index).
//!
//! CCI = (tp - SMA(tp, n)) / (0.015 * MAD), where tp is the typical price
//! (high + low + close) / 3 and MAD is the mean absolute deviation of tp
//! from its SMA over the same window. Warmup: first (n-1) bars are invalid.
//! A zero MAD (perfectly flat window) yields CCI 0.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

const LAMBERT_CONSTANT: f64 = 0.015;

pub fn calculate_cci(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Cci(period),
            values: Vec::new(),
        };
    }

    let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < period {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        let window = &typical[i + 1 - period..=i];
        let sma: f64 = window.iter().sum::<f64>() / period as f64;
        let mad: f64 = window.iter().map(|tp| (tp - sma).abs()).sum::<f64>() / period as f64;

        let cci = if mad == 0.0 {
            0.0
        } else {
            (typical[i] - sma) / (LAMBERT_CONSTANT * mad)
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(cci),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Cci(period),
        values,
    }
}
