//! Bar frequency resampling.
//!
//! Aggregation rule: open = first, high = max, low = min, close = last,
//! volume = sum. The resampled bar keeps the date of the last source bar in
//! its bucket, so output dates always exist in the input and stay strictly
//! increasing.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::str::FromStr;

use super::error::SwingtraderError;
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleRule {
    Daily,
    /// Friday-anchored trading weeks.
    Weekly,
    /// Calendar months.
    Monthly,
}

impl ResampleRule {
    /// Annualization factor for the risk-adjusted return ratio.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            ResampleRule::Daily => 252.0,
            ResampleRule::Weekly => 52.0,
            ResampleRule::Monthly => 12.0,
        }
    }

    /// Bucket key: bars sharing a key collapse into one resampled bar.
    fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            ResampleRule::Daily => date,
            ResampleRule::Weekly => {
                let days_to_friday =
                    (Weekday::Fri.num_days_from_monday() + 7 - date.weekday().num_days_from_monday())
                        % 7;
                date + Duration::days(days_to_friday as i64)
            }
            ResampleRule::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .expect("first of month is always valid"),
        }
    }
}

impl FromStr for ResampleRule {
    type Err = SwingtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(ResampleRule::Daily),
            "weekly" | "w" | "w-fri" => Ok(ResampleRule::Weekly),
            "monthly" | "m" => Ok(ResampleRule::Monthly),
            other => Err(SwingtraderError::InvalidConfiguration {
                reason: format!("unknown resample rule '{}'", other),
            }),
        }
    }
}

/// Collapse a sorted daily series into the configured frequency.
pub fn resample(bars: &[OhlcvBar], rule: ResampleRule) -> Vec<OhlcvBar> {
    if rule == ResampleRule::Daily || bars.is_empty() {
        return bars.to_vec();
    }

    let mut out: Vec<OhlcvBar> = Vec::new();
    let mut current_bucket: Option<NaiveDate> = None;

    for bar in bars {
        let bucket = rule.bucket(bar.date);
        if current_bucket == Some(bucket) {
            if let Some(agg) = out.last_mut() {
                agg.date = bar.date;
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
        } else {
            current_bucket = Some(bucket);
            out.push(bar.clone());
        }
    }

    out
}
