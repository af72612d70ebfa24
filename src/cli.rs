//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::backtest::BacktestConfig;
use crate::domain::config_validation::validate_all;
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::{IndicatorConfig, IndicatorFrame};
use crate::domain::ohlcv::validate_series;
use crate::domain::optimizer::{optimize, DelayGrid, Objective};
use crate::domain::resample::{resample, ResampleRule};
use crate::domain::signal::{generate_signals, SignalConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "swingtrader", about = "Multi-indicator swing-trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full backtest pipeline
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Ticker symbol to fetch from the remote quote provider
        #[arg(short, long)]
        symbol: Option<String>,
        /// Date range as START:END (END defaults to today)
        #[arg(short, long)]
        date_range: Option<String>,
        /// CSV price history instead of a remote fetch
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Bar frequency: daily, weekly or monthly
        #[arg(short, long)]
        resample: Option<String>,
        /// Report file; the report prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            symbol,
            date_range,
            input,
            resample,
            output,
        } => run_backtest(
            config.as_ref(),
            symbol.as_deref(),
            date_range.as_deref(),
            input.as_ref(),
            resample.as_deref(),
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, SwingtraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| SwingtraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("{} is valid", config_path.display());
    ExitCode::SUCCESS
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    symbol_override: Option<&str>,
    date_range: Option<&str>,
    input: Option<&PathBuf>,
    resample_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    match run_backtest_inner(
        config_path,
        symbol_override,
        date_range,
        input,
        resample_override,
        output_path,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_inner(
    config_path: Option<&PathBuf>,
    symbol_override: Option<&str>,
    date_range: Option<&str>,
    input: Option<&PathBuf>,
    resample_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> Result<(), SwingtraderError> {
    // Stage 1: Load and validate config
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_all(&adapter)?;

    // Stage 2: Resolve data source, dates and resample rule
    let input = input
        .cloned()
        .or_else(|| adapter.get_string("data", "input").map(PathBuf::from));

    let symbol = resolve_symbol(symbol_override, &adapter, input.as_ref())?;
    let (start_date, end_date) = resolve_date_range(date_range, &adapter)?;
    let rule = resolve_resample_rule(resample_override, &adapter)?;

    // Stage 3: Build domain configs
    let indicator_config = build_indicator_config(&adapter);
    let signal_config = build_signal_config(&adapter);
    let grid = build_delay_grid(&adapter);
    let objective = build_objective(&adapter)?;
    let backtest_config = build_backtest_config(&adapter);

    // Stage 4: Fetch bars
    let data_port: Box<dyn DataPort> = match &input {
        Some(path) => {
            eprintln!("Reading price history from {}", path.display());
            Box::new(CsvAdapter::new(path.clone()))
        }
        None => {
            eprintln!("Fetching {} from Yahoo Finance", symbol);
            Box::new(YahooAdapter::new())
        }
    };
    let daily = data_port.fetch_ohlcv(&symbol, start_date, end_date)?;
    if daily.is_empty() {
        return Err(SwingtraderError::EmptySeries);
    }
    validate_series(&daily)?;

    // Stage 5: Resample and run the core pipeline
    let bars = resample(&daily, rule);
    eprintln!(
        "Backtesting {}: {} daily bars, {} after resample, {} to {}",
        symbol,
        daily.len(),
        bars.len(),
        start_date,
        end_date
    );

    let frame = IndicatorFrame::compute(&bars, &indicator_config)?;
    let raw_signals = generate_signals(&frame, &signal_config)?;

    eprintln!(
        "Searching {} delay combinations ({})",
        grid.len(),
        match objective {
            Objective::TotalReturn => "total return",
            Objective::SharpeRatio => "sharpe ratio",
            Objective::WinRate => "win rate",
        }
    );
    let outcome = optimize(
        &bars,
        &raw_signals,
        &grid,
        objective,
        &backtest_config,
        rule.periods_per_year(),
    )?;

    // Stage 6: Report
    let metrics = &outcome.metrics;
    eprintln!();
    eprintln!(
        "Best delays:     entry {}, exit {}",
        outcome.entry_delay, outcome.exit_delay
    );
    eprintln!("Total Return:    {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:      {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:    {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:    -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:    {}", metrics.total_trades);
    eprintln!("Win Rate:        {:.1}%", metrics.win_rate * 100.0);

    match output_path {
        Some(path) => {
            let report = TextReportAdapter;
            report.write(
                &symbol,
                &outcome,
                path.to_str().ok_or_else(|| SwingtraderError::InvalidConfiguration {
                    reason: "output path is not valid UTF-8".into(),
                })?,
            )?;
            eprintln!("\nReport written to: {}", path.display());
        }
        None => {
            print!("{}", TextReportAdapter::render(&symbol, &outcome));
        }
    }

    Ok(())
}

fn resolve_symbol(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
    input: Option<&PathBuf>,
) -> Result<String, SwingtraderError> {
    if let Some(symbol) = symbol_override {
        return Ok(symbol.to_string());
    }
    if let Some(symbol) = adapter.get_string("data", "symbol") {
        return Ok(symbol);
    }
    // A CSV run can name the series after the file.
    if let Some(path) = input {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            return Ok(stem.to_uppercase());
        }
    }
    Err(SwingtraderError::ConfigMissing {
        section: "data".into(),
        key: "symbol".into(),
    })
}

fn resolve_date_range(
    date_range: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<(NaiveDate, NaiveDate), SwingtraderError> {
    let today = chrono::Local::now().date_naive();

    let (start, end) = match date_range {
        Some(range) => parse_date_range(range, today)?,
        None => {
            let start = match adapter.get_string("data", "start_date") {
                Some(s) => parse_date(&s, "start_date")?,
                None => NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid default date"),
            };
            let end = match adapter.get_string("data", "end_date") {
                Some(s) => parse_date(&s, "end_date")?,
                None => today,
            };
            (start, end)
        }
    };

    if start >= end {
        return Err(SwingtraderError::InvalidConfiguration {
            reason: format!("start date {} is not before end date {}", start, end),
        });
    }
    Ok((start, end))
}

/// "START:END" with END optional; an omitted END means today.
fn parse_date_range(
    range: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), SwingtraderError> {
    let (start_str, end_str) = range.split_once(':').unwrap_or((range, ""));
    let start = parse_date(start_str, "date_range start")?;
    let end = if end_str.is_empty() {
        today
    } else {
        parse_date(end_str, "date_range end")?
    };
    Ok((start, end))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, SwingtraderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SwingtraderError::InvalidConfiguration {
            reason: format!("invalid {} '{}' (expected YYYY-MM-DD)", field, value),
        }
    })
}

fn resolve_resample_rule(
    resample_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<ResampleRule, SwingtraderError> {
    match resample_override {
        Some(rule) => rule.parse(),
        None => match adapter.get_string("data", "resample") {
            Some(rule) => rule.parse(),
            None => Ok(ResampleRule::Weekly),
        },
    }
}

pub fn build_indicator_config(adapter: &dyn ConfigPort) -> IndicatorConfig {
    let defaults = IndicatorConfig::default();
    IndicatorConfig {
        rsi_period: adapter.get_int("indicators", "rsi_period", defaults.rsi_period as i64)
            as usize,
        macd_fast: adapter.get_int("indicators", "macd_fast", defaults.macd_fast as i64) as usize,
        macd_slow: adapter.get_int("indicators", "macd_slow", defaults.macd_slow as i64) as usize,
        macd_signal: adapter.get_int("indicators", "macd_signal", defaults.macd_signal as i64)
            as usize,
        cci_period: adapter.get_int("indicators", "cci_period", defaults.cci_period as i64)
            as usize,
    }
}

pub fn build_signal_config(adapter: &dyn ConfigPort) -> SignalConfig {
    let defaults = SignalConfig::default();
    SignalConfig {
        rsi_oversold: adapter.get_double("signals", "rsi_oversold", defaults.rsi_oversold),
        rsi_overbought: adapter.get_double("signals", "rsi_overbought", defaults.rsi_overbought),
        cci_oversold: adapter.get_double("signals", "cci_oversold", defaults.cci_oversold),
        cci_overbought: adapter.get_double("signals", "cci_overbought", defaults.cci_overbought),
        min_votes: adapter.get_int("signals", "min_votes", defaults.min_votes as i64) as usize,
    }
}

pub fn build_delay_grid(adapter: &dyn ConfigPort) -> DelayGrid {
    let max_entry = adapter.get_int("optimizer", "max_entry_delay", 5) as usize;
    let max_exit = adapter.get_int("optimizer", "max_exit_delay", 5) as usize;
    DelayGrid::up_to(max_entry, max_exit)
}

pub fn build_objective(adapter: &dyn ConfigPort) -> Result<Objective, SwingtraderError> {
    match adapter.get_string("optimizer", "objective") {
        Some(objective) => objective.parse(),
        None => Ok(Objective::TotalReturn),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        commission_pct: adapter.get_double("backtest", "commission_pct", defaults.commission_pct),
        stop_loss_pct: adapter.get_double("backtest", "stop_loss_pct", defaults.stop_loss_pct),
        take_profit_pct: adapter.get_double(
            "backtest",
            "take_profit_pct",
            defaults.take_profit_pct,
        ),
        max_holding_bars: adapter.get_int(
            "backtest",
            "max_holding_bars",
            defaults.max_holding_bars as i64,
        ) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_with_both_ends() {
        let (start, end) =
            parse_date_range("2020-01-01:2024-06-30", date(2026, 8, 7)).unwrap();
        assert_eq!(start, date(2020, 1, 1));
        assert_eq!(end, date(2024, 6, 30));
    }

    #[test]
    fn date_range_open_end_is_today() {
        let today = date(2026, 8, 7);
        let (_, end) = parse_date_range("2020-01-01:", today).unwrap();
        assert_eq!(end, today);

        let (_, end) = parse_date_range("2020-01-01", today).unwrap();
        assert_eq!(end, today);
    }

    #[test]
    fn bad_date_range_is_rejected() {
        assert!(parse_date_range("01/01/2020:2024-06-30", date(2026, 8, 7)).is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = adapter("[data]\nstart_date = 2024-01-01\nend_date = 2020-01-01\n");
        assert!(resolve_date_range(None, &config).is_err());
    }

    #[test]
    fn cli_range_overrides_config() {
        let config = adapter("[data]\nstart_date = 2010-01-01\nend_date = 2011-01-01\n");
        let (start, end) =
            resolve_date_range(Some("2020-01-01:2021-01-01"), &config).unwrap();
        assert_eq!(start, date(2020, 1, 1));
        assert_eq!(end, date(2021, 1, 1));
    }

    #[test]
    fn symbol_falls_back_to_input_stem() {
        let config = FileConfigAdapter::empty();
        let input = PathBuf::from("/data/msft.csv");
        let symbol = resolve_symbol(None, &config, Some(&input)).unwrap();
        assert_eq!(symbol, "MSFT");
    }

    #[test]
    fn missing_symbol_without_input_errors() {
        let config = FileConfigAdapter::empty();
        let err = resolve_symbol(None, &config, None).unwrap_err();
        assert!(matches!(err, SwingtraderError::ConfigMissing { .. }));
    }

    #[test]
    fn resample_defaults_to_weekly() {
        let config = FileConfigAdapter::empty();
        assert_eq!(
            resolve_resample_rule(None, &config).unwrap(),
            ResampleRule::Weekly
        );
    }

    #[test]
    fn indicator_config_reads_overrides() {
        let config = adapter("[indicators]\nrsi_period = 7\ncci_period = 10\n");
        let built = build_indicator_config(&config);
        assert_eq!(built.rsi_period, 7);
        assert_eq!(built.cci_period, 10);
        assert_eq!(built.macd_slow, 26);
    }

    #[test]
    fn signal_config_defaults_match_strategy() {
        let built = build_signal_config(&FileConfigAdapter::empty());
        assert_eq!(built, SignalConfig::default());
    }

    #[test]
    fn delay_grid_from_config() {
        let config = adapter("[optimizer]\nmax_entry_delay = 2\nmax_exit_delay = 1\n");
        let grid = build_delay_grid(&config);
        assert_eq!(grid.entry_delays, vec![0, 1, 2]);
        assert_eq!(grid.exit_delays, vec![0, 1]);
    }

    #[test]
    fn backtest_config_reads_overrides() {
        let config = adapter(
            "[backtest]\ninitial_capital = 50000\ncommission_pct = 0.2\nmax_holding_bars = 16\n",
        );
        let built = build_backtest_config(&config);
        assert_eq!(built.initial_capital, 50_000.0);
        assert_eq!(built.commission_pct, 0.2);
        assert_eq!(built.max_holding_bars, 16);
    }
}
