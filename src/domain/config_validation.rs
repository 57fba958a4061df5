//! Configuration loading and validation.
//!
//! Every key is read, parsed and range-checked before a run. Missing keys
//! fall back to their defaults; present but malformed keys are errors.

use std::path::PathBuf;

use chrono::NaiveTime;

use crate::domain::error::QuarterEdgeError;
use crate::domain::indicator::{RangeWindow, TrueRangeMode};
use crate::domain::performance::PerformanceConfig;
use crate::domain::session::SessionConfig;
use crate::domain::strategy::{
    AverageKind, CrossoverParams, QuarterEdgeParams, StrategyKind, StrategySettings,
};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
    pub last_candle_time: NaiveTime,
}

/// Everything a backtest run needs, typed and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data: DataSettings,
    pub session: SessionConfig,
    pub strategy: StrategySettings,
    pub performance: PerformanceConfig,
    pub parallel: bool,
}

/// Loads every section; `[data] path` may be absent.
pub fn load_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, QuarterEdgeError> {
    let session = load_session(config)?;
    let range = load_range(config)?;
    let data = load_data(config, &session)?;
    let strategy = load_strategy(config, range, session.last_candle_time)?;
    let performance = load_performance(config)?;
    let parallel = config.get_bool("backtest", "parallel", false);
    Ok(RunSettings {
        data,
        session,
        strategy,
        performance,
        parallel,
    })
}

/// Full validation for a standalone config, including the data path.
pub fn validate_run_config(config: &dyn ConfigPort) -> Result<RunSettings, QuarterEdgeError> {
    let settings = load_run_settings(config)?;
    if settings.data.path.is_none() {
        return Err(missing("data", "path"));
    }
    Ok(settings)
}

fn missing(section: &str, key: &str) -> QuarterEdgeError {
    QuarterEdgeError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuarterEdgeError {
    QuarterEdgeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, QuarterEdgeError> {
    config
        .get_int(section, key)
        .map(|value| value.unwrap_or(default))
        .map_err(|reason| invalid(section, key, format!("expected an integer: {}", reason)))
}

fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, QuarterEdgeError> {
    config
        .get_double(section, key)
        .map(|value| value.unwrap_or(default))
        .map_err(|reason| invalid(section, key, format!("expected a number: {}", reason)))
}

fn read_time(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: NaiveTime,
) -> Result<NaiveTime, QuarterEdgeError> {
    config
        .get_time(section, key)
        .map(|value| value.unwrap_or(default))
        .map_err(|reason| invalid(section, key, reason))
}

/// `[data] last_candle_time` defaults to the session's and may not precede it.
fn load_data(
    config: &dyn ConfigPort,
    session: &SessionConfig,
) -> Result<DataSettings, QuarterEdgeError> {
    let path = match config.get_string("data", "path") {
        Some(p) if p.trim().is_empty() => return Err(invalid("data", "path", "path is empty")),
        Some(p) => Some(PathBuf::from(p.trim())),
        None => None,
    };
    let last_candle_time =
        read_time(config, "data", "last_candle_time", session.last_candle_time)?;
    if last_candle_time < session.last_candle_time {
        return Err(invalid(
            "data",
            "last_candle_time",
            format!(
                "data sessions end at {} before the session's last candle at {}",
                last_candle_time, session.last_candle_time
            ),
        ));
    }
    Ok(DataSettings {
        path,
        last_candle_time,
    })
}

fn load_session(config: &dyn ConfigPort) -> Result<SessionConfig, QuarterEdgeError> {
    let defaults = SessionConfig::default();
    let first_candle_time =
        read_time(config, "session", "first_candle_time", defaults.first_candle_time)?;
    let last_candle_time =
        read_time(config, "session", "last_candle_time", defaults.last_candle_time)?;
    if first_candle_time >= last_candle_time {
        return Err(invalid(
            "session",
            "first_candle_time",
            "first_candle_time must be before last_candle_time",
        ));
    }
    Ok(SessionConfig {
        first_candle_time,
        last_candle_time,
    })
}

fn load_range(config: &dyn ConfigPort) -> Result<RangeWindow, QuarterEdgeError> {
    let defaults = RangeWindow::default();
    let start = read_time(config, "session", "range_start", defaults.start)?;
    let end = read_time(config, "session", "range_end", defaults.end)?;
    if start >= end {
        return Err(invalid(
            "session",
            "range_start",
            "range_start must be before range_end",
        ));
    }
    Ok(RangeWindow { start, end })
}

fn parse_true_range(raw: &str) -> Option<TrueRangeMode> {
    match raw.trim().to_lowercase().as_str() {
        "wilder" => Some(TrueRangeMode::Wilder),
        "same_bar" => Some(TrueRangeMode::SameBar),
        _ => None,
    }
}

fn positive_period(value: i64, key: &str) -> Result<usize, QuarterEdgeError> {
    if value < 1 {
        return Err(invalid("strategy", key, format!("{} must be at least 1", key)));
    }
    Ok(value as usize)
}

fn positive(value: f64, section: &str, key: &str) -> Result<f64, QuarterEdgeError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(section, key, format!("{} must be positive", key)));
    }
    Ok(value)
}

fn load_strategy(
    config: &dyn ConfigPort,
    range: RangeWindow,
    last_candle_time: NaiveTime,
) -> Result<StrategySettings, QuarterEdgeError> {
    let crossover_defaults = CrossoverParams::default();
    let edge_defaults = QuarterEdgeParams::default();

    let kind = match config.get_string("strategy", "kind") {
        None => StrategyKind::MaCrossover,
        Some(raw) => raw
            .parse::<StrategyKind>()
            .map_err(|reason| invalid("strategy", "kind", reason))?,
    };

    let fast_period = positive_period(
        read_int(config, "strategy", "fast_period", crossover_defaults.fast_period as i64)?,
        "fast_period",
    )?;
    let slow_period = positive_period(
        read_int(config, "strategy", "slow_period", crossover_defaults.slow_period as i64)?,
        "slow_period",
    )?;
    if fast_period >= slow_period {
        return Err(invalid(
            "strategy",
            "fast_period",
            "fast_period must be less than slow_period",
        ));
    }
    let atr_period = positive_period(
        read_int(config, "strategy", "atr_period", edge_defaults.atr_period as i64)?,
        "atr_period",
    )?;
    let increment = positive(
        read_double(config, "strategy", "increment", crossover_defaults.increment)?,
        "strategy",
        "increment",
    )?;
    let stop_loss_ticks = positive(
        read_double(config, "strategy", "stop_loss_ticks", crossover_defaults.stop_loss_ticks)?,
        "strategy",
        "stop_loss_ticks",
    )?;
    let take_profit_ticks = positive(
        read_double(
            config,
            "strategy",
            "take_profit_ticks",
            crossover_defaults.take_profit_ticks,
        )?,
        "strategy",
        "take_profit_ticks",
    )?;
    let true_range = match config.get_string("strategy", "true_range") {
        None => edge_defaults.true_range,
        Some(raw) => parse_true_range(&raw).ok_or_else(|| {
            invalid("strategy", "true_range", format!("unknown true range mode '{}'", raw.trim()))
        })?,
    };

    let average = match kind {
        StrategyKind::EmaCrossover => AverageKind::Exponential,
        _ => AverageKind::Simple,
    };

    Ok(StrategySettings {
        kind,
        crossover: CrossoverParams {
            fast_period,
            slow_period,
            average,
            increment,
            stop_loss_ticks,
            take_profit_ticks,
        },
        quarter_edge: QuarterEdgeParams {
            atr_period,
            true_range,
            increment,
            range,
            last_candle_time,
        },
    })
}

fn load_performance(config: &dyn ConfigPort) -> Result<PerformanceConfig, QuarterEdgeError> {
    let defaults = PerformanceConfig::default();
    let risk_per_trade =
        read_double(config, "performance", "risk_per_trade", defaults.risk_per_trade)?;
    if !(risk_per_trade > 0.0 && risk_per_trade <= 1.0) {
        return Err(invalid(
            "performance",
            "risk_per_trade",
            "risk_per_trade must be in (0, 1]",
        ));
    }
    let trading_days_per_year = positive(
        read_double(
            config,
            "performance",
            "trading_days_per_year",
            defaults.trading_days_per_year,
        )?,
        "performance",
        "trading_days_per_year",
    )?;
    let starting_balance = positive(
        read_double(config, "performance", "starting_balance", defaults.starting_balance)?,
        "performance",
        "starting_balance",
    )?;
    Ok(PerformanceConfig {
        starting_balance,
        risk_per_trade,
        trading_days_per_year,
    })
}
