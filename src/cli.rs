//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{SessionOutcome, run_sessions, run_sessions_parallel};
use crate::domain::config_validation::{RunSettings, load_run_settings, validate_run_config};
use crate::domain::error::QuarterEdgeError;
use crate::domain::order::OrderStatus;
use crate::domain::performance::Performance;
use crate::domain::strategy::{StrategyKind, build_strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "quarteredge", about = "Intraday strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over every session in the data file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle CSV, overriding [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy kind, overriding [strategy] kind
        #[arg(short, long)]
        strategy: Option<StrategyKind>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
        } => run_backtest(&config, data, strategy),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> Result<(), QuarterEdgeError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let settings = validate_run_config(&adapter)?;
    println!(
        "Configuration valid: strategy {}, session {}-{}, {} run",
        settings.strategy.kind,
        settings.session.first_candle_time,
        settings.session.last_candle_time,
        if settings.parallel { "parallel" } else { "sequential" },
    );
    Ok(())
}

/// Resolves overrides on top of the loaded config.
pub fn resolve_settings(
    config: &dyn ConfigPort,
    data_override: Option<PathBuf>,
    kind_override: Option<StrategyKind>,
) -> Result<(RunSettings, PathBuf), QuarterEdgeError> {
    let mut settings = load_run_settings(config)?;
    if let Some(kind) = kind_override {
        settings.strategy.kind = kind;
    }
    let path = data_override
        .or_else(|| settings.data.path.clone())
        .ok_or_else(|| QuarterEdgeError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok((settings, path))
}

/// Loads every session, runs it and aggregates the result.
pub fn run_pipeline(
    data: &dyn DataPort,
    settings: &RunSettings,
) -> Result<(Vec<SessionOutcome>, Performance), QuarterEdgeError> {
    let sessions = data.load_sessions()?;
    if sessions.is_empty() {
        return Err(QuarterEdgeError::Data {
            reason: "no complete sessions in data".into(),
        });
    }
    info!(
        sessions = sessions.len(),
        strategy = %settings.strategy.kind,
        parallel = settings.parallel,
        "running backtest"
    );

    let outcomes = if settings.parallel {
        let strategy = &settings.strategy;
        run_sessions_parallel(&sessions, || build_strategy(strategy), &settings.session)
    } else {
        let mut strategy = build_strategy(&settings.strategy);
        run_sessions(&sessions, strategy.as_mut(), &settings.session)
    };

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    if failed > 0 {
        warn!(failed, "some sessions failed; their partial orders are still scored");
    }

    let performance = Performance::compute(&outcomes, &settings.performance);
    Ok((outcomes, performance))
}

/// One line per session: date, status, order count and a status breakdown.
pub fn render_outcomes(outcomes: &[SessionOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let count = |status: OrderStatus| {
            outcome
                .orders
                .iter()
                .filter(|o| o.status == status)
                .count()
        };
        let _ = write!(
            out,
            "{} {} orders={} tp={} sl={} manual={} canceled={} unknown={}",
            outcome.date,
            outcome.status,
            outcome.orders.len(),
            count(OrderStatus::ClosedTpHit),
            count(OrderStatus::ClosedSlHit),
            count(OrderStatus::ClosedManual),
            count(OrderStatus::ClosedCanceled),
            count(OrderStatus::ClosedUnknown),
        );
        if let Some(failure) = &outcome.failure {
            let _ = write!(out, " error=\"{failure}\"");
        }
        out.push('\n');
    }
    out
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<PathBuf>,
    kind_override: Option<StrategyKind>,
) -> Result<(), QuarterEdgeError> {
    info!(config = %config_path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let (settings, data_path) = resolve_settings(&adapter, data_override, kind_override)?;

    info!(data = %data_path.display(), "loading candles");
    let data = CsvAdapter::new(data_path, settings.data.last_candle_time);
    let (outcomes, performance) = run_pipeline(&data, &settings)?;

    print!("{}", render_outcomes(&outcomes));
    println!();
    print!("{performance}");
    Ok(())
}
