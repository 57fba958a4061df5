//! Multi-session backtest runner.
//!
//! Sessions are independent. Sequential runs share one strategy so indicator
//! state carries across days; parallel runs build a fresh strategy per
//! session and return outcomes in session order.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::domain::order::Order;
use crate::domain::session::{BacktestSession, SessionConfig, SessionStatus};
use crate::domain::strategy::Strategy;

/// One trading day's candles, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingSession {
    pub date: NaiveDate,
    pub candles: Vec<Candle>,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub date: NaiveDate,
    pub status: SessionStatus,
    pub orders: Vec<Order>,
    pub failure: Option<QuarterEdgeError>,
}

impl SessionOutcome {
    pub fn is_failed(&self) -> bool {
        self.status == SessionStatus::Failed
    }
}

impl AsRef<[Order]> for SessionOutcome {
    fn as_ref(&self) -> &[Order] {
        &self.orders
    }
}

fn run_one(
    strategy: &mut dyn Strategy,
    session: &TradingSession,
    config: SessionConfig,
) -> SessionOutcome {
    let mut backtest = BacktestSession::new(strategy, &session.candles, config);
    backtest.start();
    let (status, orders, failure) = backtest.into_parts();
    SessionOutcome {
        date: session.date,
        status,
        orders,
        failure,
    }
}

pub fn run_sessions(
    sessions: &[TradingSession],
    strategy: &mut dyn Strategy,
    config: &SessionConfig,
) -> Vec<SessionOutcome> {
    sessions
        .iter()
        .map(|session| run_one(strategy, session, *config))
        .collect()
}

pub fn run_sessions_parallel<F>(
    sessions: &[TradingSession],
    factory: F,
    config: &SessionConfig,
) -> Vec<SessionOutcome>
where
    F: Fn() -> Box<dyn Strategy> + Sync,
{
    sessions
        .par_iter()
        .map(|session| {
            let mut strategy = factory();
            run_one(strategy.as_mut(), session, *config)
        })
        .collect()
}
