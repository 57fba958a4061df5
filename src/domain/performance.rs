//! Performance aggregation over completed sessions.
//!
//! Canceled and never-filled orders are ignored. Every other order is scored
//! by its r-multiple; orders without one (closed with an unknown price, or
//! zero risk) are counted as unresolved and left out of every ratio. A trade
//! wins when its pnl is strictly positive; breakeven counts as a loss.

use std::fmt;

use crate::domain::order::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceConfig {
    pub starting_balance: f64,
    /// Fraction of equity risked per trade.
    pub risk_per_trade: f64,
    pub trading_days_per_year: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            starting_balance: 100_000.0,
            risk_per_trade: 0.01,
            trading_days_per_year: 252.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub wins: usize,
    pub losses: usize,
    pub unresolved: usize,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub avg_win_r: Option<f64>,
    pub avg_loss_r: Option<f64>,
    pub avg_mfe: f64,
    pub avg_mae: f64,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    /// Largest peak-to-trough drop of the compounded equity curve, in currency.
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: Option<f64>,
    pub expectancy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Performance {
    NoOrders,
    Report(PerformanceReport),
}

/// A resolved trade.
struct Scored {
    r: f64,
    win: bool,
    mfe: f64,
    mae: f64,
}

enum Classified {
    Ignored,
    Unresolved,
    Scored(Scored),
}

fn classify(order: &Order) -> Classified {
    if matches!(order.status, OrderStatus::ClosedCanceled | OrderStatus::Pending) {
        return Classified::Ignored;
    }
    match (order.pnl(), order.r_multiple()) {
        (Some(pnl), Some(r)) => Classified::Scored(Scored {
            r,
            win: pnl > 0.0,
            mfe: order.favorable_excursion(),
            mae: order.adverse_excursion(),
        }),
        _ => Classified::Unresolved,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn max_streaks(trades: &[Scored]) -> (usize, usize) {
    let mut max_win = 0;
    let mut max_loss = 0;
    let mut current = 0;
    let mut previous: Option<bool> = None;
    for trade in trades {
        current = if previous == Some(trade.win) { current + 1 } else { 1 };
        previous = Some(trade.win);
        if trade.win {
            max_win = max_win.max(current);
        } else {
            max_loss = max_loss.max(current);
        }
    }
    (max_win, max_loss)
}

/// (absolute, percent of peak) over an equity curve compounding r at the risk fraction.
fn max_drawdown(trades: &[Scored], config: &PerformanceConfig) -> (f64, f64) {
    let mut equity = config.starting_balance;
    let mut peak = equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;
    for trade in trades {
        equity += trade.r * equity * config.risk_per_trade;
        peak = peak.max(equity);
        let dd = peak - equity;
        max_dd = max_dd.max(dd);
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak * 100.0);
        }
    }
    (max_dd, max_dd_pct)
}

fn sharpe_ratio(daily_returns: &[f64], trading_days_per_year: f64) -> Option<f64> {
    if daily_returns.len() < 2 {
        return None;
    }
    let avg = mean(daily_returns)?;
    let n = daily_returns.len() as f64;
    let variance = daily_returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();
    if stddev > 0.0 {
        Some(avg / stddev * trading_days_per_year.sqrt())
    } else {
        None
    }
}

impl Performance {
    /// Aggregates the order lists of one or more sessions, in session order.
    pub fn compute<S: AsRef<[Order]>>(sessions: &[S], config: &PerformanceConfig) -> Self {
        let mut trades = Vec::new();
        let mut daily_returns = Vec::with_capacity(sessions.len());
        let mut unresolved = 0;

        for session in sessions {
            let mut daily = 0.0;
            for order in session.as_ref() {
                match classify(order) {
                    Classified::Ignored => {}
                    Classified::Unresolved => unresolved += 1,
                    Classified::Scored(trade) => {
                        daily += trade.r * config.risk_per_trade;
                        trades.push(trade);
                    }
                }
            }
            daily_returns.push(daily);
        }

        if trades.is_empty() {
            return Performance::NoOrders;
        }

        let win_rs: Vec<f64> = trades.iter().filter(|t| t.win).map(|t| t.r).collect();
        let loss_rs: Vec<f64> = trades.iter().filter(|t| !t.win).map(|t| t.r).collect();
        let wins = win_rs.len();
        let losses = loss_rs.len();
        let total = trades.len() as f64;
        let win_rate = wins as f64 / total;
        let loss_rate = losses as f64 / total;

        let avg_win_r = mean(&win_rs);
        let avg_loss_r = mean(&loss_rs);
        let expectancy = match (avg_win_r, avg_loss_r) {
            (Some(w), Some(l)) => Some(win_rate * w - loss_rate * l.abs()),
            _ => None,
        };

        let mfes: Vec<f64> = trades.iter().map(|t| t.mfe).collect();
        let maes: Vec<f64> = trades.iter().map(|t| t.mae).collect();
        let (max_win_streak, max_loss_streak) = max_streaks(&trades);
        let (max_drawdown, max_drawdown_pct) = max_drawdown(&trades, config);

        Performance::Report(PerformanceReport {
            wins,
            losses,
            unresolved,
            win_rate,
            loss_rate,
            avg_win_r,
            avg_loss_r,
            avg_mfe: mean(&mfes).unwrap_or(0.0),
            avg_mae: mean(&maes).unwrap_or(0.0),
            max_win_streak,
            max_loss_streak,
            max_drawdown,
            max_drawdown_pct,
            sharpe_ratio: sharpe_ratio(&daily_returns, config.trading_days_per_year),
            expectancy,
        })
    }
}

struct Maybe(Option<f64>);

impl fmt::Display for Maybe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.2}"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = match self {
            Performance::NoOrders => {
                return writeln!(f, "No orders to calculate performance metrics.");
            }
            Performance::Report(r) => r,
        };
        writeln!(f, "Wins: {}", r.wins)?;
        writeln!(f, "Losses: {}", r.losses)?;
        writeln!(f, "Unresolved: {}", r.unresolved)?;
        writeln!(f, "Win Rate: {:.2}%", r.win_rate * 100.0)?;
        writeln!(f, "Avg Win R: {}", Maybe(r.avg_win_r))?;
        writeln!(f, "Avg Loss R: {}", Maybe(r.avg_loss_r))?;
        writeln!(f, "Avg MFE: {:.2}", r.avg_mfe)?;
        writeln!(f, "Avg MAE: {:.2}", r.avg_mae)?;
        writeln!(f, "Max Win Streak: {}", r.max_win_streak)?;
        writeln!(f, "Max Loss Streak: {}", r.max_loss_streak)?;
        writeln!(f, "Max Drawdown: {:.2}", r.max_drawdown)?;
        writeln!(f, "Max Drawdown %: {:.2}", r.max_drawdown_pct)?;
        writeln!(f, "Sharpe Ratio: {}", Maybe(r.sharpe_ratio))?;
        writeln!(f, "Expectancy: {}", Maybe(r.expectancy))
    }
}
