//! Per-session order lifecycle.
//!
//! A [`BacktestSession`] replays one trading session's candles through a
//! [`Strategy`], appends every order intent it emits, and matches the open
//! orders against each later candle. Orders are values: each transition
//! replaces the order at its index.
//!
//! Per candle, after the strategy has seen it:
//! - the first candle of the session never polls or matches;
//! - a PENDING order whose entry lies in `[low, high]` becomes ACTIVE;
//! - an ACTIVE order that did not just open closes on SL, TP or both
//!   (`CLOSED_UNKNOWN`, no close price);
//! - on the last candle every open order is force-closed at the close,
//!   ACTIVE as `CLOSED_MANUAL` and PENDING as `CLOSED_CANCELED`.
//!
//! Orders emitted on a candle take part in that candle's forced close only.

use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, error, info};

use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Candles at this time only warm the strategy up.
    pub first_candle_time: NaiveTime,
    /// Candles at or after this time force-close every open order.
    pub last_candle_time: NaiveTime,
}

impl SessionConfig {
    pub fn is_first_candle(&self, candle: &Candle) -> bool {
        candle.time == self.first_candle_time
    }

    pub fn is_last_candle(&self, candle: &Candle) -> bool {
        candle.time >= self.last_candle_time
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            first_candle_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            last_candle_time: NaiveTime::from_hms_opt(16, 55, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Started,
    Completed,
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Pending => "PENDING",
            SessionStatus::Started => "STARTED",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

pub struct BacktestSession<'a> {
    strategy: &'a mut dyn Strategy,
    candles: &'a [Candle],
    config: SessionConfig,
    orders: Vec<Order>,
    status: SessionStatus,
    failure: Option<QuarterEdgeError>,
}

impl<'a> BacktestSession<'a> {
    pub fn new(
        strategy: &'a mut dyn Strategy,
        candles: &'a [Candle],
        config: SessionConfig,
    ) -> Self {
        BacktestSession {
            strategy,
            candles,
            config,
            orders: Vec::new(),
            status: SessionStatus::Pending,
            failure: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// The error that aborted the session, if it failed.
    pub fn failure(&self) -> Option<&QuarterEdgeError> {
        self.failure.as_ref()
    }

    pub fn into_parts(self) -> (SessionStatus, Vec<Order>, Option<QuarterEdgeError>) {
        (self.status, self.orders, self.failure)
    }

    /// Runs the session once. Does nothing unless the session is still PENDING.
    pub fn start(&mut self) {
        if self.status != SessionStatus::Pending {
            return;
        }
        self.status = SessionStatus::Started;
        let date = self.candles.first().map(|c| c.date);
        info!(
            ?date,
            candles = self.candles.len(),
            strategy = self.strategy.name(),
            "session started"
        );

        match self.run() {
            Ok(()) => {
                self.status = SessionStatus::Completed;
                info!(?date, orders = self.orders.len(), "session completed");
            }
            Err(e) => {
                error!(?date, orders = self.orders.len(), error = %e, "session failed");
                self.status = SessionStatus::Failed;
                self.failure = Some(e);
            }
        }
    }

    fn run(&mut self) -> Result<(), QuarterEdgeError> {
        let candles = self.candles;
        let mut previous: Option<NaiveDateTime> = None;

        for candle in candles {
            candle.validate()?;
            let stamp = candle.date.and_time(candle.time);
            match previous {
                Some(prev) if stamp < prev => {
                    return Err(QuarterEdgeError::OutOfOrder {
                        previous: prev.time(),
                        current: candle.time,
                    });
                }
                _ => {}
            }
            previous = Some(stamp);

            self.strategy.push(candle)?;
            if self.config.is_first_candle(candle) {
                continue;
            }

            let fresh = self.orders.len();
            if let Some(order) = self.strategy.poll_order() {
                debug!(index = fresh, order = %order, "new order intent");
                self.orders.push(order);
            }
            self.update_orders(candle, fresh);
        }
        Ok(())
    }

    fn update_orders(&mut self, candle: &Candle, fresh: usize) {
        let last = self.config.is_last_candle(candle);
        for index in 0..self.orders.len() {
            let current = &self.orders[index];
            let next = if index >= fresh {
                if last { force_close(current, candle) } else { None }
            } else {
                evaluate(current, candle, last)
            };
            if let Some(next) = next {
                if next.status != current.status {
                    debug!(
                        index,
                        from = %current.status,
                        to = %next.status,
                        price = ?next.close_price,
                        time = %candle.time,
                        "order transition"
                    );
                }
                self.orders[index] = next;
            }
        }
    }
}

/// The order's replacement after `candle`, `None` when unchanged.
fn evaluate(order: &Order, candle: &Candle, last: bool) -> Option<Order> {
    match order.status {
        OrderStatus::Pending if last => force_close(order, candle),
        OrderStatus::Pending if candle.contains(order.entry_price) => {
            Some(order.activated(candle.time))
        }
        OrderStatus::Pending => None,
        OrderStatus::Active => {
            let tracked = order.with_excursion(candle);
            let sl = tracked.is_stop_loss_hit(candle);
            let tp = tracked.is_take_profit_hit(candle);
            let next = match (sl, tp) {
                (true, true) => tracked.closed(OrderStatus::ClosedUnknown, None, candle.time),
                (true, false) => {
                    tracked.closed(OrderStatus::ClosedSlHit, Some(tracked.stop_loss), candle.time)
                }
                (false, true) => {
                    tracked.closed(OrderStatus::ClosedTpHit, Some(tracked.take_profit), candle.time)
                }
                (false, false) if last => {
                    tracked.closed(OrderStatus::ClosedManual, Some(candle.close), candle.time)
                }
                (false, false) => tracked,
            };
            Some(next)
        }
        _ => None,
    }
}

fn force_close(order: &Order, candle: &Candle) -> Option<Order> {
    let status = match order.status {
        OrderStatus::Pending => OrderStatus::ClosedCanceled,
        OrderStatus::Active => OrderStatus::ClosedManual,
        _ => return None,
    };
    Some(order.closed(status, Some(candle.close), candle.time))
}
