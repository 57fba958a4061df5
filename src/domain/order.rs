//! Order intents and their lifecycle values.
//!
//! An [`Order`] is an immutable value. Each transition (fill, close, excursion
//! update) returns a new `Order`; the session replaces the previous value at
//! its position in the order list.

use chrono::NaiveTime;
use std::fmt;

use super::candle::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Active,
    ClosedTpHit,
    ClosedSlHit,
    ClosedManual,
    ClosedCanceled,
    ClosedUnknown,
}

impl OrderStatus {
    pub fn is_closed(self) -> bool {
        !matches!(self, OrderStatus::Pending | OrderStatus::Active)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Active => "ACTIVE",
            OrderStatus::ClosedTpHit => "CLOSED_TP_HIT",
            OrderStatus::ClosedSlHit => "CLOSED_SL_HIT",
            OrderStatus::ClosedManual => "CLOSED_MANUAL",
            OrderStatus::ClosedCanceled => "CLOSED_CANCELED",
            OrderStatus::ClosedUnknown => "CLOSED_UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Best and worst prices reached while an order was active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExcursionStats {
    pub maximum_favorable_price: f64,
    pub maximum_adverse_price: f64,
}

impl ExcursionStats {
    pub fn at(price: f64) -> Self {
        ExcursionStats {
            maximum_favorable_price: price,
            maximum_adverse_price: price,
        }
    }

    pub fn extended(self, direction: Direction, candle: &Candle) -> Self {
        match direction {
            Direction::Buy => ExcursionStats {
                maximum_favorable_price: self.maximum_favorable_price.max(candle.high),
                maximum_adverse_price: self.maximum_adverse_price.min(candle.low),
            },
            Direction::Sell => ExcursionStats {
                maximum_favorable_price: self.maximum_favorable_price.min(candle.low),
                maximum_adverse_price: self.maximum_adverse_price.max(candle.high),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_price: f64,
    /// `None` until the order is closed at a known price.
    pub close_price: Option<f64>,
    pub direction: Direction,
    pub start_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub status: OrderStatus,
    pub excursion: ExcursionStats,
}

impl Order {
    /// An order filled immediately at `entry_price`.
    pub fn market(
        direction: Direction,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        time: NaiveTime,
    ) -> Self {
        Order {
            stop_loss,
            take_profit,
            entry_price,
            close_price: None,
            direction,
            start_time: Some(time),
            close_time: None,
            status: OrderStatus::Active,
            excursion: ExcursionStats::at(entry_price),
        }
    }

    /// A resting order that fills once a candle trades through `entry_price`.
    pub fn pending(
        direction: Direction,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
    ) -> Self {
        Order {
            stop_loss,
            take_profit,
            entry_price,
            close_price: None,
            direction,
            start_time: None,
            close_time: None,
            status: OrderStatus::Pending,
            excursion: ExcursionStats::at(entry_price),
        }
    }

    pub fn activated(&self, time: NaiveTime) -> Self {
        Order {
            start_time: Some(time),
            status: OrderStatus::Active,
            ..self.clone()
        }
    }

    pub fn closed(&self, status: OrderStatus, close_price: Option<f64>, time: NaiveTime) -> Self {
        Order {
            close_price,
            close_time: Some(time),
            status,
            ..self.clone()
        }
    }

    pub fn with_excursion(&self, candle: &Candle) -> Self {
        Order {
            excursion: self.excursion.extended(self.direction, candle),
            ..self.clone()
        }
    }

    pub fn is_stop_loss_hit(&self, candle: &Candle) -> bool {
        candle.contains(self.stop_loss)
    }

    pub fn is_take_profit_hit(&self, candle: &Candle) -> bool {
        candle.contains(self.take_profit)
    }

    /// Price distance gained (positive) or lost (negative) at close.
    pub fn pnl(&self) -> Option<f64> {
        let close = self.close_price?;
        Some(match self.direction {
            Direction::Buy => close - self.entry_price,
            Direction::Sell => self.entry_price - close,
        })
    }

    /// Distance from entry to stop-loss.
    pub fn risk(&self) -> f64 {
        match self.direction {
            Direction::Buy => self.entry_price - self.stop_loss,
            Direction::Sell => self.stop_loss - self.entry_price,
        }
    }

    /// pnl / risk; `None` while unresolved or when no risk was taken.
    pub fn r_multiple(&self) -> Option<f64> {
        let risk = self.risk();
        if risk == 0.0 {
            return None;
        }
        self.pnl().map(|pnl| pnl / risk)
    }

    /// Best excursion relative to entry, capped at take-profit.
    pub fn favorable_excursion(&self) -> f64 {
        let best = self.excursion.maximum_favorable_price;
        match self.direction {
            Direction::Buy => best.min(self.take_profit) - self.entry_price,
            Direction::Sell => self.entry_price - best.max(self.take_profit),
        }
    }

    /// Worst excursion relative to entry, capped at stop-loss. Zero or negative.
    pub fn adverse_excursion(&self) -> f64 {
        let worst = self.excursion.maximum_adverse_price;
        match self.direction {
            Direction::Buy => worst.max(self.stop_loss) - self.entry_price,
            Direction::Sell => self.entry_price - worst.min(self.stop_loss),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} entry={:.2} sl={:.2} tp={:.2}",
            self.direction, self.status, self.entry_price, self.stop_loss, self.take_profit
        )?;
        if let Some(start) = self.start_time {
            write!(f, " start={start}")?;
        }
        if let Some(close) = self.close_price {
            write!(f, " close={close:.2}")?;
        }
        if let Some(time) = self.close_time {
            write!(f, " at={time}")?;
        }
        Ok(())
    }
}
