//! Defining-range breakout policy with quarter-level entries.
//!
//! Once the session's defining range has frozen, a breakout has latched and
//! the ATR is warm, the strategy places one resting order per session at the
//! quarter level inside the range nearest to the breakout close. Stop-loss and
//! take-profit sit one ATR either side of the entry.

use chrono::NaiveTime;

use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::domain::indicator::{
    AverageTrueRange, DefiningRange, Indicator, RangeWindow, TrueRangeMode,
};
use crate::domain::levels::nearest_quarter_level;
use crate::domain::order::{Direction, Order};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct QuarterEdgeParams {
    pub atr_period: usize,
    pub true_range: TrueRangeMode,
    pub increment: f64,
    pub range: RangeWindow,
    /// No new orders at or after this time; the once-per-session flag clears here.
    pub last_candle_time: NaiveTime,
}

impl Default for QuarterEdgeParams {
    fn default() -> Self {
        QuarterEdgeParams {
            atr_period: 14,
            true_range: TrueRangeMode::Wilder,
            increment: 0.01,
            range: RangeWindow::default(),
            last_candle_time: NaiveTime::from_hms_opt(16, 55, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuarterEdgeStrategy {
    params: QuarterEdgeParams,
    atr: AverageTrueRange,
    range: DefiningRange,
    ordered: bool,
    current: Option<Candle>,
}

impl QuarterEdgeStrategy {
    pub fn new(params: QuarterEdgeParams) -> Self {
        QuarterEdgeStrategy {
            atr: AverageTrueRange::with_mode(params.atr_period, params.true_range),
            range: DefiningRange::new(params.range),
            params,
            ordered: false,
            current: None,
        }
    }
}

impl Strategy for QuarterEdgeStrategy {
    fn name(&self) -> &str {
        "Quarter edge"
    }

    fn push(&mut self, candle: &Candle) -> Result<(), QuarterEdgeError> {
        self.atr.add(candle);
        self.range.add(candle);
        if candle.time >= self.params.last_candle_time {
            self.ordered = false;
        }
        self.current = Some(candle.clone());
        Ok(())
    }

    fn poll_order(&mut self) -> Option<Order> {
        if self.ordered {
            return None;
        }
        let candle = self.current.as_ref()?;
        if candle.time >= self.params.last_candle_time {
            return None;
        }
        let snapshot = self.range.get()?;
        let direction = self.range.breakout()?;
        let Some(atr) = self.atr.get() else {
            tracing::trace!(
                strategy = self.name(),
                indicator = %self.atr.kind(),
                "insufficient data"
            );
            return None;
        };

        let Some(entry) = nearest_quarter_level(
            snapshot.dr_low,
            snapshot.dr_high,
            self.params.increment,
            candle.close,
        ) else {
            tracing::trace!(
                dr_low = snapshot.dr_low,
                dr_high = snapshot.dr_high,
                "no quarter level inside the defining range"
            );
            return None;
        };

        let (stop_loss, take_profit) = match direction {
            Direction::Buy => (entry - atr, entry + atr),
            Direction::Sell => (entry + atr, entry - atr),
        };
        self.ordered = true;
        Some(Order::pending(direction, entry, stop_loss, take_profit))
    }
}
