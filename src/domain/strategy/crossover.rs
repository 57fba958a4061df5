//! Moving-average crossover policy.
//!
//! Before each candle is ingested the strategy remembers whether the fast
//! average sat above the slow one. When the averages cross after the candle,
//! it emits a market order in the new direction with the stop-loss and
//! take-profit placed a fixed number of ticks from the close. Nothing is
//! emitted until both averages were valid before the current candle.

use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::domain::indicator::{ExponentialMovingAverage, Indicator, IndicatorType, MovingAverage};
use crate::domain::order::{Direction, Order};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AverageKind {
    #[default]
    Simple,
    Exponential,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub average: AverageKind,
    /// Price of one tick.
    pub increment: f64,
    pub stop_loss_ticks: f64,
    pub take_profit_ticks: f64,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        CrossoverParams {
            fast_period: 5,
            slow_period: 20,
            average: AverageKind::Simple,
            increment: 0.01,
            stop_loss_ticks: 10.0,
            take_profit_ticks: 15.0,
        }
    }
}

#[derive(Debug, Clone)]
enum Average {
    Simple(MovingAverage),
    Exponential(ExponentialMovingAverage),
}

impl Average {
    fn new(kind: AverageKind, period: usize) -> Self {
        match kind {
            AverageKind::Simple => Average::Simple(MovingAverage::new(period)),
            AverageKind::Exponential => Average::Exponential(ExponentialMovingAverage::new(period)),
        }
    }

    fn add(&mut self, candle: &Candle) {
        match self {
            Average::Simple(sma) => sma.add(candle),
            Average::Exponential(ema) => ema.add(candle),
        }
    }

    fn get(&self) -> Option<f64> {
        match self {
            Average::Simple(sma) => sma.get(),
            Average::Exponential(ema) => ema.get(),
        }
    }

    fn kind(&self) -> IndicatorType {
        match self {
            Average::Simple(sma) => sma.kind(),
            Average::Exponential(ema) => ema.kind(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    params: CrossoverParams,
    fast: Average,
    slow: Average,
    /// Fast above slow before the latest candle; `None` while warming up.
    bullish: Option<bool>,
    current: Option<Candle>,
}

impl MovingAverageCrossover {
    pub fn new(params: CrossoverParams) -> Self {
        MovingAverageCrossover {
            fast: Average::new(params.average, params.fast_period),
            slow: Average::new(params.average, params.slow_period),
            params,
            bullish: None,
            current: None,
        }
    }

    fn create_order(&self, direction: Direction, candle: &Candle) -> Order {
        let entry = candle.close;
        let stop = self.params.stop_loss_ticks * self.params.increment;
        let target = self.params.take_profit_ticks * self.params.increment;
        let (stop_loss, take_profit) = match direction {
            Direction::Buy => (entry - stop, entry + target),
            Direction::Sell => (entry + stop, entry - target),
        };
        Order::market(direction, entry, stop_loss, take_profit, candle.time)
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        match self.params.average {
            AverageKind::Simple => "SMA crossover",
            AverageKind::Exponential => "EMA crossover",
        }
    }

    fn push(&mut self, candle: &Candle) -> Result<(), QuarterEdgeError> {
        self.bullish = match (self.fast.get(), self.slow.get()) {
            (Some(fast), Some(slow)) => Some(fast > slow),
            _ => None,
        };
        self.fast.add(candle);
        self.slow.add(candle);
        self.current = Some(candle.clone());
        Ok(())
    }

    fn poll_order(&mut self) -> Option<Order> {
        let (Some(fast), Some(slow)) = (self.fast.get(), self.slow.get()) else {
            tracing::trace!(
                strategy = self.name(),
                fast = %self.fast.kind(),
                slow = %self.slow.kind(),
                "insufficient data"
            );
            return None;
        };
        let bullish = self.bullish?;
        let candle = self.current.as_ref()?;

        let direction = if bullish && fast < slow {
            Direction::Sell
        } else if !bullish && fast > slow {
            Direction::Buy
        } else {
            return None;
        };
        self.bullish = Some(direction == Direction::Buy);
        Some(self.create_order(direction, candle))
    }
}
