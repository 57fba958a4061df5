//! Streaming technical indicators.
//!
//! Every indicator ingests one candle at a time through [`Indicator::add`] and
//! reports its current value through [`Indicator::get`]. `get` returns `None`
//! until the indicator has observed its warm-up period; strategies must check
//! for it before acting.

pub mod atr;
pub mod defining_range;
pub mod ema;
pub mod sma;

use std::fmt;

use crate::domain::candle::Candle;

pub use atr::{AverageTrueRange, TrueRangeMode};
pub use defining_range::{DefiningRange, DefiningRangeSnapshot, RangeWindow};
pub use ema::ExponentialMovingAverage;
pub use sma::MovingAverage;

pub trait Indicator {
    type Output;

    fn add(&mut self, candle: &Candle);

    fn get(&self) -> Option<Self::Output>;

    fn kind(&self) -> IndicatorType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Atr(usize),
    DefiningRange,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::DefiningRange => write!(f, "DR"),
        }
    }
}

/// Rounds to two decimals, ties away from zero (half up for prices).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
