//! Average True Range (Wilder).
//!
//! The first n True Range values are buffered and their simple average seeds
//! the ATR. Afterwards ATR = (ATR_prev*(n-1) + TR) / n. Both the seed and every
//! update are rounded to 2 decimals.

use crate::domain::candle::Candle;
use crate::domain::indicator::{Indicator, IndicatorType, round2};
use crate::domain::window::RollingWindow;

/// How a single candle's True Range is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrueRangeMode {
    /// max(h-l, |h-prev_close|, |l-prev_close|); h-l for the very first candle.
    #[default]
    Wilder,
    /// max(h-l, h-close, l-close) against the candle's own close.
    SameBar,
}

#[derive(Debug, Clone)]
pub struct AverageTrueRange {
    period: usize,
    mode: TrueRangeMode,
    ranges: RollingWindow,
    prev_close: Option<f64>,
    atr: Option<f64>,
}

impl AverageTrueRange {
    pub fn new(period: usize) -> Self {
        Self::with_mode(period, TrueRangeMode::default())
    }

    pub fn with_mode(period: usize, mode: TrueRangeMode) -> Self {
        let ranges = RollingWindow::new(period);
        AverageTrueRange {
            period: ranges.capacity(),
            mode,
            ranges,
            prev_close: None,
            atr: None,
        }
    }

    fn true_range(&self, candle: &Candle) -> f64 {
        match self.mode {
            TrueRangeMode::Wilder => match self.prev_close {
                Some(prev_close) => candle.true_range(prev_close),
                None => candle.high - candle.low,
            },
            TrueRangeMode::SameBar => candle.same_bar_true_range(),
        }
    }
}

impl Indicator for AverageTrueRange {
    type Output = f64;

    fn add(&mut self, candle: &Candle) {
        let tr = self.true_range(candle);
        self.prev_close = Some(candle.close);
        self.ranges.push(tr);

        let n = self.period as f64;
        self.atr = match self.atr {
            Some(prev) => Some(round2((prev * (n - 1.0) + tr) / n)),
            None if self.ranges.is_full() => Some(round2(self.ranges.sum() / n)),
            None => None,
        };
    }

    fn get(&self) -> Option<f64> {
        self.atr
    }

    fn kind(&self) -> IndicatorType {
        IndicatorType::Atr(self.period)
    }
}
