//! Simple Moving Average over closing prices.
//!
//! SMA(n) = sum of the last n closes / n, rounded to 2 decimals.
//! Warmup: unavailable until n closes have been seen.

use crate::domain::candle::Candle;
use crate::domain::indicator::{Indicator, IndicatorType, round2};
use crate::domain::window::RollingWindow;

#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    window: RollingWindow,
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        let window = RollingWindow::new(period);
        MovingAverage {
            period: window.capacity(),
            window,
        }
    }
}

impl Indicator for MovingAverage {
    type Output = f64;

    fn add(&mut self, candle: &Candle) {
        self.window.push(candle.close);
    }

    fn get(&self) -> Option<f64> {
        if !self.window.is_full() {
            return None;
        }
        Some(round2(self.window.sum() / self.period as f64))
    }

    fn kind(&self) -> IndicatorType {
        IndicatorType::Sma(self.period)
    }
}
