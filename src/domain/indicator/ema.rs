//! Exponential Moving Average over closing prices.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA = C*k + EMA_prev*(1-k). The running value is kept unrounded;
//! `get` rounds to 2 decimals.

use crate::domain::candle::Candle;
use crate::domain::indicator::{Indicator, IndicatorType, round2};

#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    k: f64,
    seen: usize,
    seed_sum: f64,
    ema: Option<f64>,
}

impl ExponentialMovingAverage {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        ExponentialMovingAverage {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seen: 0,
            seed_sum: 0.0,
            ema: None,
        }
    }
}

impl Indicator for ExponentialMovingAverage {
    type Output = f64;

    fn add(&mut self, candle: &Candle) {
        match self.ema {
            Some(prev) => {
                self.ema = Some(candle.close * self.k + prev * (1.0 - self.k));
            }
            None => {
                self.seen += 1;
                self.seed_sum += candle.close;
                if self.seen == self.period {
                    self.ema = Some(self.seed_sum / self.period as f64);
                }
            }
        }
    }

    fn get(&self) -> Option<f64> {
        self.ema.map(round2)
    }

    fn kind(&self) -> IndicatorType {
        IndicatorType::Ema(self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn candle_with_close(close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    fn feed(ema: &mut ExponentialMovingAverage, closes: &[f64]) {
        for &c in closes {
            ema.add(&candle_with_close(c));
        }
    }

    #[test]
    fn ema_warmup() {
        let mut ema = ExponentialMovingAverage::new(3);
        assert_eq!(ema.get(), None);
        feed(&mut ema, &[10.0, 20.0]);
        assert_eq!(ema.get(), None);
        feed(&mut ema, &[30.0]);
        assert!(ema.get().is_some());
    }

    #[test]
    fn ema_seed_is_sma() {
        let mut ema = ExponentialMovingAverage::new(3);
        feed(&mut ema, &[0.0, 2.0, 2.0]);
        assert_eq!(ema.get(), Some(1.33));
    }

    #[test]
    fn ema_recursive_calculation() {
        let mut ema = ExponentialMovingAverage::new(3);
        feed(&mut ema, &[10.0, 20.0, 30.0, 40.0, 50.0]);
        // seed 20, k = 0.5 → 30 → 40
        assert_eq!(ema.get(), Some(40.0));
    }

    #[test]
    fn ema_keeps_unrounded_state() {
        let mut ema = ExponentialMovingAverage::new(3);
        feed(&mut ema, &[0.0, 2.0, 2.0, 2.0]);
        // 4/3 * 0.5 + 1 = 1.6666.. (a rounded seed would give 1.665)
        assert_eq!(ema.get(), Some(1.67));
    }

    #[test]
    fn ema_period_1_follows_close() {
        let mut ema = ExponentialMovingAverage::new(1);
        feed(&mut ema, &[10.0]);
        assert_eq!(ema.get(), Some(10.0));
        feed(&mut ema, &[12.5]);
        assert_eq!(ema.get(), Some(12.5));
    }

    #[test]
    fn ema_equal_prices() {
        let mut ema = ExponentialMovingAverage::new(4);
        feed(&mut ema, &[100.0; 10]);
        assert_eq!(ema.get(), Some(100.0));
    }

    #[test]
    fn ema_kind() {
        assert_eq!(ExponentialMovingAverage::new(5).kind(), IndicatorType::Ema(5));
    }
}
