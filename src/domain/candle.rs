//! Intraday OHLCV candle representation.

use chrono::{NaiveDate, NaiveTime};

use super::error::QuarterEdgeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// True when `price` lies within [low, high], bounds included.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// max(high - low, high - close, low - close), measured against this candle's own close.
    pub fn same_bar_true_range(&self) -> f64 {
        let hl = self.high - self.low;
        let hc = self.high - self.close;
        let lc = self.low - self.close;
        hl.max(hc).max(lc)
    }

    /// Rejects candles the session loop cannot reason about.
    pub fn validate(&self) -> Result<(), QuarterEdgeError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(QuarterEdgeError::InvalidCandle {
                time: self.time,
                reason: "non-finite price".into(),
            });
        }
        if self.high < self.low {
            return Err(QuarterEdgeError::InvalidCandle {
                time: self.time,
                reason: format!("high {} below low {}", self.high, self.low),
            });
        }
        Ok(())
    }
}
