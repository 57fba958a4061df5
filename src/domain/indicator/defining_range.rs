//! Defining Range (DR) and Implied Defining Range (IDR).
//!
//! Within `[start, end)` the indicator tracks the high/low of price (DR) and
//! of closing price (IDR). The first candle at or after `end` freezes the
//! range into a [`DefiningRangeSnapshot`]. From then on every candle whose
//! open or close lies outside `[dr_low, dr_high]` latches a breakout
//! direction that holds until the next session resets the indicator.
//!
//! A new session is detected when a candle's time precedes `start` or its
//! date differs from the previous candle's date.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::candle::Candle;
use crate::domain::indicator::{Indicator, IndicatorType};
use crate::domain::order::Direction;

/// Intraday window `[start, end)` that forms the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RangeWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }
}

impl Default for RangeWindow {
    fn default() -> Self {
        RangeWindow {
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(10, 30, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefiningRangeSnapshot {
    pub dr_high: f64,
    pub dr_low: f64,
    pub idr_high: f64,
    pub idr_low: f64,
}

impl DefiningRangeSnapshot {
    fn seeded(candle: &Candle) -> Self {
        DefiningRangeSnapshot {
            dr_high: candle.high,
            dr_low: candle.low,
            idr_high: candle.close,
            idr_low: candle.close,
        }
    }

    fn extended(self, candle: &Candle) -> Self {
        DefiningRangeSnapshot {
            dr_high: self.dr_high.max(candle.high),
            dr_low: self.dr_low.min(candle.low),
            idr_high: self.idr_high.max(candle.close),
            idr_low: self.idr_low.min(candle.close),
        }
    }

    /// Direction of `price` relative to the DR, `None` when inside it.
    pub fn breakout_of(&self, price: f64) -> Option<Direction> {
        if price > self.dr_high {
            Some(Direction::Buy)
        } else if price < self.dr_low {
            Some(Direction::Sell)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct DefiningRange {
    window: RangeWindow,
    forming: Option<DefiningRangeSnapshot>,
    frozen: Option<DefiningRangeSnapshot>,
    breakout: Option<Direction>,
    last_date: Option<NaiveDate>,
}

impl DefiningRange {
    pub fn new(window: RangeWindow) -> Self {
        DefiningRange {
            window,
            forming: None,
            frozen: None,
            breakout: None,
            last_date: None,
        }
    }

    pub fn breakout(&self) -> Option<Direction> {
        self.breakout
    }

    fn reset(&mut self) {
        self.forming = None;
        self.frozen = None;
        self.breakout = None;
    }

    fn latch_breakout(&mut self, candle: &Candle) {
        if self.breakout.is_some() {
            return;
        }
        if let Some(range) = self.frozen {
            self.breakout = range
                .breakout_of(candle.close)
                .or_else(|| range.breakout_of(candle.open));
        }
    }
}

impl Indicator for DefiningRange {
    type Output = DefiningRangeSnapshot;

    fn add(&mut self, candle: &Candle) {
        let new_date = self.last_date.is_some_and(|d| d != candle.date);
        self.last_date = Some(candle.date);
        if candle.time < self.window.start || new_date {
            self.reset();
        }

        if self.frozen.is_none() {
            if self.window.contains(candle.time) {
                self.forming = Some(match self.forming {
                    Some(range) => range.extended(candle),
                    None => DefiningRangeSnapshot::seeded(candle),
                });
            } else if candle.time >= self.window.end {
                self.frozen = self.forming;
            }
        }

        self.latch_breakout(candle);
    }

    fn get(&self) -> Option<DefiningRangeSnapshot> {
        self.frozen
    }

    fn kind(&self) -> IndicatorType {
        IndicatorType::DefiningRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> RangeWindow {
        RangeWindow {
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }
    }

    fn bar(day: u32, h: u32, m: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn formed_range() -> DefiningRange {
        let mut dr = DefiningRange::new(window());
        dr.add(&bar(2, 9, 30, 100.0, 101.0, 99.0, 100.5));
        dr.add(&bar(2, 9, 45, 100.5, 102.0, 99.5, 101.5));
        dr.add(&bar(2, 10, 0, 101.5, 101.8, 100.0, 101.0));
        dr
    }

    #[test]
    fn unavailable_before_window_closes() {
        let mut dr = DefiningRange::new(window());
        assert_eq!(dr.get(), None);
        dr.add(&bar(2, 9, 30, 100.0, 101.0, 99.0, 100.5));
        dr.add(&bar(2, 9, 45, 100.5, 102.0, 99.5, 101.5));
        assert_eq!(dr.get(), None);
        assert_eq!(dr.breakout(), None);
    }

    #[test]
    fn freezes_at_window_end() {
        let dr = formed_range();
        let snapshot = dr.get().unwrap();
        assert_eq!(snapshot.dr_high, 102.0);
        assert_eq!(snapshot.dr_low, 99.0);
        assert_eq!(snapshot.idr_high, 101.5);
        assert_eq!(snapshot.idr_low, 100.5);
    }

    #[test]
    fn frozen_range_ignores_later_candles() {
        let mut dr = formed_range();
        dr.add(&bar(2, 10, 15, 101.0, 150.0, 50.0, 101.0));
        assert_eq!(dr.get().unwrap().dr_high, 102.0);
        assert_eq!(dr.get().unwrap().dr_low, 99.0);
    }

    #[test]
    fn breakout_above_latches_buy() {
        let mut dr = formed_range();
        assert_eq!(dr.breakout(), None);
        dr.add(&bar(2, 10, 5, 101.0, 103.0, 100.8, 102.5));
        assert_eq!(dr.breakout(), Some(Direction::Buy));
    }

    #[test]
    fn breakout_below_latches_sell_on_open() {
        let mut dr = formed_range();
        dr.add(&bar(2, 10, 5, 98.5, 100.0, 98.0, 99.5));
        assert_eq!(dr.breakout(), Some(Direction::Sell));
    }

    #[test]
    fn breakout_latch_persists_for_the_session() {
        let mut dr = formed_range();
        dr.add(&bar(2, 10, 5, 101.0, 103.0, 100.8, 102.5));
        dr.add(&bar(2, 10, 10, 100.0, 100.5, 99.5, 100.0));
        dr.add(&bar(2, 10, 15, 99.0, 99.5, 97.0, 97.5));
        assert_eq!(dr.breakout(), Some(Direction::Buy));
        assert!(dr.breakout().is_some());
    }

    #[test]
    fn candle_before_start_resets() {
        let mut dr = formed_range();
        dr.add(&bar(2, 10, 5, 101.0, 103.0, 100.8, 102.5));
        dr.add(&bar(2, 9, 0, 100.0, 100.5, 99.5, 100.0));
        assert_eq!(dr.get(), None);
        assert_eq!(dr.breakout(), None);
    }

    #[test]
    fn new_date_resets_and_forms_fresh_range() {
        let mut dr = formed_range();
        dr.add(&bar(2, 10, 5, 101.0, 103.0, 100.8, 102.5));
        dr.add(&bar(3, 9, 30, 200.0, 201.0, 199.0, 200.0));
        assert_eq!(dr.get(), None);
        assert_eq!(dr.breakout(), None);
        dr.add(&bar(3, 10, 0, 200.0, 200.5, 199.5, 200.0));
        assert_eq!(dr.get().unwrap().dr_high, 201.0);
    }

    #[test]
    fn no_candles_in_window_never_forms() {
        let mut dr = DefiningRange::new(window());
        dr.add(&bar(2, 10, 5, 101.0, 103.0, 100.8, 102.5));
        assert_eq!(dr.get(), None);
        assert_eq!(dr.breakout(), None);
    }

    #[test]
    fn freezing_candle_can_break_out() {
        let mut dr = DefiningRange::new(window());
        dr.add(&bar(2, 9, 30, 100.0, 101.0, 99.0, 100.5));
        dr.add(&bar(2, 10, 0, 100.5, 104.0, 100.0, 103.0));
        assert_eq!(dr.get().unwrap().dr_high, 101.0);
        assert_eq!(dr.breakout(), Some(Direction::Buy));
    }
}
