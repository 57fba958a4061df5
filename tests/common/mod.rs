#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use quarteredge::domain::backtest::TradingSession;
use quarteredge::domain::candle::Candle;
use quarteredge::domain::error::QuarterEdgeError;
use quarteredge::domain::order::Order;
use quarteredge::domain::strategy::Strategy;
use quarteredge::ports::data_port::DataPort;
use std::collections::VecDeque;
use std::io::Write;

pub struct MockDataPort {
    pub sessions: Vec<TradingSession>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(sessions: Vec<TradingSession>) -> Self {
        Self {
            sessions,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            sessions: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_sessions(&self) -> Result<Vec<TradingSession>, QuarterEdgeError> {
        if let Some(reason) = &self.error {
            return Err(QuarterEdgeError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.sessions.clone())
    }
}

/// Feeds back one scripted intent per pushed candle.
pub struct ScriptedStrategy {
    script: VecDeque<Option<Order>>,
    next: Option<Order>,
}

impl ScriptedStrategy {
    pub fn new(script: Vec<Option<Order>>) -> Self {
        Self {
            script: script.into(),
            next: None,
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn push(&mut self, _candle: &Candle) -> Result<(), QuarterEdgeError> {
        self.next = self.script.pop_front().flatten();
        Ok(())
    }

    fn poll_order(&mut self) -> Option<Order> {
        self.next.take()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn make_candle(date: NaiveDate, time: NaiveTime, ohlc: [f64; 4]) -> Candle {
    Candle {
        date,
        time,
        open: ohlc[0],
        high: ohlc[1],
        low: ohlc[2],
        close: ohlc[3],
        volume: 1000.0,
    }
}

/// A session of 5-minute candles starting at 09:30, closing at 16:55.
///
/// `closes` drive the intraday candles; each candle spans close ± 0.05 and
/// opens at the previous close.
pub fn make_session(day: NaiveDate, closes: &[f64]) -> TradingSession {
    let mut candles = Vec::with_capacity(closes.len() + 1);
    let mut prev = closes.first().copied().unwrap_or(100.0);
    let mut t = time(9, 30);
    for &close in closes {
        let high = prev.max(close) + 0.05;
        let low = prev.min(close) - 0.05;
        candles.push(make_candle(day, t, [prev, high, low, close]));
        prev = close;
        t += chrono::Duration::minutes(5);
    }
    candles.push(make_candle(
        day,
        time(16, 55),
        [prev, prev + 0.05, prev - 0.05, prev],
    ));
    TradingSession {
        date: day,
        candles,
    }
}

/// Renders sessions in the `date,time,o,h,l,c,v` CSV layout.
pub fn sessions_to_csv(sessions: &[TradingSession]) -> String {
    let mut out = String::new();
    for session in sessions {
        for c in &session.candles {
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                c.date.format("%Y-%m-%d"),
                c.time.format("%H:%M:%S"),
                c.open,
                c.high,
                c.low,
                c.close,
                c.volume
            ));
        }
    }
    out
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
