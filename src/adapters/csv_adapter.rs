//! CSV candle data adapter.
//!
//! Reads headerless rows of `date,time,open,high,low,close,volume`, where the
//! date and time may also share one field separated by a space. A session
//! ends on the row whose time equals the configured last-candle time.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::backtest::TradingSession;
use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::ports::config_port::parse_time_of_day;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
    last_candle_time: NaiveTime,
}

impl CsvAdapter {
    pub fn new(path: PathBuf, last_candle_time: NaiveTime) -> Self {
        Self {
            path,
            last_candle_time,
        }
    }
}

impl DataPort for CsvAdapter {
    fn load_sessions(&self) -> Result<Vec<TradingSession>, QuarterEdgeError> {
        let file = File::open(&self.path).map_err(|e| QuarterEdgeError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let sessions = parse_sessions(file, self.last_candle_time)?;
        debug!(path = %self.path.display(), sessions = sessions.len(), "loaded sessions");
        Ok(sessions)
    }
}

/// Groups rows into sessions, skipping rows that do not decode.
pub fn parse_sessions<R: Read>(
    reader: R,
    last_candle_time: NaiveTime,
) -> Result<Vec<TradingSession>, QuarterEdgeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sessions = Vec::new();
    let mut current: Vec<Candle> = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let line = index + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if e.is_io_error() {
                    return Err(QuarterEdgeError::Data {
                        reason: format!("CSV read error: {}", e),
                    });
                }
                warn!(line, error = %e, "skipping malformed row");
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        let candle = match parse_candle(&record) {
            Ok(candle) => candle,
            Err(reason) => {
                warn!(line, %reason, "skipping malformed row");
                continue;
            }
        };

        let closes_session = candle.time == last_candle_time;
        let date = candle.date;
        current.push(candle);
        if closes_session {
            sessions.push(TradingSession {
                date,
                candles: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        warn!(rows = current.len(), "dropping rows after the last complete session");
    }
    Ok(sessions)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

fn parse_price(record: &StringRecord, index: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(index)
        .ok_or_else(|| format!("missing {} column", name))?;
    raw.parse()
        .map_err(|e| format!("invalid {} value '{}': {}", name, raw, e))
}

fn parse_candle(record: &StringRecord) -> Result<Candle, String> {
    let (date_raw, time_raw, offset) = match record.len() {
        7 => (record.get(0), record.get(1), 2),
        6 => {
            let mut parts = record.get(0).unwrap_or_default().split_whitespace();
            (parts.next(), parts.next(), 1)
        }
        n => return Err(format!("expected 6 or 7 columns, found {}", n)),
    };

    let date_raw = date_raw.ok_or("missing date column")?;
    let time_raw = time_raw.ok_or("missing time column")?;
    let date = parse_date(date_raw).ok_or_else(|| format!("invalid date '{}'", date_raw))?;
    let time = parse_time_of_day(time_raw).ok_or_else(|| format!("invalid time '{}'", time_raw))?;

    Ok(Candle {
        date,
        time,
        open: parse_price(record, offset, "open")?,
        high: parse_price(record, offset + 1, "high")?,
        low: parse_price(record, offset + 2, "low")?,
        close: parse_price(record, offset + 3, "close")?,
        volume: parse_price(record, offset + 4, "volume")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn last() -> NaiveTime {
        NaiveTime::from_hms_opt(16, 55, 0).unwrap()
    }

    fn parse(content: &str) -> Vec<TradingSession> {
        parse_sessions(content.as_bytes(), last()).unwrap()
    }

    #[test]
    fn groups_rows_into_sessions() {
        let sessions = parse(
            "2024-01-02,09:30:00,70.1,70.5,70.0,70.2,1200\n\
             2024-01-02,09:35:00,70.2,70.6,70.1,70.4,900\n\
             2024-01-02,16:55:00,70.4,70.8,70.3,70.7,1500\n\
             2024-01-03,09:30:00,70.7,70.9,70.5,70.6,1000\n\
             2024-01-03,16:55:00,70.6,70.7,70.2,70.3,800\n",
        );
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(sessions[0].candles.len(), 3);
        assert_eq!(sessions[0].candles[1].close, 70.4);
        assert_eq!(sessions[0].candles[1].volume, 900.0);
        assert_eq!(sessions[1].candles.len(), 2);
    }

    #[test]
    fn accepts_combined_date_time_field() {
        let sessions = parse(
            "01/02/2024 09:30:00,70.1,70.5,70.0,70.2,1200\n\
             01/02/2024 16:55:00,70.4,70.8,70.3,70.7,1500\n",
        );
        assert_eq!(sessions.len(), 1);
        assert_eq!(
            sessions[0].candles[0].time,
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(sessions[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn session_date_is_the_closing_row_date() {
        let sessions = parse(
            "2024-01-02,18:00:00,70.1,70.5,70.0,70.2,1200\n\
             2024-01-03,16:55:00,70.4,70.8,70.3,70.7,1500\n",
        );
        assert_eq!(sessions[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(sessions[0].candles.len(), 2);
    }

    #[test]
    fn skips_malformed_rows() {
        let sessions = parse(
            "date,time,open,high,low,close,volume\n\
             2024-01-02,09:30:00,70.1,70.5,70.0,70.2,1200\n\
             2024-01-02,09:35:00,abc,70.6,70.1,70.4,900\n\
             2024-01-02,09:40:00,70.1\n\
             \n\
             2024-01-02,16:55:00,70.4,70.8,70.3,70.7,1500\n",
        );
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].candles.len(), 2);
    }

    #[test]
    fn drops_trailing_incomplete_session() {
        let sessions = parse(
            "2024-01-02,09:30:00,70.1,70.5,70.0,70.2,1200\n\
             2024-01-02,16:55:00,70.4,70.8,70.3,70.7,1500\n\
             2024-01-03,09:30:00,70.7,70.9,70.5,70.6,1000\n",
        );
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn load_sessions_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candles.csv");
        fs::write(
            &path,
            "2024-01-02,09:30,70.1,70.5,70.0,70.2,1200\n\
             2024-01-02,16:55,70.4,70.8,70.3,70.7,1500\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path, last());
        let sessions = adapter.load_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].candles.len(), 2);
    }

    #[test]
    fn load_sessions_missing_file_is_data_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/candles.csv"), last());
        let err = adapter.load_sessions().unwrap_err();
        assert!(matches!(err, QuarterEdgeError::Data { .. }));
    }
}
