//! Configuration access port.

use chrono::NaiveTime;

/// Typed getters return `Ok(None)` for a missing key and `Err` with the
/// reason for a present but malformed one.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Time of day as `HH:MM:SS` or `HH:MM`.
    fn get_time(&self, section: &str, key: &str) -> Result<Option<NaiveTime>, String> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => parse_time_of_day(&raw).map(Some).ok_or_else(|| {
                format!("expected time as HH:MM or HH:MM:SS, got '{}'", raw.trim())
            }),
        }
    }
}

pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
