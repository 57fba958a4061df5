//! INI file configuration adapter.

use crate::domain::error::QuarterEdgeError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuarterEdgeError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuarterEdgeError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuarterEdgeError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuarterEdgeError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String> {
        self.config.getint(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String> {
        self.config.getfloat(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[data]
path = data/CL_5min.csv

[session]
first_candle_time = 09:30:00
last_candle_time = 16:55

[strategy]
kind = quarter_edge
atr_period = 14
increment = 0.01

[backtest]
parallel = yes
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("data/CL_5min.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "kind"),
            Some("quarter_edge".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("strategy", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_reads_value_missing_or_malformed() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("strategy", "atr_period"), Ok(Some(14)));
        assert_eq!(adapter.get_int("strategy", "missing"), Ok(None));
        assert!(adapter.get_int("strategy", "kind").is_err());
    }

    #[test]
    fn get_double_reads_value_missing_or_malformed() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("strategy", "increment"), Ok(Some(0.01)));
        assert_eq!(adapter.get_double("strategy", "missing"), Ok(None));
        assert!(adapter.get_double("data", "path").is_err());
    }

    #[test]
    fn get_bool_parses_words_and_digits() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\na = true\nb = no\nc = 1\nd = maybe\n")
                .unwrap();
        assert!(adapter.get_bool("backtest", "a", false));
        assert!(!adapter.get_bool("backtest", "b", true));
        assert!(adapter.get_bool("backtest", "c", false));
        assert!(adapter.get_bool("backtest", "d", true));
        assert!(!adapter.get_bool("backtest", "missing", false));
    }

    #[test]
    fn get_time_accepts_short_form() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_time("session", "last_candle_time"),
            Ok(NaiveTime::from_hms_opt(16, 55, 0))
        );
        assert_eq!(
            adapter.get_time("session", "first_candle_time"),
            Ok(NaiveTime::from_hms_opt(9, 30, 0))
        );
        assert_eq!(adapter.get_time("session", "missing"), Ok(None));
        assert!(adapter.get_time("data", "path").is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert!(adapter.get_bool("backtest", "parallel", false));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(QuarterEdgeError::ConfigParse { .. })));
    }
}
