use chrono::NaiveDateTime;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
    pub direct_dictionary: DirectDictionaryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Buffer size of the reader wrapped around the segment stream
    pub read_buffer_size: usize,
    pub verify_header_crc: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            verify_header_crc: true,
        }
    }
}

pub const DEFAULT_READ_BUFFER_SIZE: usize = 65536;

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampGranularity {
    Second,
    Minute,
    Hour,
    Day,
}

impl TimestampGranularity {
    pub fn millis(&self) -> i64 {
        match self {
            TimestampGranularity::Second => 1_000,
            TimestampGranularity::Minute => 60_000,
            TimestampGranularity::Hour => 3_600_000,
            TimestampGranularity::Day => 86_400_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectDictionaryConfig {
    /// Lower bound of the timestamp surrogate space, `%Y-%m-%d %H:%M:%S` in UTC
    pub timestamp_cutoff: String,
    pub timestamp_granularity: TimestampGranularity,
}

impl Default for DirectDictionaryConfig {
    fn default() -> Self {
        Self {
            timestamp_cutoff: DEFAULT_TIMESTAMP_CUTOFF.to_string(),
            timestamp_granularity: TimestampGranularity::Second,
        }
    }
}

pub const DEFAULT_TIMESTAMP_CUTOFF: &str = "1970-01-01 00:00:00";

impl DirectDictionaryConfig {
    pub fn cutoff_millis(&self) -> Result<i64, chrono::ParseError> {
        let cutoff = NaiveDateTime::parse_from_str(&self.timestamp_cutoff, "%Y-%m-%d %H:%M:%S")?;
        Ok(cutoff.and_utc().timestamp_millis())
    }
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path =
        env::var("SEGMENT_STREAM_CONFIG").unwrap_or_else(|_| "config/segment_stream".to_string());

    let settings: Settings = config::Config::builder()
        .set_default("scan.read_buffer_size", DEFAULT_READ_BUFFER_SIZE as i64)?
        .set_default("scan.verify_header_crc", true)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .set_default("direct_dictionary.timestamp_cutoff", DEFAULT_TIMESTAMP_CUTOFF)?
        .set_default("direct_dictionary.timestamp_granularity", "second")?
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(config::Environment::with_prefix("SEGMENT_STREAM").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
