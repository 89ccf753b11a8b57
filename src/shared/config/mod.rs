pub mod global;
pub mod model;

pub use global::CONFIG;
pub use model::{
    DirectDictionaryConfig, LoggingConfig, ScanConfig, Settings, TimestampGranularity,
    load_settings,
};
