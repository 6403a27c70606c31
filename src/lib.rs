// Re-export from sub-crates
pub use murmur_api::{
    ApiError, CorrectionClient, CorrectionConfig, TranscriptionBody, TranscriptionClient,
    TranscriptionConfig,
};
pub use murmur_core::{API_KEY_ENV, APP_NAME, Config, ConfigManager, DEFAULT_LOG_LEVEL};

// App-specific modules
pub mod pipeline;
pub mod progress;
pub mod report;
