//! Application-wide constants
//!
//! Scenario prices, draw probabilities and the on-disk log format live here so
//! the two scenario profiles and the recorder agree on them.

/// Scenario constants shared by both profiles
pub mod scenario {
    /// Number of decision stages; stage == STAGE_COUNT is terminal
    pub const STAGE_COUNT: usize = 4;

    /// Historical price path shown before the terminal draw
    pub const PRICE_PREFIX: [u32; 5] = [125, 100, 90, 100, 110];

    /// Probability that the terminal draw lands on the up price
    pub const UP_PROBABILITY: f64 = 0.55;

    /// Terminal price when the draw misses
    pub const HOLD_PRICE: u32 = 100;

    /// Terminal up price for the classroom profile
    pub const CLASSROOM_UP_PRICE: u32 = 120;

    /// Terminal up price for the self-paced profile
    pub const SELF_PACED_UP_PRICE: u32 = 115;
}

/// Response log format
pub mod log_format {
    pub const HEADER: [&str; 3] = ["timestamp", "choices", "final_price"];

    /// Local wall-clock format for the timestamp column
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub const EXPORT_FILE_NAME: &str = "responses.csv";
    pub const EXPORT_MIME: &str = "text/csv";
}

/// Defaults used when config.yaml leaves a field out
pub mod defaults {
    pub const BIND_ADDR: &str = "0.0.0.0:3000";
    pub const LOG_PATH: &str = "responses.csv";
    pub const INSTRUCTOR_SECRET: &str = "mysecret123";
    pub const LOG_LEVEL: &str = "info";
    /// Sessions untouched for this long are dropped on the next session start
    pub const SESSION_IDLE_SECS: u64 = 3600;
    pub const CONFIG_PATH: &str = "config.yaml";
    pub const CONFIG_ENV: &str = "SURVEY_CONFIG";
}

/// Logging event names for structured logging
pub mod events {
    pub const SESSION_STARTED: &str = "session_started";
    pub const STAGE_ADVANCED: &str = "stage_advanced";
    pub const SESSION_COMPLETED: &str = "session_completed";
    pub const SESSION_RESET: &str = "session_reset";
    pub const SESSIONS_EVICTED: &str = "sessions_evicted";
    pub const EXPORT_GRANTED: &str = "export_granted";
    pub const EXPORT_DENIED: &str = "export_denied";
}
