//! Stock Simulator - a multi-stage buy/hold/sell decision survey
//!
//! Participants walk through a fixed sequence of stock-price scenarios. Each
//! completed session gets a randomly drawn terminal price and is appended to
//! a flat CSV log that an instructor can download.

pub mod api;
pub mod chart;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod recorder;
pub mod render;
pub mod scenario;
pub mod session;
pub mod survey;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, SurveyError};
pub use recorder::{FixedDraw, Outcome, OutcomeRecord, OutcomeRecorder, PriceDraw, SeededDraw};
pub use scenario::ScenarioProfile;
pub use session::{Choice, Session};
pub use survey::{SessionView, SurveyService};

#[cfg(test)]
mod survey_tests;
