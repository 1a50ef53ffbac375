use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    constants::{events, log_format},
    error::{Result, SurveyError},
    scenario::ScenarioProfile,
    session::{Choice, Session},
};

/// Source of uniform draws in [0, 1) for the terminal coin flip.
pub trait PriceDraw: Send {
    fn next_unit(&mut self) -> f64;
}

/// Fresh thread-local randomness on every draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadDraw;

impl PriceDraw for ThreadDraw {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible draws from a fixed seed.
#[derive(Clone, Debug)]
pub struct SeededDraw(StdRng);

impl SeededDraw {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl PriceDraw for SeededDraw {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays the given values in order, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct FixedDraw {
    values: Vec<f64>,
    next: usize,
}

impl FixedDraw {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl PriceDraw for FixedDraw {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

/// One row of the response log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub choices: Vec<Choice>,
    pub final_price: u32,
}

impl OutcomeRecord {
    pub fn now(choices: Vec<Choice>, final_price: u32) -> Self {
        Self {
            timestamp: Local::now().format(log_format::TIMESTAMP_FORMAT).to_string(),
            choices,
            final_price,
        }
    }
}

/// Result of a finished session as shown to the participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub final_price: u32,
    pub path: Vec<u32>,
    pub record: OutcomeRecord,
}

/// `['Buy', 'Hold', 'Sell']`
pub fn format_choices(choices: &[Choice]) -> String {
    let items: Vec<String> = choices.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", items.join(", "))
}

pub fn parse_choices(literal: &str) -> Result<Vec<Choice>> {
    let inner = literal
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| SurveyError::InvalidChoice(literal.to_string()))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|token| token.trim().trim_matches(|c| c == '\'' || c == '"').parse())
        .collect()
}

/// Appends one row per completed session to a flat CSV file.
///
/// Rows are built in memory and written with a single `write_all` while
/// holding a process-wide lock, so concurrent completions never interleave.
#[derive(Clone)]
pub struct OutcomeRecorder {
    log_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl OutcomeRecorder {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Draw the terminal price for a completed session and log it.
    ///
    /// Runs at most once per terminal episode: a session that already holds
    /// an outcome gets that outcome back without a new draw or a new row.
    pub fn finalize(
        &self,
        session: &mut Session,
        profile: ScenarioProfile,
        draw: &mut dyn PriceDraw,
    ) -> Result<Outcome> {
        if let Some(outcome) = session.outcome() {
            return Ok(outcome.clone());
        }
        if !session.is_terminal() {
            return Err(SurveyError::NotTerminal {
                stage: session.stage(),
                total: profile.stage_count(),
            });
        }

        let r = draw.next_unit();
        let final_price = profile.terminal_price(r);
        let record = OutcomeRecord::now(session.choices().to_vec(), final_price);
        self.append(&record)?;

        info!(
            event = events::SESSION_COMPLETED,
            final_price,
            choices = %format_choices(&record.choices),
            "🏁 Session completed"
        );

        let outcome = Outcome {
            final_price,
            path: profile.full_path(final_price),
            record,
        };
        session.set_outcome(outcome.clone());
        Ok(outcome)
    }

    pub fn append(&self, record: &OutcomeRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        let needs_header = f.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(log_format::HEADER)?;
        }
        writer.write_record([
            record.timestamp.as_str(),
            format_choices(&record.choices).as_str(),
            record.final_price.to_string().as_str(),
        ])?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SurveyError::Io(e.into_error()))?;

        f.write_all(&bytes)?;
        debug!("Appended {} bytes to {}", bytes.len(), self.log_path.display());
        Ok(())
    }

    /// All rows in file order. A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<OutcomeRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.log_path)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let malformed = |reason: String| SurveyError::MalformedRecord { line, reason };

            let timestamp = row.get(0).ok_or_else(|| malformed("missing timestamp".into()))?;
            let choices = row.get(1).ok_or_else(|| malformed("missing choices".into()))?;
            let final_price = row
                .get(2)
                .ok_or_else(|| malformed("missing final_price".into()))?
                .trim()
                .parse::<u32>()
                .map_err(|e| malformed(format!("bad final_price: {}", e)))?;

            records.push(OutcomeRecord {
                timestamp: timestamp.to_string(),
                choices: parse_choices(choices).map_err(|e| malformed(e.to_string()))?,
                final_price,
            });
        }
        Ok(records)
    }
}
