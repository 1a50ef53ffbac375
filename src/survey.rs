use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use dashmap::{mapref::one::RefMut, DashMap};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    chart::{annotate, PricePoint},
    config::AppConfig,
    constants::events,
    error::{Result, SurveyError},
    export::ExportGate,
    recorder::{Outcome, OutcomeRecorder, PriceDraw, SeededDraw, ThreadDraw},
    scenario::ScenarioProfile,
    session::{Choice, Session},
};

/// One line of the end-of-game table (classroom profile only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub label: String,
    pub previous_move: String,
    pub up_forecast: String,
    pub down_forecast: String,
    pub action: Choice,
}

/// Everything the display surface needs to render one session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub profile: ScenarioProfile,
    pub stage: usize,
    pub total_stages: usize,
    pub choices: Vec<Choice>,
    pub terminal: bool,
    pub narrative: Option<&'static str>,
    pub chart: Vec<PricePoint>,
    pub outcome: Option<Outcome>,
    pub results: Vec<ResultRow>,
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

struct SessionEntry {
    session: Session,
    touched: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            session: Session::new(),
            touched: Instant::now(),
        }
    }
}

pub struct SurveyService {
    profile: ScenarioProfile,
    sessions: DashMap<Uuid, SessionEntry>,
    session_idle: Duration,
    recorder: OutcomeRecorder,
    export_gate: ExportGate,
    draw: Mutex<Box<dyn PriceDraw>>,
}

impl SurveyService {
    pub fn new(config: &AppConfig) -> Self {
        let draw: Box<dyn PriceDraw> = match config.seed {
            Some(seed) => {
                info!("🎲 Terminal draws seeded with {}", seed);
                Box::new(SeededDraw::new(seed))
            }
            None => Box::new(ThreadDraw),
        };
        Self::with_draw(config, draw)
    }

    pub fn with_draw(config: &AppConfig, draw: Box<dyn PriceDraw>) -> Self {
        Self {
            profile: config.profile,
            sessions: DashMap::new(),
            session_idle: config.session_idle(),
            recorder: OutcomeRecorder::new(config.log_path.clone()),
            export_gate: ExportGate::new(config.export_secret(), config.log_path.clone()),
            draw: Mutex::new(draw),
        }
    }

    pub fn profile(&self) -> ScenarioProfile {
        self.profile
    }

    pub fn recorder(&self) -> &OutcomeRecorder {
        &self.recorder
    }

    pub fn export_enabled(&self) -> bool {
        self.export_gate.is_enabled()
    }

    pub fn start_session(&self) -> Uuid {
        self.evict_idle(self.session_idle);

        let id = Uuid::new_v4();
        self.sessions.insert(id, SessionEntry::new());
        info!(event = events::SESSION_STARTED, session = %id, "👋 New participant session");
        id
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions nobody has touched for `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.touched.elapsed() < max_idle);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!(event = events::SESSIONS_EVICTED, evicted, "🧹 Dropped idle sessions");
        }
        evicted
    }

    /// Look up a live session and mark it as used.
    fn touch(&self, id: Uuid) -> Result<RefMut<'_, Uuid, SessionEntry>> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(SurveyError::SessionNotFound(id))?;
        entry.touched = Instant::now();
        Ok(entry)
    }

    pub fn view(&self, id: Uuid) -> Result<SessionView> {
        let mut entry = self.touch(id)?;
        self.ensure_finalized(&mut entry.session)?;
        Ok(self.build_view(id, &entry.session))
    }

    /// Record a choice; the submission that completes the last stage also
    /// draws and logs the outcome.
    pub fn submit(&self, id: Uuid, choice: Choice) -> Result<SessionView> {
        let mut entry = self.touch(id)?;
        let session = &mut entry.session;

        if session.advance(choice) {
            debug!(
                event = events::STAGE_ADVANCED,
                session = %id,
                stage = session.stage(),
                choice = %choice,
                "Stage advanced"
            );
        } else {
            debug!(session = %id, choice = %choice, "Ignoring choice on a finished session");
        }

        self.ensure_finalized(session)?;
        Ok(self.build_view(id, session))
    }

    pub fn reset(&self, id: Uuid) -> Result<SessionView> {
        let mut entry = self.touch(id)?;
        entry.session.reset();
        info!(event = events::SESSION_RESET, session = %id, "🔄 Play again");
        Ok(self.build_view(id, &entry.session))
    }

    pub fn export(&self, submitted_secret: &str) -> Option<Vec<u8>> {
        self.export_gate.try_export(submitted_secret)
    }

    fn ensure_finalized(&self, session: &mut Session) -> Result<()> {
        if session.is_terminal() && session.outcome().is_none() {
            let mut draw = self.draw.lock().unwrap_or_else(PoisonError::into_inner);
            self.recorder.finalize(session, self.profile, &mut **draw)?;
        }
        Ok(())
    }

    fn build_view(&self, id: Uuid, session: &Session) -> SessionView {
        let profile = self.profile;
        let outcome = session.outcome().cloned();

        let path = match &outcome {
            Some(o) => o.path.clone(),
            None => profile.visible_path(session.stage()),
        };

        let results = if session.is_terminal() && profile.shows_results_table() {
            profile
                .steps()
                .iter()
                .zip(session.choices())
                .enumerate()
                .map(|(i, (step, &action))| ResultRow {
                    label: format!("{} Stock Move", ordinal(i + 1)),
                    previous_move: profile.previous_move_label(i).unwrap_or_default(),
                    up_forecast: step.up_forecast_label(),
                    down_forecast: step.down_forecast_label(),
                    action,
                })
                .collect()
        } else {
            Vec::new()
        };

        SessionView {
            session_id: id,
            profile,
            stage: session.stage(),
            total_stages: profile.stage_count(),
            choices: session.choices().to_vec(),
            terminal: session.is_terminal(),
            narrative: profile.step(session.stage()).map(|s| s.narrative),
            chart: annotate(&path),
            outcome,
            results,
        }
    }
}
