use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::scenario::STAGE_COUNT;
use crate::error::SurveyError;
use crate::recorder::Outcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Buy,
    Hold,
    Sell,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Buy, Choice::Hold, Choice::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Buy => "Buy",
            Choice::Hold => "Hold",
            Choice::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Choice::Buy),
            "hold" => Ok(Choice::Hold),
            "sell" => Ok(Choice::Sell),
            _ => Err(SurveyError::InvalidChoice(s.to_string())),
        }
    }
}

/// One participant's walk through the scenario.
///
/// `choices.len() == stage` always holds; the only mutations are
/// [`Session::advance`] and [`Session::reset`].
#[derive(Clone, Debug, Default)]
pub struct Session {
    stage: usize,
    choices: Vec<Choice>,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn is_terminal(&self) -> bool {
        self.stage >= STAGE_COUNT
    }

    /// Record a choice for the current stage. Returns false (and changes
    /// nothing) once the session is terminal.
    pub fn advance(&mut self, choice: Choice) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.choices.push(choice);
        self.stage += 1;
        true
    }

    pub fn reset(&mut self) {
        self.stage = 0;
        self.choices.clear();
        self.outcome = None;
    }

    /// Outcome of the current terminal episode, if it was finalized.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}
