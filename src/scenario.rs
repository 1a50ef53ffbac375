//! Fixed scenario definitions for the two survey profiles.

use serde::{Deserialize, Serialize};

use crate::constants::scenario::{
    CLASSROOM_UP_PRICE, HOLD_PRICE, PRICE_PREFIX, SELF_PACED_UP_PRICE, STAGE_COUNT, UP_PROBABILITY,
};

/// One decision point. The forecast chances are shown to the participant
/// and never feed the terminal draw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScenarioStep {
    pub narrative: &'static str,
    pub up_price: u32,
    pub up_chance_pct: u8,
    pub down_price: u32,
    pub down_chance_pct: u8,
}

impl ScenarioStep {
    /// e.g. "110,.45"
    pub fn up_forecast_label(&self) -> String {
        forecast_label(self.up_price, self.up_chance_pct)
    }

    pub fn down_forecast_label(&self) -> String {
        forecast_label(self.down_price, self.down_chance_pct)
    }
}

fn forecast_label(price: u32, chance_pct: u8) -> String {
    let fraction = format!("{:.2}", f64::from(chance_pct) / 100.0);
    let fraction = fraction.trim_end_matches('0').trim_start_matches('0');
    format!("{},{}", price, fraction)
}

const STEP_1: ScenarioStep = ScenarioStep {
    narrative: "You bought a stock at Rs.125. It has now come down to Rs.100. You think now there is a 45% chance that it will rise to Rs.110 and a 55% chance that it will drop to Rs.90. What will you do?",
    up_price: 110,
    up_chance_pct: 45,
    down_price: 90,
    down_chance_pct: 55,
};

const STEP_2: ScenarioStep = ScenarioStep {
    narrative: "The stock falls to Rs.90. You think now there is a 50% chance that it will rise back to Rs.100 and a 50% chance that it will drop to Rs.78. What will you do?",
    up_price: 100,
    up_chance_pct: 50,
    down_price: 78,
    down_chance_pct: 50,
};

const STEP_3: ScenarioStep = ScenarioStep {
    narrative: "The stock rises to Rs.100. You think now there is a 50% chance that it will rise back to Rs.110 and a 50% chance that it will drop to Rs.92. What will you do?",
    up_price: 110,
    up_chance_pct: 50,
    down_price: 92,
    down_chance_pct: 50,
};

static CLASSROOM_STEPS: [ScenarioStep; STAGE_COUNT] = [
    STEP_1,
    STEP_2,
    STEP_3,
    ScenarioStep {
        narrative: "The stock rises to Rs.110. You think now there is a 55% chance that it will rise to Rs.120 and a 45% chance that it will drop back to Rs.100. What will you do?",
        up_price: CLASSROOM_UP_PRICE,
        up_chance_pct: 55,
        down_price: HOLD_PRICE,
        down_chance_pct: 45,
    },
];

static SELF_PACED_STEPS: [ScenarioStep; STAGE_COUNT] = [
    STEP_1,
    STEP_2,
    STEP_3,
    ScenarioStep {
        narrative: "The stock rises to Rs.110. You think now there is a 55% chance that it will rise to Rs.115 and a 45% chance that it will drop back to Rs.100. What will you do?",
        up_price: SELF_PACED_UP_PRICE,
        up_chance_pct: 55,
        down_price: HOLD_PRICE,
        down_chance_pct: 45,
    },
];

/// Which of the two deployed variants this instance reproduces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioProfile {
    /// Rs.120 up-branch, results table and instructor export
    #[default]
    Classroom,
    /// Rs.115 up-branch, no table, no export
    SelfPaced,
}

impl std::fmt::Display for ScenarioProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioProfile::Classroom => write!(f, "classroom"),
            ScenarioProfile::SelfPaced => write!(f, "self_paced"),
        }
    }
}

impl ScenarioProfile {
    pub fn steps(&self) -> &'static [ScenarioStep; STAGE_COUNT] {
        match self {
            ScenarioProfile::Classroom => &CLASSROOM_STEPS,
            ScenarioProfile::SelfPaced => &SELF_PACED_STEPS,
        }
    }

    pub fn step(&self, stage: usize) -> Option<&'static ScenarioStep> {
        self.steps().get(stage)
    }

    pub fn stage_count(&self) -> usize {
        STAGE_COUNT
    }

    pub fn up_price(&self) -> u32 {
        match self {
            ScenarioProfile::Classroom => CLASSROOM_UP_PRICE,
            ScenarioProfile::SelfPaced => SELF_PACED_UP_PRICE,
        }
    }

    pub fn hold_price(&self) -> u32 {
        HOLD_PRICE
    }

    pub fn up_probability(&self) -> f64 {
        UP_PROBABILITY
    }

    /// Terminal price for a uniform draw `r` in [0, 1).
    pub fn terminal_price(&self, r: f64) -> u32 {
        if r < self.up_probability() {
            self.up_price()
        } else {
            self.hold_price()
        }
    }

    /// Path shown while deciding at `stage`: the prefix up to and including
    /// the price the participant is currently looking at.
    pub fn visible_path(&self, stage: usize) -> Vec<u32> {
        let end = (stage + 2).min(PRICE_PREFIX.len());
        PRICE_PREFIX[..end].to_vec()
    }

    pub fn full_path(&self, final_price: u32) -> Vec<u32> {
        let mut path = PRICE_PREFIX.to_vec();
        path.push(final_price);
        path
    }

    /// "125 to 100" style label for the move that led into `stage`.
    pub fn previous_move_label(&self, stage: usize) -> Option<String> {
        let from = PRICE_PREFIX.get(stage)?;
        let to = PRICE_PREFIX.get(stage + 1)?;
        Some(format!("{} to {}", from, to))
    }

    pub fn shows_results_table(&self) -> bool {
        matches!(self, ScenarioProfile::Classroom)
    }

    pub fn allows_export(&self) -> bool {
        matches!(self, ScenarioProfile::Classroom)
    }
}
