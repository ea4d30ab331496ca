use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::session::{Keystroke, Outcome};

/// How the running accuracy is recomputed after each keystroke.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum AccuracyPolicy {
    /// Current word's log as it stood before this keystroke, plus this keystroke.
    #[default]
    PerWord,
    /// Every keystroke processed since the session started.
    Cumulative,
}

/// Running totals kept across the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        if outcome == Outcome::Correct {
            self.correct += 1;
        }
    }
}

fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (correct as f64 / total as f64) * 100.0
}

pub fn per_word(pre_log: &[Keystroke], outcome: Outcome) -> f64 {
    let correct = pre_log
        .iter()
        .filter(|k| k.outcome == Outcome::Correct)
        .count()
        + usize::from(outcome == Outcome::Correct);
    percent(correct, pre_log.len() + 1)
}

pub fn cumulative(tally: &Tally) -> f64 {
    percent(tally.correct, tally.total)
}

/// `tally` must already include the keystroke being scored.
pub fn apply(policy: AccuracyPolicy, pre_log: &[Keystroke], outcome: Outcome, tally: &Tally) -> f64 {
    match policy {
        AccuracyPolicy::PerWord => per_word(pre_log, outcome),
        AccuracyPolicy::Cumulative => cumulative(tally),
    }
}
