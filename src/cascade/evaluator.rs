//! Cascade evaluation for one window as an explicit state machine.
//!
//! ```text
//! Evaluating(0) --pass--> Evaluating(1) --pass--> ... --pass--> Accepted
//!      |                      |
//!    reject                 reject
//!      v                      v
//!  Rejected(0)            Rejected(1)
//! ```
//!
//! Stages run strictly in stored order; a rejection is terminal.
use super::classifier::{evaluate_stage, StageOutcome, WindowContext};
use super::scaled::ScaledCascade;
use crate::integral::IntegralImage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
    Evaluating(usize),
    Rejected(usize),
    Accepted,
}

impl CascadeState {
    /// Transition out of `Evaluating(i)` given that stage's outcome.
    /// Terminal states are returned unchanged.
    pub fn advance(self, passed: bool, stage_count: usize) -> Self {
        match self {
            CascadeState::Evaluating(i) if !passed => CascadeState::Rejected(i),
            CascadeState::Evaluating(i) if i + 1 < stage_count => CascadeState::Evaluating(i + 1),
            CascadeState::Evaluating(_) => CascadeState::Accepted,
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, CascadeState::Evaluating(_))
    }
}

/// Final decision for one window. `score` is the sum of the last evaluated
/// stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowVerdict {
    Accepted { score: f32 },
    Rejected { stage: usize, score: f32 },
}

impl WindowVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WindowVerdict::Accepted { .. })
    }
}

/// Hook invoked after every evaluated stage.
pub trait StageObserver {
    fn on_stage(&mut self, stage: usize, outcome: StageOutcome);
}

impl StageObserver for () {
    #[inline]
    fn on_stage(&mut self, _stage: usize, _outcome: StageOutcome) {}
}

/// Counts how often each stage was evaluated and passed.
#[derive(Clone, Debug, Default)]
pub struct StageCounter {
    pub evaluated: Vec<u64>,
    pub passed: Vec<u64>,
}

impl StageCounter {
    pub fn new(stage_count: usize) -> Self {
        Self {
            evaluated: vec![0; stage_count],
            passed: vec![0; stage_count],
        }
    }

    /// Total number of stage evaluations.
    pub fn total(&self) -> u64 {
        self.evaluated.iter().sum()
    }
}

impl StageObserver for StageCounter {
    fn on_stage(&mut self, stage: usize, outcome: StageOutcome) {
        if stage >= self.evaluated.len() {
            self.evaluated.resize(stage + 1, 0);
            self.passed.resize(stage + 1, 0);
        }
        self.evaluated[stage] += 1;
        if outcome.passed {
            self.passed[stage] += 1;
        }
    }
}

impl<'c> ScaledCascade<'c> {
    /// Run the cascade on the window whose origin is `(x, y)`. The caller
    /// guarantees that the window [`extent`](Self::extent) fits the image.
    #[inline]
    pub fn evaluate_window(&self, integral: &IntegralImage, x: usize, y: usize) -> WindowVerdict {
        self.evaluate_window_observed(integral, x, y, &mut ())
    }

    /// [`evaluate_window`](Self::evaluate_window) reporting every stage to
    /// `observer`.
    pub fn evaluate_window_observed<O: StageObserver + ?Sized>(
        &self,
        integral: &IntegralImage,
        x: usize,
        y: usize,
        observer: &mut O,
    ) -> WindowVerdict {
        let ctx = WindowContext {
            integral,
            x,
            y,
            norm_factor: self.norm_factor(integral, x, y),
        };
        let stage_count = self.stages().len();
        let mut state = CascadeState::Evaluating(0);
        let mut score = 0.0f32;
        loop {
            match state {
                CascadeState::Evaluating(i) => {
                    let outcome = evaluate_stage(self, i, &ctx);
                    observer.on_stage(i, outcome);
                    score = outcome.sum;
                    state = state.advance(outcome.passed, stage_count);
                }
                CascadeState::Rejected(stage) => return WindowVerdict::Rejected { stage, score },
                CascadeState::Accepted => return WindowVerdict::Accepted { score },
            }
        }
    }
}
