use serde::{Deserialize, Serialize};

use super::hint::HintState;
use super::ids::CardId;
use super::track::Track;

/// Which screen the learner is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Start,
    LanguageSelection,
    Study,
    /// Every card of the track has been shown.
    Ending,
}

/// Sub-state of `View::Study`, derived from the per-card fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyPhase {
    Unanswered,
    HintInProgress,
    SubmittedCorrect,
    SubmittedIncorrect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn record(&mut self, correct: bool) {
        self.total = self.total.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    /// Whole-number percentage of correct attempts, 0 when nothing was attempted.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.correct) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(100)
    }
}

/// Whether the current card has been answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerStatus {
    #[default]
    Pending,
    Submitted { input: String, correct: bool },
}

/// Everything one browser session remembers between requests.
///
/// The state only moves through the methods below; card selection itself is
/// done by the caller, which hands over the drawn id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    view: View,
    track: Option<Track>,
    current_card: Option<CardId>,
    answer: AnswerStatus,
    hint: HintState,
    score: Score,
    flip_used: bool,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn track(&self) -> Option<Track> {
        self.track
    }

    #[must_use]
    pub fn current_card(&self) -> Option<CardId> {
        self.current_card
    }

    #[must_use]
    pub fn answer(&self) -> &AnswerStatus {
        &self.answer
    }

    #[must_use]
    pub fn submitted(&self) -> bool {
        matches!(self.answer, AnswerStatus::Submitted { .. })
    }

    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        match &self.answer {
            AnswerStatus::Submitted { correct, .. } => Some(*correct),
            AnswerStatus::Pending => None,
        }
    }

    #[must_use]
    pub fn user_input(&self) -> Option<&str> {
        match &self.answer {
            AnswerStatus::Submitted { input, .. } => Some(input),
            AnswerStatus::Pending => None,
        }
    }

    #[must_use]
    pub fn hint(&self) -> &HintState {
        &self.hint
    }

    pub fn hint_mut(&mut self) -> &mut HintState {
        &mut self.hint
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn flip_used(&self) -> bool {
        self.flip_used
    }

    /// `None` outside of the study view.
    #[must_use]
    pub fn phase(&self) -> Option<StudyPhase> {
        if self.view != View::Study {
            return None;
        }
        Some(match &self.answer {
            AnswerStatus::Submitted { correct: true, .. } => StudyPhase::SubmittedCorrect,
            AnswerStatus::Submitted { correct: false, .. } => StudyPhase::SubmittedIncorrect,
            AnswerStatus::Pending if self.hint.is_active() => StudyPhase::HintInProgress,
            AnswerStatus::Pending => StudyPhase::Unanswered,
        })
    }

    pub fn begin(&mut self) {
        self.view = View::LanguageSelection;
    }

    /// Enter the study view on `track` with a fresh score.
    pub fn enter_study(&mut self, track: Track, card: CardId) {
        self.track = Some(track);
        self.score = Score::default();
        self.show_card(card);
    }

    /// Move to the next card, keeping track and score.
    pub fn show_card(&mut self, card: CardId) {
        self.view = View::Study;
        self.current_card = Some(card);
        self.clear_card_state();
    }

    pub fn enter_ending(&mut self, track: Track) {
        self.view = View::Ending;
        self.track = Some(track);
        self.current_card = None;
        self.clear_card_state();
    }

    /// Record a graded submission. A resubmission replaces the previous input
    /// and counts as another attempt.
    pub fn record_answer(&mut self, input: impl Into<String>, correct: bool) {
        self.answer = AnswerStatus::Submitted {
            input: input.into(),
            correct,
        };
        self.score.record(correct);
    }

    pub fn flip(&mut self) {
        self.flip_used = true;
    }

    /// Charge an attempt for a card whose answer was flipped but never typed.
    /// Returns true if the penalty applied.
    pub fn settle_flip_penalty(&mut self) -> bool {
        if self.flip_used && !self.submitted() {
            self.score.record(false);
            return true;
        }
        false
    }

    /// Back to a brand-new session on the start view.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn clear_card_state(&mut self) {
        self.answer = AnswerStatus::Pending;
        self.hint.clear();
        self.flip_used = false;
    }
}
