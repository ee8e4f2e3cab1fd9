use chrono::Duration;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("total questions must be > 0")]
    InvalidTotalQuestions,

    #[error("time budget must be > 0 seconds")]
    InvalidTimeBudget,

    #[error("base points must be > 0")]
    InvalidBasePoints,
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Default number of questions per game.
pub const DEFAULT_TOTAL_QUESTIONS: u32 = 10;
/// Default per-question time budget in seconds.
pub const DEFAULT_TIME_BUDGET_SECS: u32 = 15;
/// Default points for any correct answer.
pub const DEFAULT_BASE_POINTS: u32 = 1000;
/// Default maximum time bonus for an instant correct answer.
pub const DEFAULT_TIME_BONUS_MAX: u32 = 500;
/// Default bonus per prior consecutive correct answer.
pub const DEFAULT_STREAK_BONUS: u32 = 100;
/// Default pause on the answer reveal before the next question loads.
pub const DEFAULT_REVEAL_DELAY_MILLIS: u64 = 2_000;

/// Configuration for a quiz game.
///
/// All knobs the scoring engine and session state machine consume live here,
/// so hosts can tune pacing without touching engine behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRules {
    total_questions: u32,
    time_budget_secs: u32,
    base_points: u32,
    time_bonus_max: u32,
    streak_bonus: u32,
    reveal_delay_millis: u64,
    require_full_options: bool,
}

impl QuizRules {
    /// Creates custom rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if a count or the time budget is zero.
    pub fn new(
        total_questions: u32,
        time_budget_secs: u32,
        base_points: u32,
        time_bonus_max: u32,
        streak_bonus: u32,
        reveal_delay_millis: u64,
        require_full_options: bool,
    ) -> Result<Self, RulesError> {
        if total_questions == 0 {
            return Err(RulesError::InvalidTotalQuestions);
        }
        if time_budget_secs == 0 {
            return Err(RulesError::InvalidTimeBudget);
        }
        if base_points == 0 {
            return Err(RulesError::InvalidBasePoints);
        }

        Ok(Self {
            total_questions,
            time_budget_secs,
            base_points,
            time_bonus_max,
            streak_bonus,
            reveal_delay_millis,
            require_full_options,
        })
    }

    /// Overrides the number of questions per game.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::InvalidTotalQuestions` when zero.
    pub fn with_total_questions(mut self, total_questions: u32) -> Result<Self, RulesError> {
        if total_questions == 0 {
            return Err(RulesError::InvalidTotalQuestions);
        }
        self.total_questions = total_questions;
        Ok(self)
    }

    /// Overrides the per-question time budget.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::InvalidTimeBudget` when zero.
    pub fn with_time_budget_secs(mut self, time_budget_secs: u32) -> Result<Self, RulesError> {
        if time_budget_secs == 0 {
            return Err(RulesError::InvalidTimeBudget);
        }
        self.time_budget_secs = time_budget_secs;
        Ok(self)
    }

    /// Overrides the reveal pause between questions.
    #[must_use]
    pub fn with_reveal_delay_millis(mut self, reveal_delay_millis: u64) -> Self {
        self.reveal_delay_millis = reveal_delay_millis;
        self
    }

    /// When enabled, question building fails instead of degrading to fewer
    /// than four options on a small catalog.
    #[must_use]
    pub fn with_require_full_options(mut self, require_full_options: bool) -> Self {
        self.require_full_options = require_full_options;
        self
    }

    // Accessors
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::seconds(i64::from(self.time_budget_secs))
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }

    #[must_use]
    pub fn time_bonus_max(&self) -> u32 {
        self.time_bonus_max
    }

    #[must_use]
    pub fn streak_bonus(&self) -> u32 {
        self.streak_bonus
    }

    #[must_use]
    pub fn reveal_delay_millis(&self) -> u64 {
        self.reveal_delay_millis
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.reveal_delay_millis).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn require_full_options(&self) -> bool {
        self.require_full_options
    }
}

impl Default for QuizRules {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            time_budget_secs: DEFAULT_TIME_BUDGET_SECS,
            base_points: DEFAULT_BASE_POINTS,
            time_bonus_max: DEFAULT_TIME_BONUS_MAX,
            streak_bonus: DEFAULT_STREAK_BONUS,
            reveal_delay_millis: DEFAULT_REVEAL_DELAY_MILLIS,
            require_full_options: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let rules = QuizRules::default();
        assert_eq!(rules.total_questions(), DEFAULT_TOTAL_QUESTIONS);
        assert_eq!(rules.time_budget_secs(), DEFAULT_TIME_BUDGET_SECS);
        assert_eq!(rules.base_points(), DEFAULT_BASE_POINTS);
        assert_eq!(rules.time_bonus_max(), DEFAULT_TIME_BONUS_MAX);
        assert_eq!(rules.streak_bonus(), DEFAULT_STREAK_BONUS);
        assert_eq!(rules.reveal_delay_millis(), DEFAULT_REVEAL_DELAY_MILLIS);
        assert!(!rules.require_full_options());
    }

    #[test]
    fn rejects_zero_questions() {
        let err = QuizRules::default().with_total_questions(0).unwrap_err();
        assert_eq!(err, RulesError::InvalidTotalQuestions);
    }

    #[test]
    fn rejects_zero_time_budget() {
        let err = QuizRules::new(10, 0, 1000, 500, 100, 2000, false).unwrap_err();
        assert_eq!(err, RulesError::InvalidTimeBudget);
    }

    #[test]
    fn builder_overrides_stick() {
        let rules = QuizRules::default()
            .with_total_questions(5)
            .unwrap()
            .with_time_budget_secs(30)
            .unwrap()
            .with_reveal_delay_millis(500)
            .with_require_full_options(true);
        assert_eq!(rules.total_questions(), 5);
        assert_eq!(rules.time_budget_secs(), 30);
        assert_eq!(rules.reveal_delay_millis(), 500);
        assert!(rules.require_full_options());
    }
}
