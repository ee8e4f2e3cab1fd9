use thiserror::Error;

use crate::model::rules::QuizRules;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("a summary needs at least one question")]
    NoQuestions,

    #[error("correct count ({correct}) exceeds total questions ({total})")]
    TooManyCorrect { correct: u32, total: u32 },

    #[error("best streak ({best_streak}) exceeds correct count ({correct})")]
    StreakExceedsCorrect { best_streak: u32, correct: u32 },
}

/// Final result of a completed game, handed to the results collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    score: u32,
    total_questions: u32,
    correct_count: u32,
    best_streak: u32,
    elapsed_seconds: u64,
}

impl GameSummary {
    /// Builds a summary, checking that the counts are coherent.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` when counts contradict each other.
    pub fn new(
        score: u32,
        total_questions: u32,
        correct_count: u32,
        best_streak: u32,
        elapsed_seconds: u64,
    ) -> Result<Self, SummaryError> {
        if total_questions == 0 {
            return Err(SummaryError::NoQuestions);
        }
        if correct_count > total_questions {
            return Err(SummaryError::TooManyCorrect {
                correct: correct_count,
                total: total_questions,
            });
        }
        if best_streak > correct_count {
            return Err(SummaryError::StreakExceedsCorrect {
                best_streak,
                correct: correct_count,
            });
        }

        Ok(Self {
            score,
            total_questions,
            correct_count,
            best_streak,
            elapsed_seconds,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Highest score reachable for this many questions under the given rules:
    /// every answer instant and the streak never broken.
    #[must_use]
    pub fn max_possible_score(&self, rules: &QuizRules) -> u64 {
        let total = u64::from(self.total_questions);
        let per_question = u64::from(rules.base_points()) + u64::from(rules.time_bonus_max());
        let streak_sum = total * total.saturating_sub(1) / 2;
        total * per_question + streak_sum * u64::from(rules.streak_bonus())
    }

    /// Score as a percentage of the maximum, rounded down.
    #[must_use]
    pub fn percentage(&self, rules: &QuizRules) -> u32 {
        let max = self.max_possible_score(rules);
        if max == 0 {
            return 0;
        }
        let pct = u64::from(self.score) * 100 / max;
        u32::try_from(pct).unwrap_or(u32::MAX)
    }
}
