use chrono::Duration;

use quiz_core::model::AudioLocator;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based number of the question being played (or just resolved).
    pub question_number: usize,
    pub total_questions: usize,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub correct_count: u32,
    pub is_finished: bool,
}

/// Everything a host needs to present one loaded question.
///
/// Intentionally **not** a UI view-model: no pre-formatted strings, no
/// layout assumptions. Option titles are in display order; the correct index
/// is deliberately absent until the reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// Identifies this question instance; stale timer or playback callbacks
    /// carrying an older epoch are ignored by the engine.
    pub epoch: u64,
    pub question_number: usize,
    pub total_questions: usize,
    pub option_titles: Vec<String>,
    pub audio: AudioLocator,
    pub time_budget: Duration,
}
