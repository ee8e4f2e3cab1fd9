use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::TrackId;
use crate::model::track::Track;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("a question needs at least one option")]
    NoOptions,

    #[error("too many options for a question: {len}")]
    TooManyOptions { len: usize },

    #[error("duplicate option in question: {0}")]
    DuplicateOption(TrackId),

    #[error("correct track {0} is not among the options")]
    CorrectMissing(TrackId),
}

/// Maximum number of multiple-choice options shown for a question.
pub const MAX_OPTIONS: usize = 4;

/// One multiple-choice question, derived fresh each time it is loaded.
///
/// Never persisted: only the question order survives a resume, the
/// distractors are re-sampled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    options: Vec<Track>,
    correct_index: usize,
}

impl Question {
    /// Builds a question from an already-shuffled option set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the set is empty, oversized, contains a
    /// duplicate, or does not contain the correct track.
    pub fn new(options: Vec<Track>, correct_id: TrackId) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if options.len() > MAX_OPTIONS {
            return Err(QuestionError::TooManyOptions {
                len: options.len(),
            });
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id()) {
                return Err(QuestionError::DuplicateOption(option.id()));
            }
        }
        let correct_index = options
            .iter()
            .position(|option| option.id() == correct_id)
            .ok_or(QuestionError::CorrectMissing(correct_id))?;

        Ok(Self {
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn options(&self) -> &[Track] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_track(&self) -> &Track {
        &self.options[self.correct_index]
    }

    /// Whether the chosen option is the correct one, `None` if out of range.
    #[must_use]
    pub fn check(&self, option_index: usize) -> Option<bool> {
        self.options
            .get(option_index)
            .map(|option| option.id() == self.correct_track().id())
    }
}

/// Outcome of resolving one question, kept only for the reveal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Chosen option index, `None` on timeout.
    pub selected: Option<usize>,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub correct_index: usize,
}

impl AnswerOutcome {
    #[must_use]
    pub fn answered(
        selected: usize,
        is_correct: bool,
        points_awarded: u32,
        correct_index: usize,
    ) -> Self {
        Self {
            selected: Some(selected),
            is_correct,
            points_awarded,
            correct_index,
        }
    }

    /// The countdown ran out before any option was chosen.
    #[must_use]
    pub fn timed_out(correct_index: usize) -> Self {
        Self {
            selected: None,
            is_correct: false,
            points_awarded: 0,
            correct_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::AudioLocator;

    fn track(id: u64) -> Track {
        Track::new(
            TrackId::new(id),
            format!("Track {id}"),
            AudioLocator::new(format!("http://localhost:8080/songs/{id}.mp3")).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn finds_correct_index() {
        let question =
            Question::new(vec![track(3), track(1), track(2)], TrackId::new(1)).unwrap();
        assert_eq!(question.correct_index(), 1);
        assert_eq!(question.correct_track().id(), TrackId::new(1));
    }

    #[test]
    fn check_compares_ids() {
        let question =
            Question::new(vec![track(3), track(1), track(2)], TrackId::new(1)).unwrap();
        assert_eq!(question.check(1), Some(true));
        assert_eq!(question.check(0), Some(false));
        assert_eq!(question.check(9), None);
    }

    #[test]
    fn rejects_missing_correct_track() {
        let err = Question::new(vec![track(2), track(3)], TrackId::new(1)).unwrap_err();
        assert_eq!(err, QuestionError::CorrectMissing(TrackId::new(1)));
    }

    #[test]
    fn rejects_duplicates() {
        let err =
            Question::new(vec![track(1), track(2), track(2)], TrackId::new(1)).unwrap_err();
        assert_eq!(err, QuestionError::DuplicateOption(TrackId::new(2)));
    }

    #[test]
    fn rejects_oversized_option_set() {
        let options = vec![track(1), track(2), track(3), track(4), track(5)];
        let err = Question::new(options, TrackId::new(1)).unwrap_err();
        assert!(matches!(err, QuestionError::TooManyOptions { len: 5 }));
    }

    #[test]
    fn timeout_outcome_awards_nothing() {
        let outcome = AnswerOutcome::timed_out(2);
        assert_eq!(outcome.selected, None);
        assert!(!outcome.is_correct);
        assert_eq!(outcome.points_awarded, 0);
    }
}
