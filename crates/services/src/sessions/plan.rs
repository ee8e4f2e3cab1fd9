use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{MAX_OPTIONS, Question, SongCatalog, TrackId};

use crate::error::SessionError;

/// Draws the play order for a new session: the whole catalog shuffled, then
/// cut to `total_questions`. Every id is distinct because the draw is
/// without replacement.
///
/// # Errors
///
/// Returns `SessionError::EmptyCatalog` when there is nothing to draw from.
pub fn draw_question_order(
    catalog: &SongCatalog,
    total_questions: u32,
) -> Result<Vec<TrackId>, SessionError> {
    if catalog.is_empty() {
        return Err(SessionError::EmptyCatalog);
    }

    let mut ids: Vec<TrackId> = catalog.tracks().iter().map(|track| track.id()).collect();
    ids.shuffle(&mut rng());

    let take = usize::try_from(total_questions).unwrap_or(usize::MAX).min(ids.len());
    ids.truncate(take);
    Ok(ids)
}

/// Builds the shuffled 4-way option set for one question: three distractors
/// sampled without replacement from the rest of the catalog, plus the
/// correct track, reshuffled together.
///
/// A catalog with fewer than four tracks degrades to as many distinct
/// options as exist, unless `require_full` makes that a hard error.
///
/// # Errors
///
/// Returns `SessionError::InsufficientOptions` in `require_full` mode on a
/// too-small catalog, or `SessionError::StaleSave` if `correct_id` is not in
/// the catalog.
pub fn build_options(
    catalog: &SongCatalog,
    correct_id: TrackId,
    require_full: bool,
) -> Result<Question, SessionError> {
    let correct = catalog.get(correct_id).ok_or(SessionError::StaleSave)?;

    let mut distractors: Vec<_> = catalog
        .tracks()
        .iter()
        .filter(|track| track.id() != correct_id)
        .cloned()
        .collect();

    if require_full && distractors.len() < MAX_OPTIONS - 1 {
        return Err(SessionError::InsufficientOptions {
            available: distractors.len() + 1,
            required: MAX_OPTIONS,
        });
    }

    distractors.shuffle(&mut rng());
    distractors.truncate(MAX_OPTIONS - 1);

    let mut options = distractors;
    options.push(correct.clone());
    options.shuffle(&mut rng());

    Ok(Question::new(options, correct_id)?)
}
