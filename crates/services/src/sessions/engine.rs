use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use quiz_core::model::{
    AnswerOutcome, GameSummary, Question, QuizRules, SessionState, SongCatalog,
};
use quiz_core::scoring::score_correct_answer;

use crate::countdown::{CountdownController, CountdownSignal};
use crate::error::SessionError;

use super::plan::{build_options, draw_question_order};
use super::progress::{QuestionView, QuizProgress};

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// No question in flight (fresh engine, or after `stop`).
    Idle,
    /// Between questions; the next `load_question` decides play or finish.
    Loading,
    /// A question is on screen and the countdown is (or can be) running.
    Active,
    /// The answer is shown; waiting out the reveal delay.
    Revealed,
    /// Terminal: the summary has been produced.
    Finished,
}

/// What loading the next question produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Question(QuestionView),
    Finished(GameSummary),
}

/// What a pumped tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Running { remaining: Duration },
    /// The countdown ran out; the question resolved as a timeout.
    Expired(AnswerOutcome),
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// The per-question session state machine.
///
/// Owns the score, streak, and answer state and reacts to discrete events
/// pumped in by the host (answer taps, time, pause toggles). It holds no
/// reference to any view, player, or store; the workflow layer performs
/// side effects around these transitions. Every method takes `now`
/// explicitly so behavior is deterministic under test.
///
/// Out-of-order external events (a second tap, a tick after the answer, a
/// stale reveal-delay callback) are no-ops, never errors.
pub struct QuizEngine {
    rules: QuizRules,
    catalog: Arc<SongCatalog>,
    state: SessionState,
    phase: QuizPhase,
    paused: bool,
    countdown: CountdownController,
    question: Option<Question>,
    epoch: u64,
    answered: bool,
    last_outcome: Option<AnswerOutcome>,
}

impl QuizEngine {
    /// Starts a new game: draws a fresh question order and resets all
    /// counters.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyCatalog` when there is nothing to quiz
    /// about.
    pub fn start(
        catalog: Arc<SongCatalog>,
        rules: QuizRules,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let order = draw_question_order(&catalog, rules.total_questions())?;
        let state = SessionState::new(order, now)?;
        Ok(Self::from_parts(catalog, rules, state))
    }

    /// Restores a previously persisted game.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleSave` when the saved order is already
    /// finished or references tracks the current catalog no longer has --
    /// callers fall back to a new game.
    pub fn resume(
        catalog: Arc<SongCatalog>,
        rules: QuizRules,
        state: SessionState,
    ) -> Result<Self, SessionError> {
        if state.is_finished() {
            return Err(SessionError::StaleSave);
        }
        if !state.question_order().iter().all(|id| catalog.contains(*id)) {
            return Err(SessionError::StaleSave);
        }
        Ok(Self::from_parts(catalog, rules, state))
    }

    fn from_parts(catalog: Arc<SongCatalog>, rules: QuizRules, state: SessionState) -> Self {
        Self {
            rules,
            catalog,
            state,
            phase: QuizPhase::Loading,
            paused: false,
            countdown: CountdownController::new(),
            question: None,
            epoch: 0,
            answered: false,
            last_outcome: None,
        }
    }

    /// Loads the question at the current index, or finishes the session.
    ///
    /// On a question: derives a fresh option set, arms the countdown, bumps
    /// the epoch, and hands back what the host must present and play.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Phase` outside `Loading`, or a question
    /// derivation error.
    pub fn load_question(&mut self, now: DateTime<Utc>) -> Result<LoadOutcome, SessionError> {
        if self.phase != QuizPhase::Loading {
            return Err(SessionError::Phase);
        }

        if self.state.is_finished() {
            self.phase = QuizPhase::Finished;
            self.question = None;
            self.countdown.cancel(now);
            return Ok(LoadOutcome::Finished(self.build_summary(now)?));
        }

        // current_track_id is Some here: not finished means index < N.
        let correct_id = self.state.current_track_id().ok_or(SessionError::Phase)?;
        let question = build_options(&self.catalog, correct_id, self.rules.require_full_options())?;

        self.epoch += 1;
        self.answered = false;
        self.last_outcome = None;
        self.paused = false;
        self.countdown.start(self.rules.time_budget(), now);

        let view = QuestionView {
            epoch: self.epoch,
            question_number: self.state.current_index() + 1,
            total_questions: self.state.total_questions(),
            option_titles: question
                .options()
                .iter()
                .map(|track| track.title().to_owned())
                .collect(),
            audio: question.correct_track().audio_locator().clone(),
            time_budget: self.rules.time_budget(),
        };

        self.question = Some(question);
        self.phase = QuizPhase::Active;
        Ok(LoadOutcome::Question(view))
    }

    /// Resolves the current question with the tapped option.
    ///
    /// Returns `None` (a silent no-op) when there is no active question,
    /// the game is paused, the question was already answered, or the index
    /// is out of range -- this is what absorbs the tap-vs-timeout race and
    /// duplicate event delivery.
    pub fn submit_answer(
        &mut self,
        option_index: usize,
        now: DateTime<Utc>,
    ) -> Option<AnswerOutcome> {
        if self.phase != QuizPhase::Active || self.paused || self.answered {
            return None;
        }
        let question = self.question.as_ref()?;
        let is_correct = question.check(option_index)?;
        let correct_index = question.correct_index();

        let remaining = self.countdown.cancel(now);
        let outcome = if is_correct {
            let elapsed = duration_secs(self.rules.time_budget() - remaining);
            let points = score_correct_answer(&self.rules, elapsed, self.state.streak());
            self.state.record_correct(points);
            AnswerOutcome::answered(option_index, true, points, correct_index)
        } else {
            self.state.record_miss();
            AnswerOutcome::answered(option_index, false, 0, correct_index)
        };

        self.answered = true;
        self.last_outcome = Some(outcome);
        self.phase = QuizPhase::Revealed;
        Some(outcome)
    }

    /// Pumps time into the engine.
    ///
    /// Emits the settled remaining time while counting, and resolves the
    /// question as a timeout exactly once when the budget runs out. Quiet
    /// outside an active, unpaused question, so a straggling host timer
    /// from a previous question cannot fire into this one.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TickEvent> {
        if self.phase != QuizPhase::Active || self.paused {
            return None;
        }
        match self.countdown.tick(now)? {
            CountdownSignal::Running { remaining } => Some(TickEvent::Running { remaining }),
            CountdownSignal::Expired => {
                let correct_index = self.question.as_ref()?.correct_index();
                self.state.record_miss();
                let outcome = AnswerOutcome::timed_out(correct_index);
                self.answered = true;
                self.last_outcome = Some(outcome);
                self.phase = QuizPhase::Revealed;
                Some(TickEvent::Expired(outcome))
            }
        }
    }

    /// Moves past the reveal to the next question slot.
    ///
    /// `epoch` must identify the question that was just revealed; a stale
    /// reveal-delay callback is ignored. Returns whether the engine moved.
    pub fn advance(&mut self, epoch: u64) -> bool {
        if self.phase != QuizPhase::Revealed || epoch != self.epoch {
            return false;
        }
        self.state.advance();
        self.question = None;
        self.phase = QuizPhase::Loading;
        true
    }

    /// Freezes the countdown. Only meaningful while a question is active;
    /// idempotent. Returns whether the engine actually paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != QuizPhase::Active || self.paused {
            return false;
        }
        self.paused = true;
        self.countdown.pause(now);
        true
    }

    /// Unfreezes the countdown from its frozen remaining value. Idempotent.
    /// Returns whether the engine actually resumed.
    pub fn resume_play(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != QuizPhase::Active || !self.paused {
            return false;
        }
        self.paused = false;
        self.countdown.resume(now);
        true
    }

    /// Abandons the in-flight question and goes quiet. Session counters are
    /// kept so the caller can persist them for a later resume.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.countdown.cancel(now);
        self.question = None;
        self.paused = false;
        self.phase = QuizPhase::Idle;
    }

    /// Whether a late playback-ready callback should still start audio:
    /// only for the question it was prepared for, and only while that
    /// question is active and unpaused.
    #[must_use]
    pub fn should_start_playback(&self, epoch: u64) -> bool {
        self.phase == QuizPhase::Active && epoch == self.epoch && !self.paused
    }

    // Accessors

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Outcome of the question being revealed, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<AnswerOutcome> {
        self.last_outcome
    }

    /// Settled time left on the current question.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.countdown.remaining()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.state.total_questions();
        QuizProgress {
            question_number: (self.state.current_index() + 1).min(total),
            total_questions: total,
            score: self.state.score(),
            streak: self.state.streak(),
            best_streak: self.state.best_streak(),
            correct_count: self.state.correct_count(),
            is_finished: self.state.is_finished(),
        }
    }

    fn build_summary(&self, now: DateTime<Utc>) -> Result<GameSummary, SessionError> {
        let elapsed = (now - self.state.started_at()).num_seconds().max(0);
        let elapsed_seconds = u64::try_from(elapsed).unwrap_or(0);
        let total = u32::try_from(self.state.total_questions()).unwrap_or(u32::MAX);
        Ok(GameSummary::new(
            self.state.score(),
            total,
            self.state.correct_count(),
            self.state.best_streak(),
            elapsed_seconds,
        )?)
    }
}

impl fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizEngine")
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("epoch", &self.epoch)
            .field("current_index", &self.state.current_index())
            .field("score", &self.state.score())
            .field("streak", &self.state.streak())
            .finish_non_exhaustive()
    }
}

fn duration_secs(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1_000.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AudioLocator, Track, TrackId};
    use quiz_core::time::fixed_now;

    fn catalog(n: u64) -> Arc<SongCatalog> {
        let tracks = (1..=n)
            .map(|id| {
                Track::new(
                    TrackId::new(id),
                    format!("Track {id}"),
                    AudioLocator::new(format!("http://localhost:8080/songs/{id}.mp3")).unwrap(),
                )
                .unwrap()
            })
            .collect();
        Arc::new(SongCatalog::new(tracks).unwrap())
    }

    fn rules(total: u32) -> QuizRules {
        QuizRules::default().with_total_questions(total).unwrap()
    }

    fn engine(total: u32) -> QuizEngine {
        QuizEngine::start(catalog(20), rules(total), fixed_now()).unwrap()
    }

    fn load_view(engine: &mut QuizEngine, now: chrono::DateTime<Utc>) -> QuestionView {
        match engine.load_question(now).unwrap() {
            LoadOutcome::Question(view) => view,
            LoadOutcome::Finished(_) => panic!("expected a question"),
        }
    }

    fn correct_index(engine: &QuizEngine) -> usize {
        engine.question().unwrap().correct_index()
    }

    fn wrong_index(engine: &QuizEngine) -> usize {
        let correct = correct_index(engine);
        if correct == 0 { 1 } else { 0 }
    }

    #[test]
    fn empty_catalog_cannot_start() {
        let err = QuizEngine::start(catalog(0), rules(10), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::EmptyCatalog));
    }

    #[test]
    fn instant_correct_answer_scores_full_bonus() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        let outcome = engine.submit_answer(correct_index(&engine), t0).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points_awarded, 1_500);
        assert_eq!(engine.phase(), QuizPhase::Revealed);
        assert_eq!(engine.state().streak(), 1);
    }

    #[test]
    fn slower_answer_earns_less() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        let outcome = engine
            .submit_answer(correct_index(&engine), t0 + Duration::seconds(5))
            .unwrap();
        // 1000 + floor(10/15 * 500)
        assert_eq!(outcome.points_awarded, 1_333);
    }

    #[test]
    fn wrong_answer_breaks_the_streak() {
        let mut engine = engine(3);
        let t0 = fixed_now();

        load_view(&mut engine, t0);
        engine.submit_answer(correct_index(&engine), t0).unwrap();
        let epoch = engine.epoch();
        assert!(engine.advance(epoch));

        load_view(&mut engine, t0);
        let outcome = engine.submit_answer(wrong_index(&engine), t0).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.points_awarded, 0);
        assert_eq!(engine.state().streak(), 0);
        assert_eq!(engine.state().best_streak(), 1);
        assert_eq!(engine.state().score(), 1_500);
    }

    #[test]
    fn second_submit_is_a_no_op() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        let first = engine.submit_answer(correct_index(&engine), t0).unwrap();
        assert!(engine.submit_answer(0, t0).is_none());
        assert!(engine.submit_answer(1, t0 + Duration::seconds(1)).is_none());
        assert_eq!(engine.last_outcome(), Some(first));
        assert_eq!(engine.state().correct_count(), 1);
    }

    #[test]
    fn out_of_range_tap_is_ignored() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);
        assert!(engine.submit_answer(17, t0).is_none());
        assert_eq!(engine.phase(), QuizPhase::Active);
    }

    #[test]
    fn timeout_resolves_once_and_breaks_streak() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        assert!(matches!(
            engine.tick(t0 + Duration::seconds(10)),
            Some(TickEvent::Running { .. })
        ));
        let event = engine.tick(t0 + Duration::seconds(15)).unwrap();
        let TickEvent::Expired(outcome) = event else {
            panic!("expected expiry");
        };
        assert_eq!(outcome.selected, None);
        assert!(!outcome.is_correct);
        assert_eq!(engine.phase(), QuizPhase::Revealed);
        assert_eq!(engine.state().streak(), 0);

        // The countdown is terminal; nothing else fires.
        assert!(engine.tick(t0 + Duration::seconds(30)).is_none());
    }

    #[test]
    fn tick_after_answer_is_quiet() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        engine
            .submit_answer(correct_index(&engine), t0 + Duration::seconds(14))
            .unwrap();
        // The timer would have expired here; the answer already settled it.
        assert!(engine.tick(t0 + Duration::seconds(16)).is_none());
        assert_eq!(engine.state().correct_count(), 1);
    }

    #[test]
    fn pause_excludes_frozen_time_from_scoring() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);

        assert!(engine.pause(t0 + Duration::seconds(5)));
        // Taps while paused are rejected.
        assert!(engine.submit_answer(correct_index(&engine), t0 + Duration::seconds(6)).is_none());
        // Ticks while paused are quiet.
        assert!(engine.tick(t0 + Duration::seconds(60)).is_none());

        assert!(engine.resume_play(t0 + Duration::seconds(120)));
        let outcome = engine
            .submit_answer(correct_index(&engine), t0 + Duration::seconds(125))
            .unwrap();
        // 10 active seconds elapsed: 1000 + floor(5/15 * 500)
        assert_eq!(outcome.points_awarded, 1_166);
    }

    #[test]
    fn pause_outside_active_is_rejected() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        assert!(!engine.pause(t0));

        load_view(&mut engine, t0);
        assert!(engine.pause(t0));
        assert!(!engine.pause(t0));

        assert!(engine.resume_play(t0));
        assert!(!engine.resume_play(t0));
    }

    #[test]
    fn stale_advance_cannot_skip_a_question() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);
        engine.submit_answer(correct_index(&engine), t0).unwrap();
        let revealed_epoch = engine.epoch();
        assert!(engine.advance(revealed_epoch));

        load_view(&mut engine, t0);
        engine.submit_answer(correct_index(&engine), t0).unwrap();
        // A straggling reveal-delay callback from the previous question.
        assert!(!engine.advance(revealed_epoch));
        assert!(engine.advance(engine.epoch()));
    }

    #[test]
    fn plays_through_to_a_summary() {
        let total = 3;
        let mut engine = engine(total);
        let mut now = fixed_now();

        for _ in 0..total {
            load_view(&mut engine, now);
            now += Duration::seconds(3);
            engine.submit_answer(correct_index(&engine), now).unwrap();
            assert!(engine.advance(engine.epoch()));
        }

        let LoadOutcome::Finished(summary) = engine.load_question(now).unwrap() else {
            panic!("expected the session to finish");
        };
        assert_eq!(engine.phase(), QuizPhase::Finished);
        assert_eq!(summary.total_questions(), total);
        assert_eq!(summary.correct_count(), total);
        assert_eq!(summary.best_streak(), total);
        // 3 s per answer, 3 questions, advance adds no time here.
        assert_eq!(summary.elapsed_seconds(), 9);
        // 1000 + 400 per question, plus 0/100/200 streak bonuses.
        assert_eq!(summary.score(), 3 * 1_400 + 300);
    }

    #[test]
    fn resume_rejects_finished_or_unknown_saves() {
        let source = catalog(5);
        let t0 = fixed_now();

        let finished = SessionState::from_persisted(
            vec![TrackId::new(1), TrackId::new(2)],
            2,
            2_000,
            0,
            1,
            1,
            t0,
        )
        .unwrap();
        assert!(matches!(
            QuizEngine::resume(Arc::clone(&source), rules(10), finished),
            Err(SessionError::StaleSave)
        ));

        let unknown = SessionState::new(vec![TrackId::new(1), TrackId::new(99)], t0).unwrap();
        assert!(matches!(
            QuizEngine::resume(Arc::clone(&source), rules(10), unknown),
            Err(SessionError::StaleSave)
        ));
    }

    #[test]
    fn resume_continues_mid_game() {
        let source = catalog(5);
        let t0 = fixed_now();
        let state = SessionState::from_persisted(
            vec![TrackId::new(3), TrackId::new(1), TrackId::new(4)],
            1,
            1_500,
            1,
            1,
            1,
            t0,
        )
        .unwrap();

        let mut engine = QuizEngine::resume(source, rules(10), state).unwrap();
        let view = load_view(&mut engine, t0 + Duration::seconds(30));
        assert_eq!(view.question_number, 2);
        assert_eq!(view.total_questions, 3);
        // The resumed question is the one the order says, not a re-draw.
        assert_eq!(engine.question().unwrap().correct_track().id(), TrackId::new(1));
    }

    #[test]
    fn playback_ready_guard_tracks_epoch_and_pause() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);
        let epoch = engine.epoch();

        assert!(engine.should_start_playback(epoch));
        assert!(!engine.should_start_playback(epoch + 1));

        engine.pause(t0);
        assert!(!engine.should_start_playback(epoch));
        engine.resume_play(t0);

        engine.submit_answer(correct_index(&engine), t0).unwrap();
        engine.advance(epoch);
        load_view(&mut engine, t0);
        // The old question's ready callback arrives after advancing.
        assert!(!engine.should_start_playback(epoch));
        assert!(engine.should_start_playback(engine.epoch()));
    }

    #[test]
    fn stop_keeps_counters_for_a_later_resume() {
        let mut engine = engine(3);
        let t0 = fixed_now();
        load_view(&mut engine, t0);
        engine.submit_answer(correct_index(&engine), t0).unwrap();
        engine.advance(engine.epoch());

        engine.stop(t0);
        assert_eq!(engine.phase(), QuizPhase::Idle);
        assert_eq!(engine.state().score(), 1_500);
        assert_eq!(engine.state().current_index(), 1);
        // Nothing fires after stop.
        assert!(engine.tick(t0 + Duration::seconds(60)).is_none());
        assert!(engine.submit_answer(0, t0).is_none());
    }
}
