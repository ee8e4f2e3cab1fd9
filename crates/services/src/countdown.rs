use chrono::{DateTime, Duration, Utc};

/// What a tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    /// Still counting; `remaining` has been settled up to the tick time.
    Running { remaining: Duration },
    /// The budget ran out. Emitted exactly once, then the countdown stops.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownPhase {
    Idle,
    Running,
    Paused,
    Expired,
    Cancelled,
}

/// Per-question countdown.
///
/// `remaining` is tracked independently of any wall-clock start time so a
/// pause can freeze it and a resume can continue from the frozen value. The
/// controller never reads a clock of its own: the host pumps time in through
/// `tick(now)`, which makes every expiry path deterministic under test.
#[derive(Debug, Clone)]
pub struct CountdownController {
    remaining: Duration,
    phase: CountdownPhase,
    last_tick: Option<DateTime<Utc>>,
}

impl CountdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: Duration::zero(),
            phase: CountdownPhase::Idle,
            last_tick: None,
        }
    }

    /// Arms the countdown with a fresh budget, replacing any previous run.
    pub fn start(&mut self, budget: Duration, now: DateTime<Utc>) {
        self.remaining = budget;
        self.phase = CountdownPhase::Running;
        self.last_tick = Some(now);
    }

    /// Advances the countdown to `now`.
    ///
    /// Returns `None` while idle, paused, cancelled, or already expired --
    /// in particular, `Expired` is never signalled twice and never after
    /// `cancel`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<CountdownSignal> {
        if self.phase != CountdownPhase::Running {
            return None;
        }
        self.settle(now);
        if self.remaining <= Duration::zero() {
            self.remaining = Duration::zero();
            self.phase = CountdownPhase::Expired;
            return Some(CountdownSignal::Expired);
        }
        Some(CountdownSignal::Running {
            remaining: self.remaining,
        })
    }

    /// Freezes `remaining` at its current value. Idempotent.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.phase != CountdownPhase::Running {
            return;
        }
        self.settle(now);
        if self.remaining < Duration::zero() {
            self.remaining = Duration::zero();
        }
        self.phase = CountdownPhase::Paused;
        self.last_tick = None;
    }

    /// Continues ticking from the frozen `remaining` value. Idempotent.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.phase != CountdownPhase::Paused {
            return;
        }
        self.phase = CountdownPhase::Running;
        self.last_tick = Some(now);
    }

    /// Stops the countdown without expiring, settling `remaining` up to
    /// `now` and returning it. Used when an answer lands before the budget
    /// runs out; the settled value feeds elapsed-time scoring.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Duration {
        if self.phase == CountdownPhase::Running {
            self.settle(now);
            if self.remaining < Duration::zero() {
                self.remaining = Duration::zero();
            }
        }
        if matches!(self.phase, CountdownPhase::Running | CountdownPhase::Paused) {
            self.phase = CountdownPhase::Cancelled;
        }
        self.last_tick = None;
        self.remaining
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    fn settle(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            let delta = now - last;
            if delta > Duration::zero() {
                self.remaining = self.remaining - delta;
            }
        }
        self.last_tick = Some(now);
    }
}

impl Default for CountdownController {
    fn default() -> Self {
        Self::new()
    }
}
