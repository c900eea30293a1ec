use crate::error::{LingoError, Result};
use crate::session::{SessionConfig, SessionState};
use crate::words::WordPair;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// How a turn ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Correct,
    Wrong,
    TooSlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    TurnActive,
    SessionOver,
}

/// Owned copy of a listener callback, for recording and channels
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    TurnStarted(WordPair),
    Tick(u32),
    TurnResolved {
        outcome: Outcome,
        turns_remaining: u32,
    },
}

/// Receives engine notifications in the order they happen
pub trait SessionListener {
    fn on_tick(&mut self, seconds_remaining: u32);
    fn on_turn_started(&mut self, word: &WordPair);
    fn on_turn_resolved(&mut self, outcome: Outcome, turns_remaining: u32);
}

impl SessionListener for () {
    fn on_tick(&mut self, _seconds_remaining: u32) {}
    fn on_turn_started(&mut self, _word: &WordPair) {}
    fn on_turn_resolved(&mut self, _outcome: Outcome, _turns_remaining: u32) {}
}

impl SessionListener for Vec<SessionEvent> {
    fn on_tick(&mut self, seconds_remaining: u32) {
        self.push(SessionEvent::Tick(seconds_remaining));
    }

    fn on_turn_started(&mut self, word: &WordPair) {
        self.push(SessionEvent::TurnStarted(word.clone()));
    }

    fn on_turn_resolved(&mut self, outcome: Outcome, turns_remaining: u32) {
        self.push(SessionEvent::TurnResolved {
            outcome,
            turns_remaining,
        });
    }
}

// A dropped receiver just means nobody is watching anymore.
impl SessionListener for Sender<SessionEvent> {
    fn on_tick(&mut self, seconds_remaining: u32) {
        let _ = self.send(SessionEvent::Tick(seconds_remaining));
    }

    fn on_turn_started(&mut self, word: &WordPair) {
        let _ = self.send(SessionEvent::TurnStarted(word.clone()));
    }

    fn on_turn_resolved(&mut self, outcome: Outcome, turns_remaining: u32) {
        let _ = self.send(SessionEvent::TurnResolved {
            outcome,
            turns_remaining,
        });
    }
}

/// Source of wall-clock time for answer latencies
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(SystemTime::UNIX_EPOCH)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

/// Turn and countdown state machine for one quiz session
#[derive(Debug)]
pub struct Engine<L: SessionListener, C: Clock = SystemClock> {
    config: SessionConfig,
    catalog: Vec<WordPair>,
    state: SessionState,
    /// Cleared on resolve or reset, so a late tick finds nothing to count down
    countdown_armed: bool,
    listener: L,
    clock: C,
    rng: StdRng,
}

impl<L: SessionListener> Engine<L, SystemClock> {
    pub fn new(listener: L) -> Self {
        Self::with_clock(listener, SystemClock)
    }
}

impl<L: SessionListener, C: Clock> Engine<L, C> {
    pub fn with_clock(listener: L, clock: C) -> Self {
        let config = SessionConfig::default();
        Self {
            state: SessionState::new(&config, &[]),
            config,
            catalog: Vec::new(),
            countdown_armed: false,
            listener,
            clock,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the word draw order, mainly for reproducible tests
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn catalog(&self) -> &[WordPair] {
        &self.catalog
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_turn_active {
            Phase::TurnActive
        } else if self.state.turns_remaining == 0 {
            Phase::SessionOver
        } else {
            Phase::Idle
        }
    }

    pub fn is_session_over(&self) -> bool {
        self.phase() == Phase::SessionOver
    }

    /// Replace turn length and turn count. Aborts a running turn.
    pub fn configure(&mut self, turn_duration_secs: u32, total_turns: u32) -> Result<()> {
        self.config = SessionConfig::new(turn_duration_secs, total_turns)?;
        debug!(turn_duration_secs, total_turns, "session configured");
        self.reset();
        Ok(())
    }

    pub fn load_words(&mut self, pairs: Vec<WordPair>) -> Result<()> {
        if pairs.is_empty() {
            return Err(LingoError::InvalidConfig("word list must not be empty".into()));
        }
        debug!(words = pairs.len(), "word catalog loaded");
        self.state.remaining_words = pairs.clone();
        self.catalog = pairs;
        Ok(())
    }

    pub fn start_turn(&mut self) {
        if self.state.is_turn_active {
            debug!("start_turn ignored: a turn is already running");
            return;
        }
        if self.state.turns_remaining == 0 {
            debug!("start_turn ignored: session is over");
            return;
        }
        if self.state.remaining_words.is_empty() {
            debug!("start_turn ignored: no words left");
            return;
        }

        let idx = self.rng.gen_range(0..self.state.remaining_words.len());
        let word = self.state.remaining_words.remove(idx);

        self.listener.on_turn_started(&word);
        self.state.current_word = Some(word);
        self.state.is_turn_active = true;
        self.state.seconds_remaining = self.config.turn_duration_secs;
        self.countdown_armed = true;
        self.listener.on_tick(self.state.seconds_remaining);
        self.state.turn_started_at = Some(self.clock.now());
    }

    /// One-second callback from whatever drives the session
    pub fn on_tick(&mut self) {
        if !self.countdown_armed {
            return;
        }

        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining > 0 {
            self.listener.on_tick(self.state.seconds_remaining);
        } else {
            self.resolve_turn(Outcome::TooSlow);
        }
    }

    pub fn answer_question(&mut self, text: &str) {
        if !self.state.is_turn_active {
            debug!("answer ignored: no active turn");
            return;
        }
        let Some(word) = self.state.current_word.as_ref() else {
            return;
        };

        let is_correct = text.to_lowercase() == word.answer.to_lowercase();
        if is_correct {
            self.state.correct_streak += 1;
            self.state.score += 1;
            if self.state.seconds_remaining <= 1 {
                self.state.sheep_triggered = true;
            }
        } else {
            self.state.correct_streak = 0;
        }

        let elapsed = self
            .state
            .turn_started_at
            .and_then(|started| self.clock.now().duration_since(started).ok())
            .unwrap_or_default();
        self.state.answer_latencies_secs.push(elapsed.as_secs());

        self.resolve_turn(if is_correct {
            Outcome::Correct
        } else {
            Outcome::Wrong
        });
    }

    fn resolve_turn(&mut self, outcome: Outcome) {
        if outcome != Outcome::Wrong {
            self.stop_countdown();
            self.state.is_turn_active = false;
            self.state.turns_remaining = self.state.turns_remaining.saturating_sub(1);
        }
        debug!(%outcome, turns_remaining = self.state.turns_remaining, "turn resolved");
        self.listener.on_turn_resolved(outcome, self.state.turns_remaining);
    }

    fn stop_countdown(&mut self) {
        if std::mem::take(&mut self.countdown_armed) {
            debug!(seconds_left = self.state.seconds_remaining, "countdown stopped");
        }
        self.state.seconds_remaining = self.config.turn_duration_secs;
    }

    pub fn reset(&mut self) {
        self.stop_countdown();
        self.state = SessionState::new(&self.config, &self.catalog);
    }
}
