use std::cell::Cell;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Unified event type consumed by the game loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LingoEvent {
    /// One line typed by the player
    Line(String),
    /// Input stream ended
    Closed,
    Tick,
}

/// Source of player input
pub trait LingoEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<LingoEvent, RecvTimeoutError>;
}

/// Production event source reading lines from stdin on a background thread
pub struct StdinEventSource {
    rx: Receiver<LingoEvent>,
}

impl StdinEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(LingoEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(LingoEvent::Closed);
        });

        Self { rx }
    }
}

impl Default for StdinEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LingoEventSource for StdinEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<LingoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The countdown cadence of a quiz turn
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<LingoEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<LingoEvent>) -> Self {
        Self { rx }
    }
}

impl LingoEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<LingoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Merges input with a steady tick. Input does not push the next tick back.
pub struct Runner<E: LingoEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: LingoEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Restart the tick phase, e.g. when a new turn begins
    pub fn restart_ticks(&self) {
        self.next_tick.set(Instant::now() + self.ticker.interval());
    }

    /// Blocks until the next event or the tick deadline, whichever comes first
    pub fn step(&self) -> LingoEvent {
        let deadline = self.next_tick.get();
        let timeout = deadline.saturating_duration_since(Instant::now());

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.next_tick.set(deadline + self.ticker.interval());
                LingoEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => LingoEvent::Closed,
        }
    }
}
