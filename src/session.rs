use crate::error::{LingoError, Result};
use crate::words::WordPair;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub turn_duration_secs: u32,
    pub total_turns: u32,
}

impl SessionConfig {
    pub fn new(turn_duration_secs: u32, total_turns: u32) -> Result<Self> {
        if turn_duration_secs == 0 {
            return Err(LingoError::InvalidConfig(
                "turn duration must be at least one second".into(),
            ));
        }
        if total_turns == 0 {
            return Err(LingoError::InvalidConfig("a session needs at least one turn".into()));
        }
        Ok(Self {
            turn_duration_secs,
            total_turns,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_duration_secs: 10,
            total_turns: 10,
        }
    }
}

/// Mutable state of the one active session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub remaining_words: Vec<WordPair>,
    pub current_word: Option<WordPair>,
    pub turns_remaining: u32,
    pub seconds_remaining: u32,
    pub is_turn_active: bool,
    pub turn_started_at: Option<SystemTime>,
    // Badge inputs
    pub correct_streak: u32,
    pub answer_latencies_secs: Vec<u64>,
    pub sheep_triggered: bool,
    pub score: u32,
}

impl SessionState {
    pub fn new(config: &SessionConfig, words: &[WordPair]) -> Self {
        Self {
            remaining_words: words.to_vec(),
            current_word: None,
            turns_remaining: config.total_turns,
            seconds_remaining: config.turn_duration_secs,
            is_turn_active: false,
            turn_started_at: None,
            correct_streak: 0,
            answer_latencies_secs: Vec::new(),
            sheep_triggered: false,
            score: 0,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&SessionConfig::default(), &[])
    }
}
