use crate::error::Result;
use crate::ledger::BadgeLedger;
use crate::util::count_within;
use crate::words::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Streak length needed for the per-difficulty streak badges
pub const STREAK_TARGET: u32 = 20;
pub const SPEED_LIMIT_SECS: u64 = 4;
pub const FAST_ANSWER_SECS: u64 = 2;
pub const FAST_ANSWERS_NEEDED: usize = 10;
pub const SCORE_TIERS: [(u32, BadgeId); 4] = [
    (30, BadgeId::Score30),
    (50, BadgeId::Score50),
    (75, BadgeId::Score75),
    (100, BadgeId::Score100),
];

const DOG_NAMES: [&str; 3] = ["woof", "hund", "dog"];
const DEVELOPER_NAMES: [&str; 3] = ["magnus", "nicholas", "simon"];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BadgeId {
    FirstGame,
    Score30,
    Score50,
    Score75,
    Score100,
    ZeroScore,
    NearPerfect,
    NightMode,
    Palindrome,
    EasyStreak,
    MediumStreak,
    HardStreak,
    ExtremeStreak,
    FullClearExtreme,
    NoMistakesHard,
    Speed,
    FastStreak,
    LastSecond,
    AllDifficulties,
    Woof,
    Developer,
    // Awarded by the front end, never by the rule table
    PepsiLover,
    HulkSmash,
    BugHunter,
    Egg,
}

impl BadgeId {
    pub const ALL: [BadgeId; 25] = [
        BadgeId::FirstGame,
        BadgeId::Score30,
        BadgeId::Score50,
        BadgeId::Score75,
        BadgeId::Score100,
        BadgeId::ZeroScore,
        BadgeId::NearPerfect,
        BadgeId::NightMode,
        BadgeId::Palindrome,
        BadgeId::EasyStreak,
        BadgeId::MediumStreak,
        BadgeId::HardStreak,
        BadgeId::ExtremeStreak,
        BadgeId::FullClearExtreme,
        BadgeId::NoMistakesHard,
        BadgeId::Speed,
        BadgeId::FastStreak,
        BadgeId::LastSecond,
        BadgeId::AllDifficulties,
        BadgeId::Woof,
        BadgeId::Developer,
        BadgeId::PepsiLover,
        BadgeId::HulkSmash,
        BadgeId::BugHunter,
        BadgeId::Egg,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.to_string() == name)
    }

    pub fn streak_for(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => BadgeId::EasyStreak,
            Difficulty::Medium => BadgeId::MediumStreak,
            Difficulty::Hard => BadgeId::HardStreak,
            Difficulty::Extreme => BadgeId::ExtremeStreak,
        }
    }

    /// Shown once the badge is unlocked
    pub fn title(&self) -> &'static str {
        match self {
            BadgeId::FirstGame => "🍼 Aww your first time",
            BadgeId::Score30 => "🔑 30 points total",
            BadgeId::Score50 => "🎯 50 points total",
            BadgeId::Score75 => "👑 75 points total",
            BadgeId::Score100 => "💎 100 points total",
            BadgeId::ZeroScore => "🤷 Did you even try?",
            BadgeId::NearPerfect => "🥲 ONE wrong, just one",
            BadgeId::NightMode => "🦇 You merely adopted the dark",
            BadgeId::Palindrome => "🔢 Ah yes the perfect reflection",
            BadgeId::EasyStreak => "🧩 Easy 20 streak",
            BadgeId::MediumStreak => "🔥 Medium 20 streak",
            BadgeId::HardStreak => "💥 Hard 20 streak",
            BadgeId::ExtremeStreak => "👽 Extreme 20 streak",
            BadgeId::FullClearExtreme => "🏆 100% correct in one Extreme game",
            BadgeId::NoMistakesHard => "🥊 0 mistakes in hard mode",
            BadgeId::Speed => "⏱️ Always answered under 4s",
            BadgeId::FastStreak => "🏎️ F1 wants to meet you",
            BadgeId::LastSecond => "🐑 Are you afraid?",
            BadgeId::AllDifficulties => "🎲 Played all difficulties",
            BadgeId::Woof => "🦮 Woof Woof",
            BadgeId::Developer => "🧙 You shall not pass",
            BadgeId::PepsiLover => "🥤 Maxed out your energy?",
            BadgeId::HulkSmash => "🎮 You pressed something... too many times",
            BadgeId::BugHunter => "🪲 Bug hunter",
            BadgeId::Egg => "🥚 Secret",
        }
    }

    /// Shown while the badge is still locked
    pub fn hint(&self) -> &'static str {
        match self {
            BadgeId::FirstGame => "Complete your first game",
            BadgeId::Score30 => "Score at least 30 points in total",
            BadgeId::Score50 => "Score at least 50 points in total",
            BadgeId::Score75 => "Score at least 75 points in total",
            BadgeId::Score100 => "Score at least 100 points in total",
            BadgeId::ZeroScore => "Score 0 points in one game",
            BadgeId::NearPerfect => "Get all but one question right in one game",
            BadgeId::NightMode => "Activate dark mode and finish a full game",
            BadgeId::Palindrome => "Balance to the Force, your name brings",
            BadgeId::EasyStreak => "Get 20 correct in a row on Easy",
            BadgeId::MediumStreak => "Get 20 correct in a row on Medium",
            BadgeId::HardStreak => "Get 20 correct in a row on Hard",
            BadgeId::ExtremeStreak => "Get 20 correct in a row on Extreme",
            BadgeId::FullClearExtreme => "Answer all questions correctly in one game on Extreme",
            BadgeId::NoMistakesHard => "0 mistakes in hard mode",
            BadgeId::Speed => "Answer every question under 4 seconds",
            BadgeId::FastStreak => "Get 10 answers under 2 seconds each",
            BadgeId::LastSecond => "Answer right before the timer hits 0...",
            BadgeId::AllDifficulties => "Finish a game on every difficulty",
            BadgeId::Woof => "Your name is what?",
            BadgeId::Developer => "Only given to the developers",
            BadgeId::PepsiLover => "Play with a Pepsi Max drink",
            BadgeId::HulkSmash => "You pressed too many buttons...",
            BadgeId::BugHunter => "Ah, the joys of coding...",
            BadgeId::Egg => "SECRET",
        }
    }
}

/// What happened in the game that just ended
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub score: u32,
    pub total_turns: u32,
    pub correct_streak: u32,
    pub answer_latencies_secs: Vec<u64>,
    pub sheep_triggered: bool,
    pub difficulty: Difficulty,
    pub player_name: String,
    pub dark_mode: bool,
    pub is_first_game: bool,
}

/// Persisted totals, already including the game being evaluated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub lifetime_score: u32,
    pub difficulties_played: BTreeSet<Difficulty>,
}

fn is_palindrome(name: &str) -> bool {
    let lower: Vec<char> = name.to_lowercase().chars().collect();
    !lower.is_empty() && lower.iter().eq(lower.iter().rev())
}

fn name_in(name: &str, list: &[&str]) -> bool {
    let lower = name.trim().to_lowercase();
    list.iter().any(|n| *n == lower)
}

/// Badges earned by this game that the player does not hold yet, in rule order
pub fn evaluate_achievements(
    stats: &SessionStats,
    aggregates: &Aggregates,
    already_unlocked: &BTreeSet<BadgeId>,
) -> Vec<BadgeId> {
    let mut earned = Vec::new();
    let mut rule = |fired: bool, badge: BadgeId| {
        if fired && !already_unlocked.contains(&badge) && !earned.contains(&badge) {
            earned.push(badge);
        }
    };

    rule(stats.is_first_game, BadgeId::FirstGame);
    for (threshold, badge) in SCORE_TIERS {
        rule(aggregates.lifetime_score >= threshold, badge);
    }
    rule(stats.score == 0, BadgeId::ZeroScore);
    rule(
        stats.score + 1 == stats.total_turns,
        BadgeId::NearPerfect,
    );
    rule(stats.dark_mode, BadgeId::NightMode);
    rule(is_palindrome(&stats.player_name), BadgeId::Palindrome);
    rule(
        stats.correct_streak >= STREAK_TARGET,
        BadgeId::streak_for(stats.difficulty),
    );

    let full_clear = stats.score == stats.total_turns;
    rule(
        full_clear && stats.difficulty == Difficulty::Extreme,
        BadgeId::FullClearExtreme,
    );
    rule(
        full_clear && stats.difficulty == Difficulty::Hard,
        BadgeId::NoMistakesHard,
    );

    let latencies = &stats.answer_latencies_secs;
    rule(
        !latencies.is_empty() && count_within(latencies, SPEED_LIMIT_SECS) == latencies.len(),
        BadgeId::Speed,
    );
    rule(
        count_within(latencies, FAST_ANSWER_SECS) >= FAST_ANSWERS_NEEDED,
        BadgeId::FastStreak,
    );
    rule(stats.sheep_triggered, BadgeId::LastSecond);
    rule(
        Difficulty::ALL
            .iter()
            .all(|d| aggregates.difficulties_played.contains(d)),
        BadgeId::AllDifficulties,
    );
    rule(name_in(&stats.player_name, &DOG_NAMES), BadgeId::Woof);
    rule(name_in(&stats.player_name, &DEVELOPER_NAMES), BadgeId::Developer);

    earned
}

/// Evaluate against the player's ledger and persist whatever is new
pub fn unlock_achievements<B: BadgeLedger + ?Sized>(
    ledger: &mut B,
    stats: &SessionStats,
    aggregates: &Aggregates,
) -> Result<Vec<BadgeId>> {
    let already = ledger.unlocked_badges(&stats.player_name)?;
    let earned = evaluate_achievements(stats, aggregates, &already);

    for badge in &earned {
        award_badge(ledger, &stats.player_name, *badge)?;
    }

    Ok(earned)
}

/// Grant one badge outside the end-of-game rules. True if it is new.
pub fn award_badge<B: BadgeLedger + ?Sized>(
    ledger: &mut B,
    player: &str,
    badge: BadgeId,
) -> Result<bool> {
    let added = ledger.add_badge(player, badge)?;
    if added {
        info!(player, %badge, "badge unlocked");
    }
    Ok(added)
}
