use crate::achievements::{unlock_achievements, Aggregates, BadgeId, SessionStats};
use crate::engine::{Clock, Engine, SessionListener, SystemClock};
use crate::error::{LingoError, Result};
use crate::ledger::{BadgeLedger, ScoreLedger, ScoreLedgerEntry};
use crate::profile::PlayerProfile;
use crate::util::average_secs;
use crate::words::Difficulty;
use tracing::info;

/// End-of-game report for the front end
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub score: u32,
    pub total_turns: u32,
    pub lifetime_score: u32,
    pub new_badges: Vec<BadgeId>,
    pub average_latency_secs: Option<f64>,
}

/// An engine bound to the difficulty tier it was prepared with
#[derive(Debug)]
pub struct Game<L: SessionListener, C: Clock = SystemClock> {
    engine: Engine<L, C>,
    difficulty: Difficulty,
}

impl<L: SessionListener, C: Clock> Game<L, C> {
    /// Apply a tier's preset and catalog to an engine
    pub fn prepare(mut engine: Engine<L, C>, difficulty: Difficulty) -> Result<Self> {
        let preset = difficulty.preset();
        engine.configure(preset.turn_duration_secs, preset.total_turns)?;
        engine.load_words(difficulty.catalog()?.words)?;
        Ok(Self { engine, difficulty })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn engine(&self) -> &Engine<L, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<L, C> {
        &mut self.engine
    }

    pub fn session_stats(&self, profile: &PlayerProfile, is_first_game: bool) -> SessionStats {
        let state = self.engine.state();
        SessionStats {
            score: state.score,
            total_turns: self.engine.config().total_turns,
            correct_streak: state.correct_streak,
            answer_latencies_secs: state.answer_latencies_secs.clone(),
            sheep_triggered: state.sheep_triggered,
            difficulty: self.difficulty,
            player_name: profile.player_name.clone(),
            dark_mode: profile.dark_mode,
            is_first_game,
        }
    }
}

/// Game for one difficulty tier, on the system clock
pub fn new_game<L: SessionListener>(difficulty: Difficulty, listener: L) -> Result<Game<L>> {
    Game::prepare(Engine::new(listener), difficulty)
}

/// Record the score, then unlock badges against the updated totals.
/// Refuses to touch the ledger until every turn has been played.
pub fn finish_game<L, C, D>(
    game: &Game<L, C>,
    profile: &PlayerProfile,
    ledger: &mut D,
) -> Result<GameSummary>
where
    L: SessionListener,
    C: Clock,
    D: ScoreLedger + BadgeLedger + ?Sized,
{
    if !game.engine().is_session_over() {
        return Err(LingoError::InvalidConfig("session is not over".into()));
    }

    let player = profile.player_name.as_str();
    let is_first_game = ledger.games_played(player)? == 0;
    let stats = game.session_stats(profile, is_first_game);

    ledger.record_game(&ScoreLedgerEntry::now(player, stats.score, game.difficulty()))?;

    let aggregates = Aggregates {
        lifetime_score: ledger.lifetime_score(player)?,
        difficulties_played: ledger.difficulties_played(player)?,
    };
    let new_badges = unlock_achievements(ledger, &stats, &aggregates)?;

    info!(
        player,
        difficulty = %game.difficulty(),
        score = stats.score,
        lifetime = aggregates.lifetime_score,
        unlocked = new_badges.len(),
        "game finished"
    );

    Ok(GameSummary {
        score: stats.score,
        total_turns: stats.total_turns,
        lifetime_score: aggregates.lifetime_score,
        average_latency_secs: average_secs(&stats.answer_latencies_secs),
        new_badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ManualClock, SessionEvent};
    use crate::ledger::LingoDb;
    use assert_matches::assert_matches;
    use std::collections::BTreeSet;

    fn profile(name: &str, difficulty: Difficulty) -> PlayerProfile {
        PlayerProfile {
            player_name: name.to_string(),
            difficulty,
            dark_mode: false,
        }
    }

    fn play_perfect_game(
        difficulty: Difficulty,
        clock: &ManualClock,
    ) -> Game<Vec<SessionEvent>, ManualClock> {
        let engine = Engine::with_clock(Vec::new(), clock.clone()).seeded(1);
        let mut game = Game::prepare(engine, difficulty).unwrap();
        while !game.engine().is_session_over() {
            let engine = game.engine_mut();
            engine.start_turn();
            clock.advance_secs(1);
            let answer = engine.state().current_word.clone().unwrap().answer;
            engine.answer_question(&answer);
        }
        game
    }

    #[test]
    fn new_game_uses_preset() {
        let game = new_game(Difficulty::Extreme, ()).unwrap();
        assert_eq!(game.difficulty(), Difficulty::Extreme);
        assert_eq!(game.engine().config().turn_duration_secs, 12);
        assert_eq!(game.engine().state().turns_remaining, 10);
        assert_eq!(game.engine().state().remaining_words.len(), 20);
    }

    #[test]
    fn unfinished_game_is_not_recorded() {
        let mut db = LingoDb::open_in_memory().unwrap();
        let player = profile("Kim", Difficulty::Easy);
        let mut game = new_game(Difficulty::Easy, ()).unwrap();

        assert_matches!(
            finish_game(&game, &player, &mut db),
            Err(LingoError::InvalidConfig(_))
        );

        game.engine_mut().start_turn();
        assert_matches!(
            finish_game(&game, &player, &mut db),
            Err(LingoError::InvalidConfig(_))
        );

        assert_eq!(db.games_played("Kim").unwrap(), 0);
        assert!(!db.has_badge_data("Kim").unwrap());
    }

    #[test]
    fn first_game_is_detected_before_recording() {
        let clock = ManualClock::new();
        let mut db = LingoDb::open_in_memory().unwrap();
        let player = profile("Kim", Difficulty::Easy);

        let game = play_perfect_game(Difficulty::Easy, &clock);
        let summary = finish_game(&game, &player, &mut db).unwrap();
        assert_eq!(summary.score, 2);
        assert_eq!(summary.lifetime_score, 2);
        assert_eq!(summary.average_latency_secs, Some(1.0));
        assert!(summary.new_badges.contains(&BadgeId::FirstGame));
        assert!(summary.new_badges.contains(&BadgeId::Speed));

        let game = play_perfect_game(Difficulty::Easy, &clock);
        let summary = finish_game(&game, &player, &mut db).unwrap();
        assert_eq!(summary.lifetime_score, 4);
        assert!(summary.new_badges.is_empty());
    }

    #[test]
    fn lifetime_score_includes_current_game() {
        let clock = ManualClock::new();
        let mut db = LingoDb::open_in_memory().unwrap();
        let player = profile("Kim", Difficulty::Hard);
        db.record_game(&ScoreLedgerEntry::now("Kim", 25, Difficulty::Medium))
            .unwrap();

        let game = play_perfect_game(Difficulty::Hard, &clock);
        let summary = finish_game(&game, &player, &mut db).unwrap();
        assert_eq!(summary.lifetime_score, 35);
        assert!(summary.new_badges.contains(&BadgeId::Score30));
        assert!(summary.new_badges.contains(&BadgeId::NoMistakesHard));
        assert!(!summary.new_badges.contains(&BadgeId::FirstGame));
        assert!(db.has_badge("Kim", BadgeId::Score30).unwrap());
    }

    #[test]
    fn played_tier_wins_over_profile_tier() {
        let clock = ManualClock::new();
        let mut db = LingoDb::open_in_memory().unwrap();
        let player = profile("Kim", Difficulty::Easy);

        let game = play_perfect_game(Difficulty::Hard, &clock);
        let summary = finish_game(&game, &player, &mut db).unwrap();

        assert!(summary.new_badges.contains(&BadgeId::NoMistakesHard));
        assert_eq!(
            db.difficulties_played("Kim").unwrap(),
            BTreeSet::from([Difficulty::Hard])
        );
    }

    #[test]
    fn zero_score_badge_unlocks_once() {
        let mut db = LingoDb::open_in_memory().unwrap();
        let player = profile("Kim", Difficulty::Easy);

        for round in 0..2 {
            let engine = Engine::with_clock(Vec::new(), ManualClock::new());
            let mut game = Game::prepare(engine, Difficulty::Easy).unwrap();
            while !game.engine().is_session_over() {
                let engine = game.engine_mut();
                engine.start_turn();
                for _ in 0..6 {
                    engine.on_tick();
                }
            }

            let summary = finish_game(&game, &player, &mut db).unwrap();
            assert_eq!(summary.score, 0);
            assert_eq!(summary.average_latency_secs, None);
            assert_eq!(
                summary.new_badges.contains(&BadgeId::ZeroScore),
                round == 0
            );
        }
        assert!(db.has_badge("Kim", BadgeId::ZeroScore).unwrap());
    }
}
