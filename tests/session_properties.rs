use proptest::prelude::*;
use std::collections::BTreeSet;

use swift_lingo::achievements::{evaluate_achievements, Aggregates, BadgeId, SessionStats};
use swift_lingo::engine::{Engine, ManualClock, Outcome, SessionEvent};
use swift_lingo::words::{Difficulty, WordPair};

#[derive(Debug, Clone)]
enum Action {
    Start,
    Tick,
    AnswerRight,
    AnswerWrong,
    Reset,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Start),
        4 => Just(Action::Tick),
        2 => Just(Action::AnswerRight),
        2 => Just(Action::AnswerWrong),
    ]
}

fn words(n: usize) -> Vec<WordPair> {
    (0..n)
        .map(|i| WordPair::new(format!("word{i}"), format!("ord{i}")))
        .collect()
}

fn engine(duration: u32, turns: u32) -> Engine<Vec<SessionEvent>, ManualClock> {
    let mut engine = Engine::with_clock(Vec::new(), ManualClock::new());
    engine.configure(duration, turns).unwrap();
    engine.load_words(words(turns as usize + 2)).unwrap();
    engine
}

fn apply(engine: &mut Engine<Vec<SessionEvent>, ManualClock>, action: &Action) {
    match action {
        Action::Start => engine.start_turn(),
        Action::Tick => engine.on_tick(),
        Action::AnswerRight => {
            if let Some(word) = engine.state().current_word.clone() {
                engine.answer_question(&word.answer.to_uppercase());
            }
        }
        Action::AnswerWrong => engine.answer_question("definitely not it"),
        Action::Reset => engine.reset(),
    }
}

proptest! {
    #[test]
    fn turns_remaining_never_increases(
        duration in 1u32..5,
        turns in 1u32..6,
        actions in prop::collection::vec(action(), 0..80),
    ) {
        let mut engine = engine(duration, turns);
        let mut last = engine.state().turns_remaining;

        for action in &actions {
            apply(&mut engine, action);
            let now = engine.state().turns_remaining;
            prop_assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn wrong_never_consumes_and_others_always_do(
        duration in 1u32..5,
        turns in 1u32..6,
        actions in prop::collection::vec(action(), 0..80),
    ) {
        let mut engine = engine(duration, turns);

        for action in &actions {
            let before = engine.state().turns_remaining;
            let seen = engine.listener().len();
            apply(&mut engine, action);

            for event in &engine.listener()[seen..] {
                if let SessionEvent::TurnResolved { outcome, turns_remaining } = event {
                    match outcome {
                        Outcome::Wrong => {
                            prop_assert_eq!(*turns_remaining, before);
                            prop_assert!(engine.state().is_turn_active);
                        }
                        Outcome::Correct | Outcome::TooSlow => {
                            prop_assert_eq!(*turns_remaining, before - 1);
                            prop_assert!(!engine.state().is_turn_active);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn reset_restores_config(
        duration in 1u32..8,
        turns in 1u32..6,
        actions in prop::collection::vec(action(), 0..40),
    ) {
        let mut engine = engine(duration, turns);
        for action in &actions {
            apply(&mut engine, action);
        }
        apply(&mut engine, &Action::Reset);

        prop_assert_eq!(engine.state().seconds_remaining, duration);
        prop_assert_eq!(engine.state().turns_remaining, turns);
        prop_assert!(engine.state().answer_latencies_secs.is_empty());
        prop_assert!(!engine.state().is_turn_active);
    }
}

fn stats(difficulty: Difficulty, streak: u32) -> SessionStats {
    SessionStats {
        score: 3,
        total_turns: 10,
        correct_streak: streak,
        answer_latencies_secs: vec![7],
        sheep_triggered: false,
        difficulty,
        player_name: "Kim".to_string(),
        dark_mode: false,
        is_first_game: false,
    }
}

#[test]
fn streak_badge_is_exclusive_per_difficulty() {
    let streaks = [
        BadgeId::EasyStreak,
        BadgeId::MediumStreak,
        BadgeId::HardStreak,
        BadgeId::ExtremeStreak,
    ];
    for difficulty in Difficulty::ALL {
        let earned = evaluate_achievements(
            &stats(difficulty, 20),
            &Aggregates::default(),
            &BTreeSet::new(),
        );
        let fired: Vec<_> = earned.iter().filter(|b| streaks.contains(b)).collect();
        assert_eq!(fired, vec![&BadgeId::streak_for(difficulty)]);
    }
}

#[test]
fn second_evaluation_with_held_badges_is_empty() {
    let s = SessionStats {
        score: 0,
        is_first_game: true,
        dark_mode: true,
        sheep_triggered: true,
        player_name: "Anna".to_string(),
        ..stats(Difficulty::Easy, 25)
    };
    let aggregates = Aggregates {
        lifetime_score: 120,
        difficulties_played: Difficulty::ALL.into_iter().collect(),
    };

    let mut held = BTreeSet::new();
    let first = evaluate_achievements(&s, &aggregates, &held);
    assert!(first.contains(&BadgeId::ZeroScore));
    assert!(first.contains(&BadgeId::Score100));
    held.extend(first);

    assert!(evaluate_achievements(&s, &aggregates, &held).is_empty());
}
