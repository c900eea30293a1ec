use clap::{error::ErrorKind, CommandFactory, Parser};
use itertools::Itertools;
use std::error::Error;
use swift_lingo::{
    achievements::{award_badge, BadgeId},
    engine::{Engine, Outcome, SessionEvent},
    game::{finish_game, new_game, GameSummary},
    ledger::{BadgeLedger, LingoDb, ScoreLedger},
    profile::{FileProfileStore, PlayerProfile, ProfileStore},
    runtime::{FixedTicker, LingoEvent, Runner, StdinEventSource},
    words::{Difficulty, WordPair},
};
use tracing_subscriber::EnvFilter;

/// Blank submissions in one game that count as button mashing
const SMASH_PRESSES: u32 = 10;

/// timed vocabulary quiz with badges and high scores
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Translate the words shown one at a time before the countdown runs out. Scores and badges are saved per player."
)]
pub struct Cli {
    /// player name (saved for next time)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// difficulty tier (saved for next time)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// turn dark mode on
    #[clap(long, conflicts_with = "light_mode")]
    dark_mode: bool,

    /// turn dark mode off
    #[clap(long)]
    light_mode: bool,

    /// print the high-score table and exit
    #[clap(long)]
    scores: bool,

    /// number of rows in the high-score table
    #[clap(long, default_value_t = 10)]
    limit: usize,

    /// print the trophy room for the player and exit
    #[clap(long)]
    badges: bool,

    /// remove every badge of the player and exit
    #[clap(long, requires = "name")]
    reset_badges: bool,

    #[clap(long, hide = true)]
    pepsi_max: bool,

    #[clap(long, hide = true, requires = "badges")]
    tap: Option<u8>,
}

impl Cli {
    /// Merge command-line overrides into the saved profile
    fn apply_to(&self, profile: &mut PlayerProfile) -> bool {
        let before = profile.clone();
        if let Some(name) = &self.name {
            profile.player_name = name.trim().to_string();
        }
        if let Some(difficulty) = self.difficulty {
            profile.difficulty = difficulty;
        }
        if self.dark_mode {
            profile.dark_mode = true;
        }
        if self.light_mode {
            profile.dark_mode = false;
        }
        *profile != before
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let store = FileProfileStore::new();
    let mut profile = store.load();
    if cli.apply_to(&mut profile) {
        store.save(&profile)?;
    }

    let mut db = LingoDb::open_default()?;

    if cli.scores {
        print!("{}", render_high_scores(&db, cli.limit)?);
        return Ok(());
    }

    if cli.reset_badges {
        db.remove_all_badges(&profile.player_name)?;
        println!("Removed all badges for {}", profile.player_name);
        return Ok(());
    }

    if !profile.has_name() {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "you need to enter a name to play (--name)",
        )
        .exit();
    }

    if cli.badges {
        if let Some(badge) = cli.tap.and_then(tap_badge) {
            if award_badge(&mut db, &profile.player_name, badge)? {
                println!("You found it! Secret badge unlocked: {}", badge.title());
            }
        }
        let unlocked = db.unlocked_badges(&profile.player_name)?;
        print!("{}", render_trophy_room(&unlocked));
        return Ok(());
    }

    if db.has_badge_data(&profile.player_name)? {
        println!("Welcome back, {}!", profile.player_name);
    }
    println!(
        "{} mode: {} turns, {} seconds each. Type the translation and press enter.",
        profile.difficulty,
        profile.difficulty.preset().total_turns,
        profile.difficulty.preset().turn_duration_secs,
    );

    let mut game = new_game(profile.difficulty, Vec::new())?;
    let runner = Runner::new(StdinEventSource::new(), FixedTicker::every_second());

    let Some(report) = play(game.engine_mut(), &runner) else {
        println!("Game abandoned, nothing was saved.");
        return Ok(());
    };

    let mut summary = finish_game(&game, &profile, &mut db)?;
    for badge in front_end_badges(&cli, &report) {
        if award_badge(&mut db, &profile.player_name, badge)? {
            summary.new_badges.push(badge);
        }
    }
    print!("{}", render_summary(&summary));

    Ok(())
}

/// What the play loop saw that the engine does not track
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PlayReport {
    blank_presses: u32,
}

/// Drive one session to its end. None if input closed first.
fn play(
    engine: &mut Engine<Vec<SessionEvent>>,
    runner: &Runner<StdinEventSource, FixedTicker>,
) -> Option<PlayReport> {
    let mut report = PlayReport::default();
    let mut current: Option<WordPair> = None;
    engine.start_turn();
    runner.restart_ticks();

    loop {
        let mut next_turn = false;
        for event in std::mem::take(engine.listener_mut()) {
            match event {
                SessionEvent::TurnStarted(word) => {
                    println!("\nTranslate: {}", word.prompt);
                    current = Some(word);
                }
                SessionEvent::Tick(secs) => {
                    if secs == engine.config().turn_duration_secs || secs <= 3 {
                        println!("  {secs}s left");
                    }
                }
                SessionEvent::TurnResolved {
                    outcome,
                    turns_remaining,
                } => {
                    let answer = current.as_ref().map(|w| w.answer.as_str()).unwrap_or("");
                    println!("{}", describe_outcome(outcome, answer));
                    if turns_remaining == 0 {
                        println!("\nGame over!");
                        return Some(report);
                    }
                    next_turn = outcome != Outcome::Wrong;
                }
            }
        }

        if next_turn {
            engine.start_turn();
            runner.restart_ticks();
            continue;
        }

        match runner.step() {
            LingoEvent::Tick => engine.on_tick(),
            LingoEvent::Line(line) => {
                if line.trim().is_empty() {
                    report.blank_presses += 1;
                } else {
                    engine.answer_question(&line);
                }
            }
            LingoEvent::Closed => return None,
        }
    }
}

/// Double tap on the trophy room finds the bug, triple tap the egg
fn tap_badge(taps: u8) -> Option<BadgeId> {
    match taps {
        2 => Some(BadgeId::BugHunter),
        3 => Some(BadgeId::Egg),
        _ => None,
    }
}

fn front_end_badges(cli: &Cli, report: &PlayReport) -> Vec<BadgeId> {
    let mut badges = Vec::new();
    if cli.pepsi_max {
        badges.push(BadgeId::PepsiLover);
    }
    if report.blank_presses >= SMASH_PRESSES {
        badges.push(BadgeId::HulkSmash);
    }
    badges
}

fn describe_outcome(outcome: Outcome, answer: &str) -> String {
    match outcome {
        Outcome::Correct => "Correct! You earned a point.".to_string(),
        Outcome::Wrong => "Wrong answer, try again.".to_string(),
        Outcome::TooSlow => format!("Too slow! It was \"{answer}\"."),
    }
}

fn render_summary(summary: &GameSummary) -> String {
    let mut out = format!(
        "You got {} of {} right. Lifetime score: {}\n",
        summary.score, summary.total_turns, summary.lifetime_score
    );
    if let Some(avg) = summary.average_latency_secs {
        out.push_str(&format!("Average answer time: {avg:.1}s\n"));
    }
    for badge in &summary.new_badges {
        out.push_str(&format!("🎖️ New badge: {}\n", badge.title()));
    }
    out
}

fn render_high_scores<S: ScoreLedger>(ledger: &S, limit: usize) -> Result<String, Box<dyn Error>> {
    let scores = ledger.high_scores(limit)?;
    if scores.is_empty() {
        return Ok("🏆 Highscore: No scores saved\n".to_string());
    }
    let rows = scores
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                "{:>2}. {:<16} {:>4}  {}",
                i + 1,
                h.player_name,
                h.score,
                h.date.format("%Y-%m-%d")
            )
        })
        .join("\n");
    Ok(format!("🏆 Highscore\n{rows}\n"))
}

fn render_trophy_room(unlocked: &std::collections::BTreeSet<BadgeId>) -> String {
    let (earned, locked): (Vec<BadgeId>, Vec<BadgeId>) =
        BadgeId::ALL.into_iter().partition(|b| unlocked.contains(b));

    let mut out = format!("Unlocked {}/{}\n", earned.len(), BadgeId::ALL.len());
    for badge in earned {
        out.push_str(&format!("  🎖️ {}\n", badge.title()));
    }
    for badge in locked {
        out.push_str(&format!("  🔒 {}\n", badge.hint()));
    }
    out
}
