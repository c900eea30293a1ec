use crate::achievements::BadgeId;
use crate::app_dirs::AppDirs;
use crate::error::{LingoError, Result};
use crate::words::Difficulty;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One finished game, as appended to the score ledger
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLedgerEntry {
    pub player_name: String,
    pub score: u32,
    pub date: DateTime<Local>,
    pub difficulty: Difficulty,
}

impl ScoreLedgerEntry {
    pub fn now(player_name: &str, score: u32, difficulty: Difficulty) -> Self {
        Self {
            player_name: player_name.to_string(),
            score,
            date: Local::now(),
            difficulty,
        }
    }
}

/// Row of the high-score table
#[derive(Debug, Clone, PartialEq)]
pub struct HighScore {
    pub player_name: String,
    pub score: u32,
    pub date: DateTime<Local>,
}

pub trait ScoreLedger {
    fn record_game(&mut self, entry: &ScoreLedgerEntry) -> Result<()>;
    fn lifetime_score(&self, player: &str) -> Result<u32>;
    fn games_played(&self, player: &str) -> Result<u32>;
    fn difficulties_played(&self, player: &str) -> Result<BTreeSet<Difficulty>>;
    /// Best first; a player listed with the same score twice shows once
    fn high_scores(&self, limit: usize) -> Result<Vec<HighScore>>;
}

pub trait BadgeLedger {
    fn unlocked_badges(&self, player: &str) -> Result<BTreeSet<BadgeId>>;
    /// Returns false when the player already held the badge
    fn add_badge(&mut self, player: &str, badge: BadgeId) -> Result<bool>;
    fn has_badge(&self, player: &str, badge: BadgeId) -> Result<bool>;
    fn has_badge_data(&self, player: &str) -> Result<bool>;
    fn remove_all_badges(&mut self, player: &str) -> Result<()>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_name TEXT NOT NULL,
    score INTEGER NOT NULL,
    difficulty TEXT NOT NULL,
    played_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scores_player ON scores(player_name);
CREATE TABLE IF NOT EXISTS badges (
    player_name TEXT NOT NULL,
    badge TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    PRIMARY KEY (player_name, badge)
);
"#;

/// SQLite-backed score and badge ledgers
#[derive(Debug)]
pub struct LingoDb {
    conn: Connection,
}

impl LingoDb {
    /// Open the database at the default state location
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| {
            warn!("no home or data directory, using ./lingo.db");
            PathBuf::from("lingo.db")
        });
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening ledger database");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn parse_date(raw: &str) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Local))
        .map_err(|e| LingoError::Corrupt(format!("bad date {raw:?} in ledger: {e}")))
}

impl ScoreLedger for LingoDb {
    fn record_game(&mut self, entry: &ScoreLedgerEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scores (player_name, score, difficulty, played_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.player_name,
                entry.score,
                entry.difficulty.to_string(),
                entry.date.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn lifetime_score(&self, player: &str) -> Result<u32> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(score), 0) FROM scores WHERE player_name = ?1",
            [player],
            |row| row.get(0),
        )?;
        Ok(to_u32(total))
    }

    fn games_played(&self, player: &str) -> Result<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM scores WHERE player_name = ?1",
            [player],
            |row| row.get(0),
        )?;
        Ok(to_u32(count))
    }

    fn difficulties_played(&self, player: &str) -> Result<BTreeSet<Difficulty>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT difficulty FROM scores WHERE player_name = ?1")?;
        let names = stmt.query_map([player], |row| row.get::<_, String>(0))?;

        let mut played = BTreeSet::new();
        for name in names {
            let name = name?;
            match Difficulty::from_name(&name) {
                Some(d) => {
                    played.insert(d);
                }
                None => warn!(difficulty = %name, "unknown difficulty in score ledger"),
            }
        }
        Ok(played)
    }

    fn high_scores(&self, limit: usize) -> Result<Vec<HighScore>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT player_name, score, MIN(played_at)
            FROM scores
            GROUP BY player_name, score
            ORDER BY score DESC, MIN(played_at) ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut scores = Vec::new();
        for row in rows {
            let (player_name, score, played_at) = row?;
            scores.push(HighScore {
                player_name,
                score: to_u32(score),
                date: parse_date(&played_at)?,
            });
        }
        Ok(scores)
    }
}

impl BadgeLedger for LingoDb {
    fn unlocked_badges(&self, player: &str) -> Result<BTreeSet<BadgeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge FROM badges WHERE player_name = ?1")?;
        let names = stmt.query_map([player], |row| row.get::<_, String>(0))?;

        let mut badges = BTreeSet::new();
        for name in names {
            let name = name?;
            match BadgeId::from_name(&name) {
                Some(badge) => {
                    badges.insert(badge);
                }
                None => warn!(badge = %name, "unknown badge in ledger"),
            }
        }
        Ok(badges)
    }

    fn add_badge(&mut self, player: &str, badge: BadgeId) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO badges (player_name, badge, unlocked_at) VALUES (?1, ?2, ?3)",
            params![player, badge.to_string(), Local::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    fn has_badge(&self, player: &str, badge: BadgeId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM badges WHERE player_name = ?1 AND badge = ?2",
            params![player, badge.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn has_badge_data(&self, player: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM badges WHERE player_name = ?1",
            [player],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn remove_all_badges(&mut self, player: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM badges WHERE player_name = ?1", [player])?;
        Ok(())
    }
}
