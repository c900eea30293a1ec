use crate::error::{LingoError, Result};
use crate::session::SessionConfig;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalogs");

/// A word to translate and its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub prompt: String,
    pub answer: String,
}

impl WordPair {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }
}

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
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    /// Parse the lowercase name used in storage
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(name.trim()))
    }

    /// Turn length and turn count selected together with the tier
    pub fn preset(&self) -> SessionConfig {
        let (turn_duration_secs, total_turns) = match self {
            Difficulty::Easy => (6, 2),
            Difficulty::Medium => (8, 10),
            Difficulty::Hard => (8, 10),
            Difficulty::Extreme => (12, 10),
        };
        SessionConfig {
            turn_duration_secs,
            total_turns,
        }
    }

    pub fn catalog(&self) -> Result<WordCatalog> {
        read_catalog(&format!("{self}.json"))
    }
}

/// Ordered word list shipped for one difficulty
#[derive(Deserialize, Clone, Debug)]
pub struct WordCatalog {
    pub name: String,
    pub size: u32,
    pub words: Vec<WordPair>,
}

fn read_catalog(file_name: &str) -> Result<WordCatalog> {
    let file = CATALOG_DIR
        .get_file(file_name)
        .ok_or_else(|| LingoError::Catalog(format!("{file_name} not found")))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| LingoError::Catalog(format!("{file_name} is not utf-8")))?;

    serde_json::from_str(contents).map_err(|e| LingoError::Catalog(format!("{file_name}: {e}")))
}
