use crate::app_dirs::AppDirs;
use crate::error::{LingoError, Result};
use crate::words::Difficulty;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name, chosen difficulty and dark-mode flag, saved between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerProfile {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub dark_mode: bool,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            difficulty: Difficulty::Easy,
            dark_mode: false,
        }
    }
}

impl PlayerProfile {
    pub fn has_name(&self) -> bool {
        !self.player_name.trim().is_empty()
    }
}

pub trait ProfileStore {
    fn load(&self) -> PlayerProfile;
    fn save(&self, profile: &PlayerProfile) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::profile_path().unwrap_or_else(|| PathBuf::from("lingo_profile.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> PlayerProfile {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerProfile::default();
        };
        match serde_json::from_slice::<PlayerProfile>(&bytes) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable profile, using defaults"
                );
                PlayerProfile::default()
            }
        }
    }

    fn save(&self, profile: &PlayerProfile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(profile)
            .map_err(|e| LingoError::Corrupt(format!("profile: {e}")))?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_default_profile() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profile.json"));
        assert_eq!(store.load(), PlayerProfile::default());
        assert!(!store.load().has_name());
    }

    #[test]
    fn save_and_load_custom_profile() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("nested").join("profile.json"));
        let profile = PlayerProfile {
            player_name: "Otto".into(),
            difficulty: Difficulty::Extreme,
            dark_mode: true,
        };
        store.save(&profile).unwrap();
        assert_eq!(store.load(), profile);
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileProfileStore::with_path(&path);
        assert_eq!(store.load(), PlayerProfile::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, br#"{ "player_name": "Kim", "difficulty": "hard" }"#).unwrap();
        let profile = FileProfileStore::with_path(&path).load();
        assert_eq!(profile.player_name, "Kim");
        assert_eq!(profile.difficulty, Difficulty::Hard);
        assert!(!profile.dark_mode);
    }
}
