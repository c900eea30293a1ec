use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "swift-lingo";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Score and badge ledger, under $HOME/.local/state when HOME is set
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("lingo.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("lingo.db"))
        }
    }

    pub fn profile_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("profile.json"))
    }
}
