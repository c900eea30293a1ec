// Library surface for the quiz core, its stores, and headless tests.
// The `lingo` binary in main.rs is a thin line-based front end over it.
pub mod achievements;
pub mod app_dirs;
pub mod engine;
pub mod error;
pub mod game;
pub mod ledger;
pub mod profile;
pub mod runtime;
pub mod session;
pub mod util;
pub mod words;

pub use error::{LingoError, Result};
