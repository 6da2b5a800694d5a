//! Settings and bookmarks collaborators for the Shiori shell.
//!
//! Both are small JSON files in the platform config directory. Missing
//! files are created with defaults, unknown fields are ignored, and
//! missing fields fall back to defaults, so partial files from older
//! versions keep working.
//!
//! The shell core reads two things from here: the starred-bookmark list
//! for the launcher, and [`classify_and_build_url`] for turning raw
//! address-bar input into a navigable url.

pub mod bookmarks;
pub mod input;
pub mod schema;
pub mod store;

pub use bookmarks::{Bookmark, BookmarkStore};
pub use input::classify_and_build_url;
pub use schema::{SearchEngine, Settings, Theme};

use shiori_common::ConfigError;

/// Load settings from the platform default path, creating the file with
/// defaults if it does not exist.
pub fn load_settings() -> Result<Settings, ConfigError> {
    store::load_default()
}

/// Load bookmarks from the platform default path, seeding the default
/// set on first run.
pub fn load_bookmarks() -> Result<BookmarkStore, ConfigError> {
    bookmarks::load_default()
}
