//! Bookmark storage.
//!
//! Bookmarks are an ordered list persisted as JSON. Starred bookmarks
//! form the launcher's quick-link row; the shell core only ever reads
//! that subset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shiori_common::{new_id, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub starred: bool,
}

/// Prefix schemeless urls with `https://`.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Derive a display name from a url's host when the user leaves the name
/// blank: `https://www.example.com/x` becomes `Example`.
fn derive_name(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = stripped.split('/').next().unwrap_or(stripped);
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or(host);

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Bookmark".to_string(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkStore {
    entries: Vec<Bookmark>,
}

impl BookmarkStore {
    /// The first-run seed: four starred quick links plus a few extras.
    pub fn with_defaults() -> Self {
        let seed = [
            ("Google", "https://google.com", true),
            ("YouTube", "https://youtube.com", true),
            ("GitHub", "https://github.com", true),
            ("Twitter", "https://twitter.com", true),
            ("Reddit", "https://reddit.com", false),
            ("Stack Overflow", "https://stackoverflow.com", false),
            ("Medium", "https://medium.com", false),
            ("LinkedIn", "https://linkedin.com", false),
        ];
        Self {
            entries: seed
                .iter()
                .map(|(name, url, starred)| Bookmark {
                    id: new_id(),
                    name: (*name).to_string(),
                    url: (*url).to_string(),
                    starred: *starred,
                })
                .collect(),
        }
    }

    /// Append a bookmark. An empty name is derived from the url host.
    /// Returns the new bookmark's id.
    pub fn add(&mut self, name: &str, url: &str, starred: bool) -> String {
        let url = normalize_url(url);
        let name = if name.trim().is_empty() {
            derive_name(&url)
        } else {
            name.to_string()
        };
        let id = new_id();
        self.entries.push(Bookmark {
            id: id.clone(),
            name,
            url,
            starred,
        });
        id
    }

    /// Update name and url of an existing bookmark. Unknown ids are ignored.
    pub fn edit(&mut self, id: &str, name: &str, url: &str) {
        if let Some(bookmark) = self.entries.iter_mut().find(|b| b.id == id) {
            bookmark.name = name.to_string();
            bookmark.url = normalize_url(url);
        }
    }

    pub fn delete(&mut self, id: &str) {
        self.entries.retain(|b| b.id != id);
    }

    pub fn toggle_star(&mut self, id: &str) {
        if let Some(bookmark) = self.entries.iter_mut().find(|b| b.id == id) {
            bookmark.starred = !bookmark.starred;
        }
    }

    pub fn all(&self) -> &[Bookmark] {
        &self.entries
    }

    /// Starred bookmarks in insertion order, for the launcher.
    pub fn starred(&self) -> Vec<Bookmark> {
        self.entries.iter().filter(|b| b.starred).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load bookmarks from a specific JSON file path.
pub fn load_from_path(path: &Path) -> Result<BookmarkStore, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let store: BookmarkStore = serde_json::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse JSON: {e}")))?;

    info!("loaded {} bookmarks from {}", store.len(), path.display());
    Ok(store)
}

/// Load bookmarks from the platform default path, seeding defaults on
/// first run. A corrupt file falls back to the default seed.
pub fn load_default() -> Result<BookmarkStore, ConfigError> {
    let path = default_bookmarks_path()?;

    if !path.exists() {
        info!("no bookmarks found at {}, seeding defaults", path.display());
        let store = BookmarkStore::with_defaults();
        save_to_path(&path, &store)?;
        return Ok(store);
    }

    match load_from_path(&path) {
        Ok(store) => Ok(store),
        Err(e) => {
            warn!("bookmark load failed, using defaults: {e}");
            Ok(BookmarkStore::with_defaults())
        }
    }
}

/// The platform-specific default bookmarks file path.
pub fn default_bookmarks_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("shiori").join("bookmarks.json"))
}

/// Persist bookmarks to a specific path, creating parent directories.
pub fn save_to_path(path: &Path, store: &BookmarkStore) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::WriteError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let content = serde_json::to_string_pretty(store)
        .map_err(|e| ConfigError::WriteError(format!("failed to serialize bookmarks: {e}")))?;

    std::fs::write(path, content).map_err(|e| {
        ConfigError::WriteError(format!("failed to write {}: {e}", path.display()))
    })?;

    Ok(())
}
