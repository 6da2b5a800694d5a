//! Settings schema with serde defaults.

use serde::{Deserialize, Serialize};

/// Quick-links limit bounds. Values outside are clamped on load.
pub const QUICK_LINKS_MIN: usize = 3;
pub const QUICK_LINKS_MAX: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    DuckDuckGo,
    Bing,
    Yahoo,
    Brave,
}

impl SearchEngine {
    /// Human-readable name for display.
    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::Google => "Google",
            SearchEngine::DuckDuckGo => "DuckDuckGo",
            SearchEngine::Bing => "Bing",
            SearchEngine::Yahoo => "Yahoo",
            SearchEngine::Brave => "Brave",
        }
    }

    fn query_prefix(&self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com/search?q=",
            SearchEngine::DuckDuckGo => "https://duckduckgo.com/?q=",
            SearchEngine::Bing => "https://www.bing.com/search?q=",
            SearchEngine::Yahoo => "https://search.yahoo.com/search?p=",
            SearchEngine::Brave => "https://search.brave.com/search?q=",
        }
    }

    /// Build a fully-qualified search url for a query string.
    pub fn query_url(&self, query: &str) -> String {
        format!("{}{}", self.query_prefix(), urlencoding::encode(query))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub search_engine: SearchEngine,
    pub quick_links_limit: usize,
    pub animations_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            search_engine: SearchEngine::Google,
            quick_links_limit: 6,
            animations_enabled: true,
        }
    }
}

impl Settings {
    /// Clamp out-of-range values in place. Called after every load so a
    /// hand-edited file cannot push the launcher outside its layout.
    pub fn clamp(&mut self) {
        self.quick_links_limit = self
            .quick_links_limit
            .clamp(QUICK_LINKS_MIN, QUICK_LINKS_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let s = Settings::default();
        assert_eq!(s.theme, Theme::Light);
        assert_eq!(s.search_engine, SearchEngine::Google);
        assert_eq!(s.quick_links_limit, 6);
        assert!(s.animations_enabled);
    }

    #[test]
    fn clamp_bounds_quick_links() {
        let mut s = Settings {
            quick_links_limit: 99,
            ..Default::default()
        };
        s.clamp();
        assert_eq!(s.quick_links_limit, QUICK_LINKS_MAX);

        s.quick_links_limit = 0;
        s.clamp();
        assert_eq!(s.quick_links_limit, QUICK_LINKS_MIN);

        s.quick_links_limit = 4;
        s.clamp();
        assert_eq!(s.quick_links_limit, 4);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.search_engine, SearchEngine::Google);
        assert_eq!(s.quick_links_limit, 6);
    }

    #[test]
    fn unknown_fields_ignored() {
        let s: Settings =
            serde_json::from_str(r#"{"searchEngine":"brave","futureFlag":true}"#).unwrap();
        assert_eq!(s.search_engine, SearchEngine::Brave);
    }

    #[test]
    fn query_url_encodes() {
        let url = SearchEngine::Google.query_url("rust async traits");
        assert_eq!(
            url,
            "https://www.google.com/search?q=rust%20async%20traits"
        );

        let url = SearchEngine::DuckDuckGo.query_url("a&b");
        assert_eq!(url, "https://duckduckgo.com/?q=a%26b");
    }

    #[test]
    fn engine_names() {
        assert_eq!(SearchEngine::Yahoo.name(), "Yahoo");
        assert_eq!(SearchEngine::Brave.name(), "Brave");
    }

    #[test]
    fn settings_roundtrip() {
        let s = Settings {
            theme: Theme::Dark,
            search_engine: SearchEngine::Bing,
            quick_links_limit: 5,
            animations_enabled: false,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.theme, Theme::Dark);
        assert_eq!(back.search_engine, SearchEngine::Bing);
        assert_eq!(back.quick_links_limit, 5);
        assert!(!back.animations_enabled);
    }
}
