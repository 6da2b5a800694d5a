use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate a fresh uuid-v4 string.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Opaque identifier for a platform-owned content window.
///
/// The shell never parses or interprets the inner string; it only passes
/// handles back to the platform command surface. Backends are free to
/// encode whatever labeling scheme they use (`content-<uuid>` in the wry
/// backend).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// A fresh handle with the conventional `content-` label prefix.
    pub fn generate() -> Self {
        Self(format!("content-{}", new_id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
