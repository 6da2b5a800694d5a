use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Screen dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The shape the chrome surface is currently in.
///
/// `Home` is the full launcher panel with no content window visible.
/// `Compact` is the minimal navigation strip with one content window
/// visible behind it. `Expanded` is `Compact` plus the launcher overlay
/// for opening additional windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellMode {
    Home,
    Compact,
    Expanded,
}
