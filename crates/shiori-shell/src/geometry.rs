//! Chrome-surface geometry.
//!
//! Pure mapping from (screen size, shell mode) to an absolute rectangle.
//! All sizes are proportions of the primary screen so the shell behaves
//! the same across resolutions. Rounding is half-up on every emitted
//! coordinate, so identical inputs always produce identical geometry
//! requests.

use shiori_common::{Rect, ShellMode, Size};

/// Home panel, centered.
pub const HOME_WIDTH_PERCENT: f64 = 0.47;
pub const HOME_HEIGHT_PERCENT: f64 = 0.56;

/// Compact strip, horizontally centered near the top edge.
pub const COMPACT_WIDTH_PERCENT: f64 = 0.36;
pub const COMPACT_HEIGHT_PERCENT: f64 = 0.05;
pub const COMPACT_TOP_PERCENT: f64 = 0.01;

/// Expanded launcher: the compact strip grown downward.
pub const EXPANDED_HEIGHT_PERCENT: f64 = 0.42;

/// Screen size assumed when the platform cannot report one.
pub const FALLBACK_SCREEN_WIDTH: f64 = 1920.0;
pub const FALLBACK_SCREEN_HEIGHT: f64 = 1080.0;

/// Resolve a possibly-unknown screen size to a usable one.
pub fn screen_or_default(screen: Option<Size>) -> Size {
    screen.unwrap_or(Size {
        width: FALLBACK_SCREEN_WIDTH,
        height: FALLBACK_SCREEN_HEIGHT,
    })
}

/// Round half-up. `f64::round` ties away from zero, which coincides for
/// the non-negative values produced here, but the intent is pinned down
/// in one place.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Compute the chrome rectangle for a mode on the given screen.
///
/// Total over all inputs; never fails.
pub fn compute_geometry(screen: Size, mode: ShellMode) -> Rect {
    match mode {
        ShellMode::Home => {
            let width = round_half_up(screen.width * HOME_WIDTH_PERCENT);
            let height = round_half_up(screen.height * HOME_HEIGHT_PERCENT);
            Rect {
                x: round_half_up((screen.width - width) / 2.0),
                y: round_half_up((screen.height - height) / 2.0),
                width,
                height,
            }
        }
        ShellMode::Compact => {
            let width = round_half_up(screen.width * COMPACT_WIDTH_PERCENT);
            let height = round_half_up(screen.height * COMPACT_HEIGHT_PERCENT);
            Rect {
                x: round_half_up((screen.width - width) / 2.0),
                y: round_half_up(screen.height * COMPACT_TOP_PERCENT),
                width,
                height,
            }
        }
        ShellMode::Expanded => {
            // Same strip as Compact, taller.
            let compact = compute_geometry(screen, ShellMode::Compact);
            Rect {
                height: round_half_up(screen.height * EXPANDED_HEIGHT_PERCENT),
                ..compact
            }
        }
    }
}
