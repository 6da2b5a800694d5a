//! Window-mode orchestration and content-window registry.
//!
//! The shell is one chrome surface that reshapes itself between a full
//! home panel, a compact navigation strip, and an expanded launcher.
//! Content windows are owned by the platform and addressed only through
//! opaque handles; this crate keeps the mapping between logical open
//! sites and those handles consistent under concurrent,
//! asynchronously-acknowledged platform commands and unsolicited
//! platform events.
//!
//! - [`geometry`] — pure mode-to-rectangle mapping
//! - [`registry`] — ordered window bookkeeping with the active selection
//! - [`platform`] — the injected platform command surface
//! - [`controller`] — the serialization point driving both
//! - [`ingest`] — pump for unsolicited platform events

pub mod controller;
pub mod geometry;
pub mod ingest;
pub mod platform;
pub mod registry;

pub use controller::{ShellController, ShellSnapshot};
pub use geometry::{compute_geometry, screen_or_default};
pub use ingest::{event_channel, spawn_event_pump};
pub use platform::{NoopBackend, WindowBackend};
pub use registry::{ContentWindow, Removal, WindowRegistry};
