//! Content-window bookkeeping.
//!
//! The registry is pure state: an ordered list of non-owning references
//! to platform windows plus the active selection. It never talks to the
//! platform itself; the shell controller issues commands and applies the
//! deltas the registry reports, so a failed command can leave the
//! registry untouched.

use serde::{Deserialize, Serialize};

use shiori_common::WindowHandle;

/// A non-owning reference to one platform-managed content window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentWindow {
    pub handle: WindowHandle,
    pub url: String,
    /// Monotonic open order, stable across removals.
    pub created_order: u64,
}

/// Outcome of removing an entry, for the controller to act on.
#[derive(Debug, Clone)]
pub struct Removal {
    pub removed: ContentWindow,
    /// Active index after the removal.
    pub new_active: Option<usize>,
    /// Set when the removed entry was the active one and a previously
    /// hidden window must now be shown explicitly.
    pub needs_show: Option<WindowHandle>,
}

/// Ordered collection of open content windows with an active selection.
///
/// Invariants:
/// - `active` is `None` exactly when `entries` is empty, otherwise a
///   valid index.
/// - `entries` is append-only on creation and keeps its order under
///   removal of other entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowRegistry {
    entries: Vec<ContentWindow>,
    active: Option<usize>,
    next_order: u64,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and make it active. Returns the new index.
    pub fn append(&mut self, handle: WindowHandle, url: impl Into<String>) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.push(ContentWindow {
            handle,
            url: url.into(),
            created_order: order,
        });
        let index = self.entries.len() - 1;
        self.active = Some(index);
        index
    }

    /// Move the active selection. Returns `false` when `index` is out of
    /// range or already active; the caller treats both as a no-op.
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.entries.len() || self.active == Some(index) {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Remove the entry at `index`, reassigning the active selection.
    ///
    /// Policy: removing a non-active entry ordered before the active one
    /// shifts the active index down so it keeps naming the same logical
    /// entry; removing the active entry activates
    /// `min(removed, len - 1)` and reports that entry's handle in
    /// `needs_show` (its window was hidden until now).
    pub fn remove_at(&mut self, index: usize) -> Option<Removal> {
        if index >= self.entries.len() {
            return None;
        }
        let was_active = self.active == Some(index);
        let removed = self.entries.remove(index);

        let needs_show;
        if self.entries.is_empty() {
            self.active = None;
            needs_show = None;
        } else if was_active {
            let new_index = index.min(self.entries.len() - 1);
            self.active = Some(new_index);
            needs_show = Some(self.entries[new_index].handle.clone());
        } else {
            if let Some(active) = self.active {
                if index < active {
                    self.active = Some(active - 1);
                }
            }
            needs_show = None;
        }

        debug_assert!(self.check_invariants().is_ok());
        Some(Removal {
            removed,
            new_active: self.active,
            needs_show,
        })
    }

    /// Index of the entry addressing `handle`, if present.
    pub fn index_of(&self, handle: &WindowHandle) -> Option<usize> {
        self.entries.iter().position(|e| e.handle == *handle)
    }

    /// Update the tracked url for a handle. Returns `false` when absent.
    pub fn set_url(&mut self, handle: &WindowHandle, url: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|e| e.handle == *handle) {
            Some(entry) => {
                entry.url = url.into();
                true
            }
            None => false,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&ContentWindow> {
        self.active.map(|i| &self.entries[i])
    }

    pub fn active_handle(&self) -> Option<&WindowHandle> {
        self.active().map(|e| &e.handle)
    }

    pub fn get(&self, index: usize) -> Option<&ContentWindow> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ContentWindow] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verify the structural invariants. Used by debug assertions and
    /// property tests; a violation here means a registry bug, not bad
    /// caller input.
    pub fn check_invariants(&self) -> Result<(), String> {
        match self.active {
            None if !self.entries.is_empty() => {
                Err("active is None with non-empty entries".to_string())
            }
            Some(_) if self.entries.is_empty() => {
                Err("active is Some with empty entries".to_string())
            }
            Some(i) if i >= self.entries.len() => {
                Err(format!("active index {i} out of range"))
            }
            _ => Ok(()),
        }
    }
}
