use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::WindowHandle;
use crate::types::ShellMode;

/// Unsolicited notifications from the platform window layer.
///
/// These arrive out-of-band with respect to UI intents: a page may spawn
/// a window on its own, the user may close a content window through its
/// native controls, and navigation inside a content window changes its
/// url without the shell asking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlatformEvent {
    WindowSpawned { handle: WindowHandle, url: String },
    WindowClosed { handle: WindowHandle },
    UrlChanged { handle: WindowHandle, url: String },
}

/// State-change notifications published by the shell controller for
/// observers (the UI layer, tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShellEvent {
    ModeChanged(ShellMode),
    WindowOpened { handle: WindowHandle, url: String },
    WindowClosed { handle: WindowHandle },
    ActiveChanged(Option<usize>),
    UrlChanged { handle: WindowHandle, url: String },
}

pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ShellEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
