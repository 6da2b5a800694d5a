//! Platform event ingestion.
//!
//! Unsolicited platform notifications arrive on an mpsc channel and are
//! pushed through the controller one at a time, so they serialize
//! against UI-driven operations instead of mutating the registry from a
//! callback that may hold a stale view of the active window.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use shiori_common::PlatformEvent;

use crate::controller::ShellController;

/// Create the channel a platform backend feeds its events into.
pub fn event_channel() -> (
    mpsc::UnboundedSender<PlatformEvent>,
    mpsc::UnboundedReceiver<PlatformEvent>,
) {
    mpsc::unbounded_channel()
}

/// Spawn the pump task that forwards platform events to the controller.
///
/// The task runs until the sender side is dropped. Event handlers never
/// raise, so the pump has no failure mode of its own.
pub fn spawn_event_pump(
    controller: Arc<ShellController>,
    mut rx: mpsc::UnboundedReceiver<PlatformEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            debug!(?event, "platform event received");
            controller.handle_event(event).await;
        }
        debug!("platform event channel closed; ingestion pump exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use shiori_common::{ShellMode, WindowHandle};
    use shiori_config::{BookmarkStore, Settings};

    use crate::platform::{NoopBackend, WindowBackend};

    fn controller() -> Arc<ShellController> {
        Arc::new(ShellController::new(
            Arc::new(NoopBackend::new()) as Arc<dyn WindowBackend>,
            Settings::default(),
            BookmarkStore::default(),
            None,
        ))
    }

    #[tokio::test]
    async fn pump_feeds_events_to_controller() {
        let controller = controller();
        let (tx, rx) = event_channel();
        let pump = spawn_event_pump(Arc::clone(&controller), rx);

        tx.send(PlatformEvent::WindowSpawned {
            handle: WindowHandle::new("content-x"),
            url: "https://x.example".into(),
        })
        .unwrap();
        drop(tx);
        pump.await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.windows.len(), 1);
        assert_eq!(snap.mode, ShellMode::Compact);
    }

    #[tokio::test]
    async fn pump_preserves_event_order() {
        let controller = controller();
        let (tx, rx) = event_channel();
        let pump = spawn_event_pump(Arc::clone(&controller), rx);

        let handle = WindowHandle::new("content-x");
        tx.send(PlatformEvent::WindowSpawned {
            handle: handle.clone(),
            url: "https://x.example".into(),
        })
        .unwrap();
        tx.send(PlatformEvent::WindowClosed { handle }).unwrap();
        drop(tx);
        pump.await.unwrap();

        let snap = controller.snapshot().await;
        assert!(snap.windows.is_empty());
        assert_eq!(snap.mode, ShellMode::Home);
    }
}
