//! The shell controller.
//!
//! Owns `ShellState` and is the single serialization point for every
//! mutation: UI intents and unsolicited platform events alike acquire
//! the state lock and hold it across the platform commands they issue,
//! so no operation can observe another's half-committed state and no
//! two active-index updates can interleave. Platform command failures
//! are caught here, logged, and surfaced as failed operations; they
//! never leave the registry violating its invariants.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use shiori_common::{
    EventBus, PlatformCommandError, PlatformEvent, Result, ShellError, ShellEvent, ShellMode,
    Size, WindowHandle,
};
use shiori_config::{classify_and_build_url, Bookmark, BookmarkStore, Settings};

use crate::geometry::{compute_geometry, screen_or_default};
use crate::platform::WindowBackend;
use crate::registry::{ContentWindow, WindowRegistry};

/// A point-in-time copy of the shell state for observers and tests.
#[derive(Debug, Clone)]
pub struct ShellSnapshot {
    pub mode: ShellMode,
    pub windows: Vec<ContentWindow>,
    pub active_index: Option<usize>,
    pub pending_navigation_url: Option<String>,
}

struct ShellState {
    mode: ShellMode,
    registry: WindowRegistry,
    pending_navigation_url: Option<String>,
}

impl ShellState {
    fn new() -> Self {
        Self {
            mode: ShellMode::Home,
            registry: WindowRegistry::new(),
            pending_navigation_url: None,
        }
    }
}

/// Orchestrates mode transitions and the content-window registry over an
/// injected platform backend.
pub struct ShellController {
    state: Mutex<ShellState>,
    backend: Arc<dyn WindowBackend>,
    events: EventBus,
    settings: Settings,
    bookmarks: BookmarkStore,
    screen: Size,
}

impl ShellController {
    /// `screen` is the primary screen size if the platform reported one;
    /// geometry falls back to a fixed default otherwise.
    pub fn new(
        backend: Arc<dyn WindowBackend>,
        settings: Settings,
        bookmarks: BookmarkStore,
        screen: Option<Size>,
    ) -> Self {
        Self {
            state: Mutex::new(ShellState::new()),
            backend,
            events: EventBus::new(64),
            settings,
            bookmarks,
            screen: screen_or_default(screen),
        }
    }

    /// Subscribe to shell state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Starred bookmarks for the launcher, capped at the configured
    /// quick-links limit.
    pub fn quick_links(&self) -> Vec<Bookmark> {
        self.bookmarks
            .starred()
            .into_iter()
            .take(self.settings.quick_links_limit)
            .collect()
    }

    pub async fn snapshot(&self) -> ShellSnapshot {
        let state = self.state.lock().await;
        ShellSnapshot {
            mode: state.mode,
            windows: state.registry.entries().to_vec(),
            active_index: state.registry.active_index(),
            pending_navigation_url: state.pending_navigation_url.clone(),
        }
    }

    pub async fn mode(&self) -> ShellMode {
        self.state.lock().await.mode
    }

    pub async fn window_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    pub async fn active_index(&self) -> Option<usize> {
        self.state.lock().await.registry.active_index()
    }

    // -----------------------------------------------------------------------
    // UI intents
    // -----------------------------------------------------------------------

    /// Navigate from raw address-bar input.
    ///
    /// In `Home` this opens a new content window and brings in the
    /// compact strip. In `Compact`/`Expanded` it retargets the active
    /// window instead. Empty input is a no-op.
    pub async fn navigate(&self, raw_input: &str) -> Result<()> {
        let Some(url) = classify_and_build_url(raw_input, self.settings.search_engine) else {
            return Ok(());
        };
        let mut state = self.state.lock().await;
        match state.mode {
            ShellMode::Home => self.open_site(&mut state, &url).await,
            ShellMode::Compact | ShellMode::Expanded => {
                self.navigate_active(&mut state, &url).await
            }
        }
    }

    /// Open an already fully-qualified url in a new content window.
    pub async fn open_quick_link(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        self.open_site(&mut state, url).await
    }

    /// Make the entry at `index` the visible one. Out-of-range indices
    /// and the current active index are no-ops.
    pub async fn switch_to(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.registry.active_index() == Some(index) {
            return Ok(());
        }
        let Some(target) = state.registry.get(index).map(|e| e.handle.clone()) else {
            debug!(index, "switch target out of range; ignoring");
            return Ok(());
        };

        // Exactly one hide, then one show. If the show fails the active
        // index stays put: nothing is visible, but every entry remains
        // addressable and a later switch can recover.
        if let Some(current) = state.registry.active_handle().cloned() {
            self.backend
                .hide_window(&current)
                .await
                .map_err(Self::surface)?;
        }
        self.backend
            .show_window(&target)
            .await
            .map_err(Self::surface)?;

        state.registry.activate(index);
        state.pending_navigation_url = state.registry.active().map(|e| e.url.clone());
        self.events.publish(ShellEvent::ActiveChanged(Some(index)));
        Ok(())
    }

    /// Expand the launcher overlay over the compact strip.
    pub async fn open_launcher(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.mode != ShellMode::Compact {
            debug!(mode = ?state.mode, "launcher only opens from the compact strip");
            return Ok(());
        }
        self.apply_mode(&mut state, ShellMode::Expanded).await
    }

    /// Collapse the launcher overlay. When `raw_input` is given, a new
    /// content window is created from it first; on creation failure the
    /// launcher stays open and the error is surfaced.
    pub async fn close_launcher(&self, raw_input: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.mode != ShellMode::Expanded {
            return Ok(());
        }
        if let Some(raw) = raw_input {
            if let Some(url) = classify_and_build_url(raw, self.settings.search_engine) {
                self.create_entry(&mut state, &url).await?;
            }
        }
        self.apply_mode(&mut state, ShellMode::Compact).await
    }

    /// Close the active content window. Falls back to `Home` when the
    /// registry empties.
    pub async fn close_active(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(index) = state.registry.active_index() else {
            return Ok(());
        };
        self.remove_entry(&mut state, index, true).await
    }

    /// Close every content window and return the chrome to `Home`.
    pub async fn close_all(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.mode == ShellMode::Home && state.registry.is_empty() {
            return Ok(());
        }

        // Best effort: a window whose close command fails is dropped
        // from the registry anyway; the platform's own closed event for
        // it will reconcile as a no-op.
        let mut first_error: Option<PlatformCommandError> = None;
        while let Some(handle) = state.registry.get(0).map(|e| e.handle.clone()) {
            if let Err(e) = self.backend.close_window(&handle).await {
                warn!(%handle, error = %e, "close command failed during teardown");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            state.registry.remove_at(0);
            self.events.publish(ShellEvent::WindowClosed { handle });
        }
        self.events.publish(ShellEvent::ActiveChanged(None));
        self.apply_mode(&mut state, ShellMode::Home).await?;

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// History back on the active window.
    pub async fn go_back(&self) -> Result<()> {
        let state = self.state.lock().await;
        let Some(handle) = state.registry.active_handle().cloned() else {
            return Ok(());
        };
        self.backend.go_back(&handle).await.map_err(Self::surface)?;
        Ok(())
    }

    /// History forward on the active window.
    pub async fn go_forward(&self) -> Result<()> {
        let state = self.state.lock().await;
        let Some(handle) = state.registry.active_handle().cloned() else {
            return Ok(());
        };
        self.backend
            .go_forward(&handle)
            .await
            .map_err(Self::surface)?;
        Ok(())
    }

    /// Reload the active window.
    pub async fn reload(&self) -> Result<()> {
        let state = self.state.lock().await;
        let Some(handle) = state.registry.active_handle().cloned() else {
            return Ok(());
        };
        self.backend.reload(&handle).await.map_err(Self::surface)?;
        Ok(())
    }

    /// Minimize (or restore) the active window.
    pub async fn minimize_active(&self) -> Result<()> {
        let state = self.state.lock().await;
        let Some(handle) = state.registry.active_handle().cloned() else {
            return Ok(());
        };
        self.backend
            .minimize_window(&handle)
            .await
            .map_err(Self::surface)?;
        Ok(())
    }

    /// Toggle maximization of the active window.
    pub async fn toggle_maximize_active(&self) -> Result<()> {
        let state = self.state.lock().await;
        let Some(handle) = state.registry.active_handle().cloned() else {
            return Ok(());
        };
        self.backend
            .toggle_maximize_window(&handle)
            .await
            .map_err(Self::surface)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Platform events
    // -----------------------------------------------------------------------

    /// Fold an unsolicited platform event into the shell state.
    ///
    /// Never raises: races between UI-driven and platform-driven
    /// removal are expected, so absent handles are ignored.
    pub async fn handle_event(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::WindowSpawned { handle, url } => {
                self.absorb_external(handle, url).await;
            }
            PlatformEvent::WindowClosed { handle } => {
                self.reconcile_closed(handle).await;
            }
            PlatformEvent::UrlChanged { handle, url } => {
                self.apply_url_change(handle, url).await;
            }
        }
    }

    /// A content window was spawned by page content rather than by the
    /// shell. Track it as if we had created it; the single-visible
    /// invariant still requires hiding the previous active entry.
    async fn absorb_external(&self, handle: WindowHandle, url: String) {
        let mut state = self.state.lock().await;
        if state.registry.index_of(&handle).is_some() {
            debug!(%handle, "spawned window already tracked; ignoring");
            return;
        }
        if let Some(prev) = state.registry.active_handle().cloned() {
            if let Err(e) = self.backend.hide_window(&prev).await {
                warn!(%prev, error = %e, "failed to hide previous active window");
            }
        }
        let index = state.registry.append(handle.clone(), url.clone());
        state.pending_navigation_url = Some(url.clone());
        info!(%handle, url = %url, "absorbed externally spawned window");
        self.events.publish(ShellEvent::WindowOpened {
            handle,
            url,
        });
        self.events.publish(ShellEvent::ActiveChanged(Some(index)));

        // A window appearing while the launcher panel is up means a page
        // opened it from a background window; bring the strip in so it
        // is reachable.
        if state.mode == ShellMode::Home {
            if let Err(e) = self.apply_mode(&mut state, ShellMode::Compact).await {
                warn!(error = %e, "failed to enter compact mode after external spawn");
            }
        }
    }

    /// The platform reports a window destroyed out-of-band. Idempotent:
    /// a handle already removed through the UI path is a no-op.
    async fn reconcile_closed(&self, handle: WindowHandle) {
        let mut state = self.state.lock().await;
        let Some(index) = state.registry.index_of(&handle) else {
            debug!(%handle, "closed window not tracked; ignoring");
            return;
        };
        if let Err(e) = self.remove_entry(&mut state, index, false).await {
            warn!(%handle, error = %e, "failed to reconcile closed window");
        }
    }

    async fn apply_url_change(&self, handle: WindowHandle, url: String) {
        let mut state = self.state.lock().await;
        if !state.registry.set_url(&handle, &url) {
            debug!(%handle, "url change for untracked window; ignoring");
            return;
        }
        if state.registry.active_handle() == Some(&handle) {
            state.pending_navigation_url = Some(url.clone());
        }
        self.events.publish(ShellEvent::UrlChanged { handle, url });
    }

    // -----------------------------------------------------------------------
    // Internals (state lock held by caller)
    // -----------------------------------------------------------------------

    /// Create a content window for `url` and enter `Compact`. On
    /// creation failure the mode is untouched.
    async fn open_site(&self, state: &mut ShellState, url: &str) -> Result<()> {
        self.create_entry(state, url).await?;
        self.apply_mode(state, ShellMode::Compact).await
    }

    /// Issue the create command and append the entry on success. The
    /// previous active entry is hidden first so two windows are never
    /// visible together; the registry is untouched when creation fails.
    async fn create_entry(&self, state: &mut ShellState, url: &str) -> Result<WindowHandle> {
        if let Some(prev) = state.registry.active_handle().cloned() {
            self.backend
                .hide_window(&prev)
                .await
                .map_err(Self::surface)?;
        }
        let handle = self
            .backend
            .create_window(url)
            .await
            .map_err(Self::surface)?;

        let index = state.registry.append(handle.clone(), url);
        state.pending_navigation_url = Some(url.to_string());
        info!(%handle, url, "content window opened");
        self.events.publish(ShellEvent::WindowOpened {
            handle: handle.clone(),
            url: url.to_string(),
        });
        self.events.publish(ShellEvent::ActiveChanged(Some(index)));
        Ok(handle)
    }

    /// Retarget the active window. With no active entry (degraded
    /// state), opens a fresh window instead.
    async fn navigate_active(&self, state: &mut ShellState, url: &str) -> Result<()> {
        let Some(handle) = state.registry.active_handle().cloned() else {
            return self.create_entry(state, url).await.map(|_| ());
        };
        self.backend
            .navigate(&handle, url)
            .await
            .map_err(Self::surface)?;
        state.registry.set_url(&handle, url);
        state.pending_navigation_url = Some(url.to_string());
        self.events.publish(ShellEvent::UrlChanged {
            handle,
            url: url.to_string(),
        });
        Ok(())
    }

    /// Remove one entry, optionally issuing the platform close command
    /// (UI-driven removal does; reconciliation of an already-destroyed
    /// window does not). Applies the registry's reassignment policy and
    /// shows the newly active window when the removed one was visible.
    async fn remove_entry(
        &self,
        state: &mut ShellState,
        index: usize,
        issue_close: bool,
    ) -> Result<()> {
        let Some(handle) = state.registry.get(index).map(|e| e.handle.clone()) else {
            return Ok(());
        };
        if issue_close {
            // Command first: if it fails the registry is untouched.
            self.backend
                .close_window(&handle)
                .await
                .map_err(Self::surface)?;
        }
        let Some(removal) = state.registry.remove_at(index) else {
            return Ok(());
        };
        info!(handle = %removal.removed.handle, "content window removed");
        self.events.publish(ShellEvent::WindowClosed {
            handle: removal.removed.handle.clone(),
        });

        if let Some(show) = &removal.needs_show {
            // The successor was hidden until now. A failed show leaves
            // nothing visible but the registry addressable; a later
            // switch recovers.
            if let Err(e) = self.backend.show_window(show).await {
                warn!(handle = %show, error = %e, "failed to show successor window");
            }
        }
        state.pending_navigation_url = state.registry.active().map(|e| e.url.clone());
        self.events.publish(ShellEvent::ActiveChanged(removal.new_active));

        if state.registry.is_empty() {
            self.apply_mode(state, ShellMode::Home).await?;
        }
        Ok(())
    }

    /// Drive the chrome surface to `target` mode. Idempotent: a
    /// transition to the current mode is a no-op. The mode field only
    /// changes after every platform command has succeeded.
    async fn apply_mode(&self, state: &mut ShellState, target: ShellMode) -> Result<()> {
        if state.mode == target {
            return Ok(());
        }
        let rect = compute_geometry(self.screen, target);
        match target {
            ShellMode::Home => {
                self.backend
                    .set_chrome_always_on_top(false)
                    .await
                    .map_err(Self::surface)?;
                self.backend
                    .set_chrome_geometry(rect)
                    .await
                    .map_err(Self::surface)?;
            }
            ShellMode::Compact | ShellMode::Expanded => {
                self.backend
                    .set_chrome_geometry(rect)
                    .await
                    .map_err(Self::surface)?;
                if state.mode == ShellMode::Home {
                    self.backend
                        .set_chrome_always_on_top(true)
                        .await
                        .map_err(Self::surface)?;
                }
            }
        }
        info!(from = ?state.mode, to = ?target, "shell mode changed");
        state.mode = target;
        if target == ShellMode::Home {
            state.pending_navigation_url = None;
        }
        self.events.publish(ShellEvent::ModeChanged(target));
        Ok(())
    }

    fn surface(err: PlatformCommandError) -> ShellError {
        warn!(error = %err, "platform command failed");
        ShellError::Platform(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use shiori_common::Rect;

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Create { handle: String, url: String },
        Show(String),
        Hide(String),
        Close(String),
        Navigate(String, String),
        Back(String),
        Forward(String),
        Reload(String),
        Minimize(String),
        ToggleMaximize(String),
        Geometry(Rect),
        AlwaysOnTop(bool),
    }

    /// Records every command; individual command classes can be
    /// scripted to fail.
    #[derive(Default)]
    struct RecordingBackend {
        log: StdMutex<Vec<Command>>,
        next: AtomicU32,
        fail_create: AtomicBool,
        fail_show: AtomicBool,
        fail_hide: AtomicBool,
        fail_close: AtomicBool,
    }

    impl RecordingBackend {
        fn commands(&self) -> Vec<Command> {
            self.log.lock().unwrap().clone()
        }

        fn record(&self, cmd: Command) {
            self.log.lock().unwrap().push(cmd);
        }

        fn clear(&self) {
            self.log.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl WindowBackend for RecordingBackend {
        async fn create_window(&self, url: &str) -> std::result::Result<WindowHandle, PlatformCommandError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(PlatformCommandError::Create("scripted failure".into()));
            }
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            let handle = WindowHandle::new(format!("content-{n}"));
            self.record(Command::Create {
                handle: handle.as_str().to_string(),
                url: url.to_string(),
            });
            Ok(handle)
        }

        async fn show_window(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            if self.fail_show.load(Ordering::SeqCst) {
                return Err(PlatformCommandError::Show("scripted failure".into()));
            }
            self.record(Command::Show(handle.as_str().to_string()));
            Ok(())
        }

        async fn hide_window(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            if self.fail_hide.load(Ordering::SeqCst) {
                return Err(PlatformCommandError::Hide("scripted failure".into()));
            }
            self.record(Command::Hide(handle.as_str().to_string()));
            Ok(())
        }

        async fn close_window(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            if self.fail_close.load(Ordering::SeqCst) {
                return Err(PlatformCommandError::Close("scripted failure".into()));
            }
            self.record(Command::Close(handle.as_str().to_string()));
            Ok(())
        }

        async fn navigate(
            &self,
            handle: &WindowHandle,
            url: &str,
        ) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Navigate(
                handle.as_str().to_string(),
                url.to_string(),
            ));
            Ok(())
        }

        async fn go_back(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Back(handle.as_str().to_string()));
            Ok(())
        }

        async fn go_forward(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Forward(handle.as_str().to_string()));
            Ok(())
        }

        async fn reload(&self, handle: &WindowHandle) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Reload(handle.as_str().to_string()));
            Ok(())
        }

        async fn minimize_window(
            &self,
            handle: &WindowHandle,
        ) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Minimize(handle.as_str().to_string()));
            Ok(())
        }

        async fn toggle_maximize_window(
            &self,
            handle: &WindowHandle,
        ) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::ToggleMaximize(handle.as_str().to_string()));
            Ok(())
        }

        async fn set_chrome_geometry(&self, rect: Rect) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::Geometry(rect));
            Ok(())
        }

        async fn set_chrome_always_on_top(
            &self,
            on_top: bool,
        ) -> std::result::Result<(), PlatformCommandError> {
            self.record(Command::AlwaysOnTop(on_top));
            Ok(())
        }
    }

    fn controller_with(backend: &Arc<RecordingBackend>) -> ShellController {
        ShellController::new(
            Arc::clone(backend) as Arc<dyn WindowBackend>,
            Settings::default(),
            BookmarkStore::with_defaults(),
            Some(Size::new(1920.0, 1080.0)),
        )
    }

    /// Replay a command log and report the largest number of windows
    /// visible at any single point.
    fn max_simultaneously_visible(commands: &[Command]) -> usize {
        let mut visible: HashSet<String> = HashSet::new();
        let mut max = 0;
        for cmd in commands {
            match cmd {
                Command::Create { handle, .. } | Command::Show(handle) => {
                    visible.insert(handle.clone());
                }
                Command::Hide(handle) | Command::Close(handle) => {
                    visible.remove(handle);
                }
                _ => {}
            }
            max = max.max(visible.len());
        }
        max
    }

    async fn open_three(controller: &ShellController) {
        controller.navigate("a.example.com").await.unwrap();
        controller
            .open_quick_link("https://b.example.com")
            .await
            .unwrap();
        controller
            .open_quick_link("https://c.example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn navigate_from_home_creates_window_and_enters_compact() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.navigate("example.com").await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Compact);
        assert_eq!(snap.windows.len(), 1);
        assert_eq!(snap.windows[0].url, "https://example.com");
        assert_eq!(snap.active_index, Some(0));
        assert_eq!(
            snap.pending_navigation_url.as_deref(),
            Some("https://example.com")
        );

        let commands = backend.commands();
        assert!(matches!(commands[0], Command::Create { ref url, .. } if url == "https://example.com"));
        assert!(matches!(commands[1], Command::Geometry(_)));
        assert_eq!(commands[2], Command::AlwaysOnTop(true));
    }

    #[tokio::test]
    async fn navigate_with_search_query_uses_engine() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.navigate("rust async").await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(
            snap.windows[0].url,
            "https://www.google.com/search?q=rust%20async"
        );
    }

    #[tokio::test]
    async fn empty_input_is_a_noop() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.navigate("   ").await.unwrap();

        assert_eq!(controller.mode().await, ShellMode::Home);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn create_failure_leaves_state_unchanged() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        backend.fail_create.store(true, Ordering::SeqCst);

        let result = controller.navigate("x.com").await;

        assert!(matches!(
            result,
            Err(ShellError::Platform(PlatformCommandError::Create(_)))
        ));
        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Home);
        assert!(snap.windows.is_empty());
        assert_eq!(snap.active_index, None);
    }

    #[tokio::test]
    async fn second_create_hides_previous_active_first() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.navigate("a.example.com").await.unwrap();
        controller
            .open_quick_link("https://b.example.com")
            .await
            .unwrap();

        let commands = backend.commands();
        let hide_pos = commands
            .iter()
            .position(|c| *c == Command::Hide("content-0".into()))
            .expect("previous active must be hidden");
        let create_pos = commands
            .iter()
            .position(|c| matches!(c, Command::Create { url, .. } if url == "https://b.example.com"))
            .unwrap();
        assert!(hide_pos < create_pos, "hide must precede create");
        assert_eq!(max_simultaneously_visible(&commands), 1);
    }

    #[tokio::test]
    async fn failed_hide_aborts_create() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        controller.open_launcher().await.unwrap();
        backend.fail_hide.store(true, Ordering::SeqCst);

        let result = controller.close_launcher(Some("b.example.com")).await;

        assert!(matches!(
            result,
            Err(ShellError::Platform(PlatformCommandError::Hide(_)))
        ));
        // No create command was issued and no entry was added.
        assert_eq!(controller.window_count().await, 1);
        assert!(!backend
            .commands()
            .iter()
            .any(|c| matches!(c, Command::Create { url, .. } if url == "https://b.example.com")));
    }

    #[tokio::test]
    async fn navigate_in_compact_retargets_active_window() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.navigate("a.example.com").await.unwrap();
        controller.navigate("b.example.com").await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.windows.len(), 1, "no second window is created");
        assert_eq!(snap.windows[0].url, "https://b.example.com");
        assert!(backend
            .commands()
            .contains(&Command::Navigate("content-0".into(), "https://b.example.com".into())));
    }

    #[tokio::test]
    async fn switch_issues_exactly_one_hide_then_one_show() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;
        backend.clear();

        controller.switch_to(0).await.unwrap();

        let commands = backend.commands();
        assert_eq!(
            commands,
            vec![
                Command::Hide("content-2".into()),
                Command::Show("content-0".into()),
            ]
        );
        assert_eq!(controller.active_index().await, Some(0));
    }

    #[tokio::test]
    async fn switch_to_current_or_out_of_range_is_noop() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        controller
            .open_quick_link("https://b.example.com")
            .await
            .unwrap();
        backend.clear();

        controller.switch_to(1).await.unwrap();
        controller.switch_to(5).await.unwrap();

        assert!(backend.commands().is_empty());
        assert_eq!(controller.active_index().await, Some(1));
    }

    #[tokio::test]
    async fn failed_show_does_not_advance_active_index() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;
        backend.fail_show.store(true, Ordering::SeqCst);

        let result = controller.switch_to(0).await;

        assert!(matches!(
            result,
            Err(ShellError::Platform(PlatformCommandError::Show(_)))
        ));
        // Degraded but not corrupt: the index still names entry 2.
        assert_eq!(controller.active_index().await, Some(2));
        assert_eq!(controller.window_count().await, 3);
    }

    #[tokio::test]
    async fn remove_non_active_before_active_shifts_index() {
        // entries = [A,B,C], active = 2; platform closes B.
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;
        backend.clear();

        controller
            .handle_event(PlatformEvent::WindowClosed {
                handle: WindowHandle::new("content-1"),
            })
            .await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.windows.len(), 2);
        assert_eq!(snap.active_index, Some(1));
        assert_eq!(snap.windows[1].handle.as_str(), "content-2");
        // B was hidden; nothing needs showing.
        assert!(!backend
            .commands()
            .iter()
            .any(|c| matches!(c, Command::Show(_))));
    }

    #[tokio::test]
    async fn remove_active_shows_successor() {
        // entries = [A,B,C], active = 1 (B); platform closes B.
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;
        controller.switch_to(1).await.unwrap();
        backend.clear();

        controller
            .handle_event(PlatformEvent::WindowClosed {
                handle: WindowHandle::new("content-1"),
            })
            .await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.active_index, Some(1));
        assert_eq!(snap.windows[1].handle.as_str(), "content-2");
        assert!(backend
            .commands()
            .contains(&Command::Show("content-2".into())));
    }

    #[tokio::test]
    async fn reconcile_closed_is_idempotent() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;

        let event = PlatformEvent::WindowClosed {
            handle: WindowHandle::new("content-1"),
        };
        controller.handle_event(event.clone()).await;
        let snap_once = controller.snapshot().await;
        controller.handle_event(event).await;
        let snap_twice = controller.snapshot().await;

        assert_eq!(snap_once.windows.len(), snap_twice.windows.len());
        assert_eq!(snap_once.active_index, snap_twice.active_index);
    }

    #[tokio::test]
    async fn registry_emptying_drives_mode_home() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        assert_eq!(controller.mode().await, ShellMode::Compact);

        controller
            .handle_event(PlatformEvent::WindowClosed {
                handle: WindowHandle::new("content-0"),
            })
            .await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Home);
        assert_eq!(snap.active_index, None);
        assert_eq!(snap.pending_navigation_url, None);
        assert!(backend.commands().contains(&Command::AlwaysOnTop(false)));
    }

    #[tokio::test]
    async fn external_spawn_appends_and_hides_previous() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        controller
            .open_quick_link("https://b.example.com")
            .await
            .unwrap();
        backend.clear();

        controller
            .handle_event(PlatformEvent::WindowSpawned {
                handle: WindowHandle::new("content-popup"),
                url: "https://popup.example".into(),
            })
            .await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.windows.len(), 3);
        assert_eq!(snap.active_index, Some(2));
        assert_eq!(snap.windows[2].url, "https://popup.example");
        assert_eq!(
            backend.commands(),
            vec![Command::Hide("content-1".into())]
        );
    }

    #[tokio::test]
    async fn duplicate_spawn_event_is_ignored() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        let event = PlatformEvent::WindowSpawned {
            handle: WindowHandle::new("content-popup"),
            url: "https://popup.example".into(),
        };
        controller.handle_event(event.clone()).await;
        controller.handle_event(event).await;

        assert_eq!(controller.window_count().await, 1);
    }

    #[tokio::test]
    async fn spawn_while_home_brings_in_the_strip() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller
            .handle_event(PlatformEvent::WindowSpawned {
                handle: WindowHandle::new("content-popup"),
                url: "https://popup.example".into(),
            })
            .await;

        assert_eq!(controller.mode().await, ShellMode::Compact);
    }

    #[tokio::test]
    async fn launcher_round_trip() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();

        controller.open_launcher().await.unwrap();
        assert_eq!(controller.mode().await, ShellMode::Expanded);

        // Re-entry is a no-op.
        backend.clear();
        controller.open_launcher().await.unwrap();
        assert!(backend.commands().is_empty());

        controller.close_launcher(None).await.unwrap();
        assert_eq!(controller.mode().await, ShellMode::Compact);
    }

    #[tokio::test]
    async fn launcher_does_not_open_from_home() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.open_launcher().await.unwrap();

        assert_eq!(controller.mode().await, ShellMode::Home);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn close_launcher_with_input_creates_window() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        controller.open_launcher().await.unwrap();

        controller
            .close_launcher(Some("b.example.com"))
            .await
            .unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Compact);
        assert_eq!(snap.windows.len(), 2);
        assert_eq!(snap.active_index, Some(1));
    }

    #[tokio::test]
    async fn close_launcher_create_failure_stays_expanded() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        controller.open_launcher().await.unwrap();
        backend.fail_create.store(true, Ordering::SeqCst);

        let result = controller.close_launcher(Some("b.example.com")).await;

        assert!(result.is_err());
        assert_eq!(controller.mode().await, ShellMode::Expanded);
        assert_eq!(controller.window_count().await, 1);
    }

    #[tokio::test]
    async fn close_active_falls_back_to_home_when_last() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();

        controller.close_active().await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Home);
        assert!(snap.windows.is_empty());
        assert!(backend
            .commands()
            .contains(&Command::Close("content-0".into())));
    }

    #[tokio::test]
    async fn close_active_failure_keeps_entry() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        backend.fail_close.store(true, Ordering::SeqCst);

        let result = controller.close_active().await;

        assert!(result.is_err());
        assert_eq!(controller.window_count().await, 1);
        assert_eq!(controller.mode().await, ShellMode::Compact);
    }

    #[tokio::test]
    async fn close_all_clears_registry_and_returns_home() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        open_three(&controller).await;

        controller.close_all().await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.mode, ShellMode::Home);
        assert!(snap.windows.is_empty());
        assert_eq!(snap.pending_navigation_url, None);

        let close_count = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Close(_)))
            .count();
        assert_eq!(close_count, 3);
        assert!(backend.commands().contains(&Command::AlwaysOnTop(false)));
    }

    #[tokio::test]
    async fn close_all_in_home_is_noop() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.close_all().await.unwrap();

        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn navigation_surface_targets_active_window() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();
        backend.clear();

        controller.go_back().await.unwrap();
        controller.go_forward().await.unwrap();
        controller.reload().await.unwrap();
        controller.minimize_active().await.unwrap();
        controller.toggle_maximize_active().await.unwrap();

        assert_eq!(
            backend.commands(),
            vec![
                Command::Back("content-0".into()),
                Command::Forward("content-0".into()),
                Command::Reload("content-0".into()),
                Command::Minimize("content-0".into()),
                Command::ToggleMaximize("content-0".into()),
            ]
        );
    }

    #[tokio::test]
    async fn navigation_surface_without_active_is_noop() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller.go_back().await.unwrap();
        controller.reload().await.unwrap();

        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn url_change_updates_entry_and_pending() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        controller.navigate("a.example.com").await.unwrap();

        controller
            .handle_event(PlatformEvent::UrlChanged {
                handle: WindowHandle::new("content-0"),
                url: "https://a.example.com/deep/link".into(),
            })
            .await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.windows[0].url, "https://a.example.com/deep/link");
        assert_eq!(
            snap.pending_navigation_url.as_deref(),
            Some("https://a.example.com/deep/link")
        );
    }

    #[tokio::test]
    async fn url_change_for_unknown_handle_is_ignored() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        controller
            .handle_event(PlatformEvent::UrlChanged {
                handle: WindowHandle::new("content-zzz"),
                url: "https://x.example".into(),
            })
            .await;

        assert_eq!(controller.window_count().await, 0);
    }

    #[tokio::test]
    async fn no_sequence_shows_two_windows_at_once() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);

        open_three(&controller).await;
        controller.switch_to(0).await.unwrap();
        controller
            .handle_event(PlatformEvent::WindowSpawned {
                handle: WindowHandle::new("content-popup"),
                url: "https://popup.example".into(),
            })
            .await;
        controller.switch_to(1).await.unwrap();
        // Native close of a currently hidden window.
        controller
            .handle_event(PlatformEvent::WindowClosed {
                handle: WindowHandle::new("content-2"),
            })
            .await;
        controller.close_all().await.unwrap();

        assert_eq!(max_simultaneously_visible(&backend.commands()), 1);
    }

    #[tokio::test]
    async fn shell_events_are_published() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = controller_with(&backend);
        let mut rx = controller.subscribe();

        controller.navigate("a.example.com").await.unwrap();

        let e1 = rx.recv().await.unwrap();
        assert!(matches!(e1, ShellEvent::WindowOpened { ref url, .. } if url == "https://a.example.com"));
        let e2 = rx.recv().await.unwrap();
        assert!(matches!(e2, ShellEvent::ActiveChanged(Some(0))));
        let e3 = rx.recv().await.unwrap();
        assert!(matches!(e3, ShellEvent::ModeChanged(ShellMode::Compact)));
    }

    #[tokio::test]
    async fn quick_links_respect_limit() {
        let backend = Arc::new(RecordingBackend::default());
        let mut bookmarks = BookmarkStore::default();
        for i in 0..10 {
            bookmarks.add(&format!("Site {i}"), &format!("site{i}.example"), true);
        }
        let settings = Settings {
            quick_links_limit: 4,
            ..Default::default()
        };
        let controller = ShellController::new(
            Arc::clone(&backend) as Arc<dyn WindowBackend>,
            settings,
            bookmarks,
            None,
        );

        assert_eq!(controller.quick_links().len(), 4);
        assert_eq!(controller.quick_links()[0].name, "Site 0");
    }
}
