//! The winit side of the platform backend.
//!
//! Owns the chrome surface and every content window. Requests from the
//! shell controller arrive over the backend channel; unsolicited window
//! activity (page popups, native closes, navigations) flows back as
//! `PlatformEvent`s.

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};

use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};
use wry::{WebView, WebViewBuilder};

use shiori_common::{PlatformCommandError, PlatformEvent, ShellMode, Size, WindowHandle};
use shiori_shell::{compute_geometry, screen_or_default};

use crate::backend::{BackendRequest, WakeUp};

/// Content windows as a share of the primary screen, centered.
pub const CONTENT_WIDTH_PERCENT: f64 = 0.73;
pub const CONTENT_HEIGHT_PERCENT: f64 = 0.74;

/// Content window size used when no monitor is reported.
pub const FALLBACK_CONTENT_WIDTH: f64 = 1400.0;
pub const FALLBACK_CONTENT_HEIGHT: f64 = 800.0;

struct ContentView {
    window: Window,
    webview: WebView,
}

/// Top-level winit application state.
pub struct ShellApp {
    requests: mpsc::Receiver<BackendRequest>,
    platform_events: tokio::sync::mpsc::UnboundedSender<PlatformEvent>,
    proxy: EventLoopProxy<WakeUp>,
    /// Reports the primary screen size to the controller thread once.
    screen_tx: Option<tokio::sync::oneshot::Sender<Option<Size>>>,

    chrome: Option<Window>,
    content: HashMap<WindowHandle, ContentView>,
    ids: HashMap<WindowId, WindowHandle>,

    /// Urls of popups requested by page content, waiting for the event
    /// loop to create real windows for them.
    pending_spawns: Arc<Mutex<Vec<String>>>,
}

impl ShellApp {
    pub fn new(
        requests: mpsc::Receiver<BackendRequest>,
        platform_events: tokio::sync::mpsc::UnboundedSender<PlatformEvent>,
        proxy: EventLoopProxy<WakeUp>,
        screen_tx: tokio::sync::oneshot::Sender<Option<Size>>,
    ) -> Self {
        Self {
            requests,
            platform_events,
            proxy,
            screen_tx: Some(screen_tx),
            chrome: None,
            content: HashMap::new(),
            ids: HashMap::new(),
            pending_spawns: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn screen_size(&self, event_loop: &ActiveEventLoop) -> Option<Size> {
        event_loop.primary_monitor().map(|monitor| {
            let size = monitor.size();
            Size::new(size.width as f64, size.height as f64)
        })
    }

    /// Create a content window with its webview and start tracking it.
    fn create_content_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        url: &str,
    ) -> Result<WindowHandle, PlatformCommandError> {
        let (width, height, position) = match event_loop.primary_monitor() {
            Some(monitor) => {
                let screen = monitor.size();
                let width = (screen.width as f64 * CONTENT_WIDTH_PERCENT).round();
                let height = (screen.height as f64 * CONTENT_HEIGHT_PERCENT).round();
                let x = ((screen.width as f64 - width) / 2.0).round();
                let y = ((screen.height as f64 - height) / 2.0).round();
                (width, height, Some(PhysicalPosition::new(x, y)))
            }
            None => (FALLBACK_CONTENT_WIDTH, FALLBACK_CONTENT_HEIGHT, None),
        };

        let mut attrs = WindowAttributes::default()
            .with_title("Shiori")
            .with_inner_size(PhysicalSize::new(width, height));
        if let Some(position) = position {
            attrs = attrs.with_position(position);
        }
        let window = event_loop
            .create_window(attrs)
            .map_err(|e| PlatformCommandError::Create(e.to_string()))?;

        let handle = WindowHandle::generate();

        let nav_events = self.platform_events.clone();
        let nav_handle = handle.clone();
        let spawns = Arc::clone(&self.pending_spawns);
        let spawn_proxy = self.proxy.clone();

        let webview = WebViewBuilder::new()
            .with_url(url)
            .with_navigation_handler(move |url| {
                let _ = nav_events.send(PlatformEvent::UrlChanged {
                    handle: nav_handle.clone(),
                    url,
                });
                true
            })
            .with_new_window_req_handler(move |url| {
                // Deny the native popup; the queued url becomes a
                // first-class content window on the next loop turn.
                if let Ok(mut pending) = spawns.lock() {
                    pending.push(url);
                }
                let _ = spawn_proxy.send_event(WakeUp);
                false
            })
            .build(&window)
            .map_err(|e| PlatformCommandError::Create(e.to_string()))?;

        info!(%handle, url, "content window created");
        self.ids.insert(window.id(), handle.clone());
        self.content
            .insert(handle.clone(), ContentView { window, webview });
        Ok(handle)
    }

    /// Create windows for popups queued by page content and report them
    /// as spawned.
    fn drain_pending_spawns(&mut self, event_loop: &ActiveEventLoop) {
        loop {
            let url = match self.pending_spawns.lock() {
                Ok(mut pending) => {
                    if pending.is_empty() {
                        None
                    } else {
                        Some(pending.remove(0))
                    }
                }
                Err(_) => None,
            };
            let Some(url) = url else { break };

            match self.create_content_window(event_loop, &url) {
                Ok(handle) => {
                    let _ = self
                        .platform_events
                        .send(PlatformEvent::WindowSpawned { handle, url });
                }
                Err(e) => warn!(error = %e, url = %url, "failed to create window for page popup"),
            }
        }
    }

    /// Process queued backend requests. Held back until the chrome
    /// surface exists so geometry commands have a target.
    fn drain_requests(&mut self, event_loop: &ActiveEventLoop) {
        if self.chrome.is_none() {
            return;
        }
        while let Ok(request) = self.requests.try_recv() {
            self.process_request(event_loop, request);
        }
    }

    fn process_request(&mut self, event_loop: &ActiveEventLoop, request: BackendRequest) {
        match request {
            BackendRequest::CreateWindow { url, reply } => {
                let result = self.create_content_window(event_loop, &url);
                let _ = reply.send(result);
            }
            BackendRequest::Show { handle, reply } => {
                if let Some(view) = self.content.get(&handle) {
                    view.window.set_visible(true);
                    view.window.focus_window();
                } else {
                    debug!(%handle, "show for unknown window; ignoring");
                }
                let _ = reply.send(Ok(()));
            }
            BackendRequest::Hide { handle, reply } => {
                if let Some(view) = self.content.get(&handle) {
                    view.window.set_visible(false);
                } else {
                    debug!(%handle, "hide for unknown window; ignoring");
                }
                let _ = reply.send(Ok(()));
            }
            BackendRequest::Close { handle, reply } => {
                if let Some(view) = self.content.remove(&handle) {
                    self.ids.remove(&view.window.id());
                    // Dropping the window and webview closes them.
                    drop(view);
                    info!(%handle, "content window closed");
                } else {
                    debug!(%handle, "close for unknown window; ignoring");
                }
                let _ = reply.send(Ok(()));
            }
            BackendRequest::Navigate { handle, url, reply } => {
                let result = match self.content.get(&handle) {
                    Some(view) => view
                        .webview
                        .load_url(&url)
                        .map_err(|e| PlatformCommandError::Navigate(e.to_string())),
                    None => {
                        debug!(%handle, "navigate for unknown window; ignoring");
                        Ok(())
                    }
                };
                let _ = reply.send(result);
            }
            BackendRequest::Back { handle, reply } => {
                let _ = reply.send(self.eval(&handle, "window.history.back()"));
            }
            BackendRequest::Forward { handle, reply } => {
                let _ = reply.send(self.eval(&handle, "window.history.forward()"));
            }
            BackendRequest::Reload { handle, reply } => {
                let _ = reply.send(self.eval(&handle, "window.location.reload()"));
            }
            BackendRequest::Minimize { handle, reply } => {
                if let Some(view) = self.content.get(&handle) {
                    let minimized = view.window.is_minimized().unwrap_or(false);
                    view.window.set_minimized(!minimized);
                }
                let _ = reply.send(Ok(()));
            }
            BackendRequest::ToggleMaximize { handle, reply } => {
                if let Some(view) = self.content.get(&handle) {
                    view.window.set_maximized(!view.window.is_maximized());
                }
                let _ = reply.send(Ok(()));
            }
            BackendRequest::SetChromeGeometry { rect, reply } => {
                let result = match &self.chrome {
                    Some(chrome) => {
                        chrome.set_outer_position(PhysicalPosition::new(rect.x, rect.y));
                        let _ = chrome
                            .request_inner_size(PhysicalSize::new(rect.width, rect.height));
                        Ok(())
                    }
                    None => Err(PlatformCommandError::Reposition(
                        "chrome surface not ready".into(),
                    )),
                };
                let _ = reply.send(result);
            }
            BackendRequest::SetChromeAlwaysOnTop { on_top, reply } => {
                if let Some(chrome) = &self.chrome {
                    chrome.set_window_level(if on_top {
                        WindowLevel::AlwaysOnTop
                    } else {
                        WindowLevel::Normal
                    });
                }
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn eval(&self, handle: &WindowHandle, script: &str) -> Result<(), PlatformCommandError> {
        match self.content.get(handle) {
            Some(view) => view
                .webview
                .evaluate_script(script)
                .map_err(|e| PlatformCommandError::Navigate(e.to_string())),
            None => {
                debug!(%handle, "script for unknown window; ignoring");
                Ok(())
            }
        }
    }
}

impl ApplicationHandler<WakeUp> for ShellApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.chrome.is_some() {
            return;
        }

        let screen = self.screen_size(event_loop);
        if let Some(tx) = self.screen_tx.take() {
            let _ = tx.send(screen);
        }

        let home = compute_geometry(screen_or_default(screen), ShellMode::Home);
        let attrs = WindowAttributes::default()
            .with_title("Shiori")
            .with_decorations(false)
            .with_inner_size(PhysicalSize::new(home.width, home.height))
            .with_position(PhysicalPosition::new(home.x, home.y));

        let chrome = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                tracing::error!("Failed to create chrome window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.chrome = Some(chrome);
        info!("chrome surface created");

        self.drain_requests(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            if let Some(handle) = self.ids.remove(&window_id) {
                // Native close of a content window. Drop our references
                // and let the shell reconcile the registry.
                self.content.remove(&handle);
                info!(%handle, "content window closed natively");
                let _ = self
                    .platform_events
                    .send(PlatformEvent::WindowClosed { handle });
            } else {
                info!("chrome close requested; shutting down");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _event: WakeUp) {
        self.drain_pending_spawns(event_loop);
        self.drain_requests(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.drain_requests(event_loop);
    }
}
