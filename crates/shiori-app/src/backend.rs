//! Channel-bridged platform backend.
//!
//! winit windows can only be created and driven from the event-loop
//! thread, while the shell controller runs on the tokio side. The
//! bridge: every `WindowBackend` call is encoded as a [`BackendRequest`]
//! with a oneshot reply channel, pushed onto an mpsc queue, and the
//! event loop is woken through its proxy to process it.

use std::sync::mpsc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use winit::event_loop::EventLoopProxy;

use shiori_common::{PlatformCommandError, Rect, WindowHandle};
use shiori_shell::WindowBackend;

/// User event that wakes the winit loop to drain the request queue.
#[derive(Debug, Clone, Copy)]
pub struct WakeUp;

type Reply = oneshot::Sender<Result<(), PlatformCommandError>>;

/// One platform command, carried from the tokio side to the event loop.
pub enum BackendRequest {
    CreateWindow {
        url: String,
        reply: oneshot::Sender<Result<WindowHandle, PlatformCommandError>>,
    },
    Show {
        handle: WindowHandle,
        reply: Reply,
    },
    Hide {
        handle: WindowHandle,
        reply: Reply,
    },
    Close {
        handle: WindowHandle,
        reply: Reply,
    },
    Navigate {
        handle: WindowHandle,
        url: String,
        reply: Reply,
    },
    Back {
        handle: WindowHandle,
        reply: Reply,
    },
    Forward {
        handle: WindowHandle,
        reply: Reply,
    },
    Reload {
        handle: WindowHandle,
        reply: Reply,
    },
    Minimize {
        handle: WindowHandle,
        reply: Reply,
    },
    ToggleMaximize {
        handle: WindowHandle,
        reply: Reply,
    },
    SetChromeGeometry {
        rect: Rect,
        reply: Reply,
    },
    SetChromeAlwaysOnTop {
        on_top: bool,
        reply: Reply,
    },
}

/// `WindowBackend` implementation backed by the winit/wry event loop.
pub struct WryBackend {
    requests: mpsc::Sender<BackendRequest>,
    proxy: EventLoopProxy<WakeUp>,
}

impl WryBackend {
    pub fn new(requests: mpsc::Sender<BackendRequest>, proxy: EventLoopProxy<WakeUp>) -> Self {
        Self { requests, proxy }
    }

    /// Queue a request and wake the event loop. Fails only when the
    /// event loop is gone.
    fn send(&self, request: BackendRequest) -> Result<(), String> {
        self.requests
            .send(request)
            .map_err(|_| "event loop closed".to_string())?;
        self.proxy
            .send_event(WakeUp)
            .map_err(|_| "event loop closed".to_string())
    }
}

#[async_trait]
impl WindowBackend for WryBackend {
    async fn create_window(&self, url: &str) -> Result<WindowHandle, PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::CreateWindow {
            url: url.to_string(),
            reply,
        })
        .map_err(PlatformCommandError::Create)?;
        rx.await
            .map_err(|_| PlatformCommandError::Create("reply channel dropped".into()))?
    }

    async fn show_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Show {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Show)?;
        rx.await
            .map_err(|_| PlatformCommandError::Show("reply channel dropped".into()))?
    }

    async fn hide_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Hide {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Hide)?;
        rx.await
            .map_err(|_| PlatformCommandError::Hide("reply channel dropped".into()))?
    }

    async fn close_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Close {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Close)?;
        rx.await
            .map_err(|_| PlatformCommandError::Close("reply channel dropped".into()))?
    }

    async fn navigate(
        &self,
        handle: &WindowHandle,
        url: &str,
    ) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Navigate {
            handle: handle.clone(),
            url: url.to_string(),
            reply,
        })
        .map_err(PlatformCommandError::Navigate)?;
        rx.await
            .map_err(|_| PlatformCommandError::Navigate("reply channel dropped".into()))?
    }

    async fn go_back(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Back {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Navigate)?;
        rx.await
            .map_err(|_| PlatformCommandError::Navigate("reply channel dropped".into()))?
    }

    async fn go_forward(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Forward {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Navigate)?;
        rx.await
            .map_err(|_| PlatformCommandError::Navigate("reply channel dropped".into()))?
    }

    async fn reload(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Reload {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Navigate)?;
        rx.await
            .map_err(|_| PlatformCommandError::Navigate("reply channel dropped".into()))?
    }

    async fn minimize_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::Minimize {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Show)?;
        rx.await
            .map_err(|_| PlatformCommandError::Show("reply channel dropped".into()))?
    }

    async fn toggle_maximize_window(
        &self,
        handle: &WindowHandle,
    ) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::ToggleMaximize {
            handle: handle.clone(),
            reply,
        })
        .map_err(PlatformCommandError::Show)?;
        rx.await
            .map_err(|_| PlatformCommandError::Show("reply channel dropped".into()))?
    }

    async fn set_chrome_geometry(&self, rect: Rect) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::SetChromeGeometry { rect, reply })
            .map_err(PlatformCommandError::Reposition)?;
        rx.await
            .map_err(|_| PlatformCommandError::Reposition("reply channel dropped".into()))?
    }

    async fn set_chrome_always_on_top(&self, on_top: bool) -> Result<(), PlatformCommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::SetChromeAlwaysOnTop { on_top, reply })
            .map_err(PlatformCommandError::Reposition)?;
        rx.await
            .map_err(|_| PlatformCommandError::Reposition("reply channel dropped".into()))?
    }
}
