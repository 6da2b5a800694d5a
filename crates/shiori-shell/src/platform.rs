//! Platform command surface.
//!
//! The real window manager is an injected capability, never a global.
//! Every command is asynchronous and may fail; the platform gives no
//! ordering guarantees between commands, so any ordering the shell needs
//! (hide before show) is enforced by the caller issuing and awaiting
//! commands in sequence.

use async_trait::async_trait;
use tracing::debug;

use shiori_common::{PlatformCommandError, Rect, WindowHandle};

/// Commands the shell issues against platform-owned windows and its own
/// chrome surface.
#[async_trait]
pub trait WindowBackend: Send + Sync {
    /// Create a content window loading `url`. Returns the opaque handle
    /// used to address it from now on.
    async fn create_window(&self, url: &str) -> Result<WindowHandle, PlatformCommandError>;

    async fn show_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn hide_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn close_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    /// Point an existing content window at a new url.
    async fn navigate(&self, handle: &WindowHandle, url: &str)
        -> Result<(), PlatformCommandError>;

    async fn go_back(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn go_forward(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn reload(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn minimize_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError>;

    async fn toggle_maximize_window(
        &self,
        handle: &WindowHandle,
    ) -> Result<(), PlatformCommandError>;

    /// Move and resize the chrome surface.
    async fn set_chrome_geometry(&self, rect: Rect) -> Result<(), PlatformCommandError>;

    async fn set_chrome_always_on_top(&self, on_top: bool) -> Result<(), PlatformCommandError>;
}

/// Backend that fabricates handles and logs every command.
///
/// Used in headless mode and wherever the orchestration logic should run
/// without a window system.
#[derive(Debug, Default)]
pub struct NoopBackend;

impl NoopBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WindowBackend for NoopBackend {
    async fn create_window(&self, url: &str) -> Result<WindowHandle, PlatformCommandError> {
        let handle = WindowHandle::generate();
        debug!(%handle, url, "noop: create window");
        Ok(handle)
    }

    async fn show_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: show window");
        Ok(())
    }

    async fn hide_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: hide window");
        Ok(())
    }

    async fn close_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: close window");
        Ok(())
    }

    async fn navigate(
        &self,
        handle: &WindowHandle,
        url: &str,
    ) -> Result<(), PlatformCommandError> {
        debug!(%handle, url, "noop: navigate");
        Ok(())
    }

    async fn go_back(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: back");
        Ok(())
    }

    async fn go_forward(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: forward");
        Ok(())
    }

    async fn reload(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: reload");
        Ok(())
    }

    async fn minimize_window(&self, handle: &WindowHandle) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: minimize");
        Ok(())
    }

    async fn toggle_maximize_window(
        &self,
        handle: &WindowHandle,
    ) -> Result<(), PlatformCommandError> {
        debug!(%handle, "noop: toggle maximize");
        Ok(())
    }

    async fn set_chrome_geometry(&self, rect: Rect) -> Result<(), PlatformCommandError> {
        debug!(?rect, "noop: set chrome geometry");
        Ok(())
    }

    async fn set_chrome_always_on_top(&self, on_top: bool) -> Result<(), PlatformCommandError> {
        debug!(on_top, "noop: set chrome always-on-top");
        Ok(())
    }
}
