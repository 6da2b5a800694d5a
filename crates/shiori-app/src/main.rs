mod app;
mod backend;
mod cli;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use shiori_config::{BookmarkStore, Settings};
use shiori_shell::{event_channel, spawn_event_pump, NoopBackend, ShellController, WindowBackend};

use app::ShellApp;
use backend::{WakeUp, WryBackend};

fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("shiori=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "shiori=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Shiori v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = shiori_config::load_settings().unwrap_or_else(|e| {
        tracing::warn!("Settings load failed, using defaults: {e}");
        Settings::default()
    });
    let bookmarks = shiori_config::load_bookmarks().unwrap_or_else(|e| {
        tracing::warn!("Bookmark load failed, using defaults: {e}");
        BookmarkStore::with_defaults()
    });
    tracing::info!(
        "Config loaded (engine: {}, {} bookmarks)",
        settings.search_engine.name(),
        bookmarks.len()
    );

    if args.headless {
        run_headless(args, settings, bookmarks);
        return;
    }

    let event_loop = EventLoop::<WakeUp>::with_user_event()
        .build()
        .expect("failed to create event loop");
    let proxy = event_loop.create_proxy();

    let (request_tx, request_rx) = std::sync::mpsc::channel();
    let (platform_tx, platform_rx) = event_channel();
    let (screen_tx, screen_rx) = tokio::sync::oneshot::channel();

    let backend = Arc::new(WryBackend::new(request_tx, proxy.clone()));
    let open_url = args.open.clone();

    // The controller lives on its own tokio runtime; the winit loop
    // below owns the actual windows.
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
        rt.block_on(async move {
            let screen = screen_rx.await.ok().flatten();
            let controller = Arc::new(ShellController::new(
                backend as Arc<dyn WindowBackend>,
                settings,
                bookmarks,
                screen,
            ));
            let pump = spawn_event_pump(Arc::clone(&controller), platform_rx);

            if let Some(url) = open_url {
                if let Err(e) = controller.navigate(&url).await {
                    tracing::warn!("startup navigation failed: {e}");
                }
            }

            // Runs until the winit side drops its event sender.
            let _ = pump.await;
        });
    });

    let mut shell_app = ShellApp::new(request_rx, platform_tx, proxy, screen_tx);

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut shell_app) {
        tracing::error!("Event loop error: {e}");
    }
    tracing::info!("Shutdown complete");
}

/// Exercise the orchestrator without a window system: every platform
/// command goes to the no-op backend.
fn run_headless(args: cli::Args, settings: Settings, bookmarks: BookmarkStore) {
    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    rt.block_on(async move {
        let controller = Arc::new(ShellController::new(
            Arc::new(NoopBackend::new()) as Arc<dyn WindowBackend>,
            settings,
            bookmarks,
            None,
        ));

        if let Some(url) = &args.open {
            if let Err(e) = controller.navigate(url).await {
                tracing::warn!("navigation failed: {e}");
            }
        }

        let snap = controller.snapshot().await;
        tracing::info!(
            mode = ?snap.mode,
            windows = snap.windows.len(),
            "headless run complete"
        );
    });
}
