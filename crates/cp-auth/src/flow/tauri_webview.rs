//! Tauri webview adapter for the browser surface
//!
//! Maps the webview's navigation hooks onto the surface event stream:
//! `on_navigation` emits `WillNavigate`, a finished page load emits
//! `DidNavigate`, and window destruction emits `Closed`. The window itself
//! is created lazily on `open` so one adapter value maps to one flow.

use crate::flow::surface::{events_already_taken, BrowserSurface, SurfaceEvent};
use cp_types::{AppError, AppResult};
use parking_lot::Mutex;
use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Runtime, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Window label used for the dedicated auth window
const AUTH_WINDOW_LABEL: &str = "twitch-auth";

/// Dedicated auth window backed by a Tauri webview
pub struct WebviewSurface<R: Runtime> {
    app: AppHandle<R>,
    events_tx: mpsc::UnboundedSender<SurfaceEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<SurfaceEvent>>>,
    window: Mutex<Option<WebviewWindow<R>>>,
}

impl<R: Runtime> WebviewSurface<R> {
    /// Create an adapter that will open its window on the given app handle
    pub fn new(app: AppHandle<R>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            app,
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            window: Mutex::new(None),
        }
    }
}

impl<R: Runtime> BrowserSurface for WebviewSurface<R> {
    fn open(&self, url: &str) -> AppResult<()> {
        let external = Url::parse(url)
            .map_err(|e| AppError::AuthFlow(format!("Invalid authorization URL: {}", e)))?;

        let nav_tx = self.events_tx.clone();
        let load_tx = self.events_tx.clone();

        let window = WebviewWindowBuilder::new(
            &self.app,
            AUTH_WINDOW_LABEL,
            WebviewUrl::External(external),
        )
        .title("Connect with Twitch")
        .inner_size(500.0, 700.0)
        .on_navigation(move |url| {
            let _ = nav_tx.send(SurfaceEvent::WillNavigate(url.to_string()));
            true
        })
        .on_page_load(move |_, payload| {
            if matches!(payload.event(), PageLoadEvent::Finished) {
                let _ = load_tx.send(SurfaceEvent::DidNavigate(payload.url().to_string()));
            }
        })
        .build()
        .map_err(|e| AppError::AuthFlow(format!("Failed to open auth window: {}", e)))?;

        let closed_tx = self.events_tx.clone();
        window.on_window_event(move |event| {
            if matches!(event, WindowEvent::Destroyed) {
                let _ = closed_tx.send(SurfaceEvent::Closed);
            }
        });

        debug!("Auth window {} opened", AUTH_WINDOW_LABEL);
        *self.window.lock() = Some(window);
        Ok(())
    }

    fn close(&self) {
        if let Some(window) = self.window.lock().take() {
            if let Err(e) = window.close() {
                warn!("Failed to close auth window: {}", e);
            }
        }
    }

    fn take_events(&self) -> AppResult<mpsc::UnboundedReceiver<SurfaceEvent>> {
        self.events_rx.lock().take().ok_or_else(events_already_taken)
    }
}
