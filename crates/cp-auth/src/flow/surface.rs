//! Browser surface abstraction
//!
//! Any navigable view able to load a URL and report where it is going can
//! back the flow: a dedicated webview window in popup mode, or a scripted
//! double in tests. The coordinator consumes a surface purely through this
//! interface.

use cp_types::{AppError, AppResult};
use tokio::sync::mpsc;

/// Navigation signals a surface emits
///
/// A single logical redirect may surface as more than one event (an
/// about-to-navigate intent plus a completed navigation carrying the same
/// URL). Consumers must treat the stream as "candidate URL observed"
/// signals, not as a count of logical transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface is about to navigate to the URL
    WillNavigate(String),

    /// The surface finished navigating to the URL
    DidNavigate(String),

    /// The surface was closed by the user or the system
    Closed,
}

/// A navigable window/view the coordinator can drive
pub trait BrowserSurface: Send + Sync {
    /// Load the given URL
    fn open(&self, url: &str) -> AppResult<()>;

    /// Close the surface; a no-op when it is already gone
    fn close(&self);

    /// Take the surface's event stream
    ///
    /// Single consumer: the stream can only be taken once per surface.
    fn take_events(&self) -> AppResult<mpsc::UnboundedReceiver<SurfaceEvent>>;
}

/// Error for a second `take_events` call on the same surface
///
/// Surface implementations share this so the coordinator sees one message.
pub fn events_already_taken() -> AppError {
    AppError::AuthFlow("Surface event stream already taken".to_string())
}
