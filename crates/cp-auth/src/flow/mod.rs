//! Embedded-browser authorization flow
//!
//! One invocation of the flow opens a browser surface at the provider's
//! authorization page, observes the surface's navigation events until one of
//! them is the registered redirect callback, exchanges the authorization
//! code through the backend, and resolves a one-shot result channel. The
//! caller sees exactly one terminal outcome no matter how many navigation
//! signals fire, in which order they arrive, or whether the user closes the
//! window mid-flow.
//!
//! # Features
//! - Popup mode: dedicated surface owned and closed by the coordinator
//! - Inline mode: host-surface redirect with a persisted handoff that
//!   survives the application reload
//! - Handled-once latch against duplicate/overlapping navigation signals
//! - Optional flow deadline that behaves like a user-initiated close
//!
//! # Usage Example
//! ```no_run
//! use std::sync::Arc;
//! use cp_auth::backend::HttpAuthBackend;
//! use cp_auth::flow::{AuthFlowConfig, AuthFlowCoordinator};
//!
//! # async fn run(surface: Arc<dyn cp_auth::flow::BrowserSurface>) {
//! let backend = Arc::new(HttpAuthBackend::new("http://localhost:8080/api"));
//! let config = AuthFlowConfig::new("http://localhost:3000/auth/callback");
//! let coordinator = AuthFlowCoordinator::new(backend, config);
//!
//! let result = coordinator.start(surface).await;
//! # let _ = result;
//! # }
//! ```

mod callback;
mod channel;
mod coordinator;
pub mod handoff;
mod inline;
mod surface;
mod types;

#[cfg(feature = "tauri-support")]
mod tauri_webview;

// Re-export public API
pub use callback::{CallbackOutcome, RedirectMatcher, GENERIC_AUTH_ERROR};
pub use channel::{ResultChannel, ResultSender, ResultWaiter};
pub use coordinator::{AuthFlowCoordinator, TIMEOUT_REASON};
pub use handoff::{FileHandoffStore, HandoffRecord, HandoffStore, MemoryHandoffStore};
pub use inline::{handle_landing, LandingAction};
pub use surface::{events_already_taken, BrowserSurface, SurfaceEvent};
pub use types::{
    AuthFlowConfig, AuthMode, AuthResult, AuthSession, SessionId, SessionState,
    DEFAULT_FLOW_TIMEOUT,
};

#[cfg(feature = "tauri-support")]
pub use tauri_webview::WebviewSurface;
