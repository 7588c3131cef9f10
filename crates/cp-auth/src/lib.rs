//! Embedded-browser Twitch authorization flow for CastPoll
//!
//! This crate is the sign-in core of the desktop app: it opens a browser
//! surface pointed at Twitch, watches navigation for the redirect callback,
//! exchanges the authorization code through the CastPoll backend, and hands
//! the caller exactly one terminal result per attempt.

pub mod backend;
pub mod flow;
pub mod paths;

// Re-export the flow public API
pub use backend::{AuthBackend, HttpAuthBackend};
pub use flow::{
    handle_landing, AuthFlowConfig, AuthFlowCoordinator, AuthMode, AuthResult, BrowserSurface,
    CallbackOutcome, FileHandoffStore, HandoffRecord, HandoffStore, LandingAction,
    MemoryHandoffStore, RedirectMatcher, ResultChannel, SessionId, SessionState, SurfaceEvent,
};
