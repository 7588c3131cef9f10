//! Flow coordinator - the authorization state machine
//!
//! Drives one authorization attempt end to end: points the browser surface
//! at the provider, classifies every navigation signal the surface emits,
//! latches the first decisive one, exchanges the code through the backend,
//! and resolves the result channel exactly once. Overlapping signals for
//! the same redirect, a window closed mid-flow, and the optional deadline
//! all funnel into the same at-most-once delivery.

use crate::backend::AuthBackend;
use crate::flow::callback::{CallbackOutcome, RedirectMatcher};
use crate::flow::channel::{ResultChannel, ResultSender};
use crate::flow::handoff::{self, HandoffRecord, HandoffStore};
use crate::flow::surface::{BrowserSurface, SurfaceEvent};
use crate::flow::types::{AuthFlowConfig, AuthMode, AuthResult, AuthSession, SessionState};
use cp_types::AppResult;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Failure reason reported when the flow deadline expires
pub const TIMEOUT_REASON: &str = "timeout";

/// The first decisive signal observed while awaiting the callback
enum Decisive {
    /// Redirect target reached with an authorization code
    Code(String),

    /// Provider signalled failure
    ProviderError(String),

    /// Surface closed before any callback was seen
    Closed,
}

/// Coordinates embedded-browser authorization flows
///
/// One coordinator can run any number of sequential flows; each `start`
/// call is an independent session with its own result channel.
pub struct AuthFlowCoordinator {
    backend: Arc<dyn AuthBackend>,
    matcher: RedirectMatcher,
    config: AuthFlowConfig,
}

impl AuthFlowCoordinator {
    /// Create a coordinator for the given backend and configuration
    pub fn new(backend: Arc<dyn AuthBackend>, config: AuthFlowConfig) -> Self {
        let matcher = RedirectMatcher::from_config(&config);
        Self {
            backend,
            matcher,
            config,
        }
    }

    /// The redirect matcher this coordinator classifies URLs with
    ///
    /// Inline-mode hosts share it with [`crate::flow::handle_landing`].
    pub fn matcher(&self) -> &RedirectMatcher {
        &self.matcher
    }

    /// Run a popup-mode flow, fetching the authorization URL from the backend
    pub async fn start(&self, surface: Arc<dyn BrowserSurface>) -> AuthResult {
        match self.backend.authorization_url().await {
            Ok(auth_url) => self.start_with_url(surface, &auth_url).await,
            Err(e) => {
                warn!("Failed to fetch authorization URL: {}", e);
                AuthResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run a popup-mode flow against an already-known authorization URL
    ///
    /// Resolves with exactly one terminal result; failures never propagate
    /// as errors out of this call.
    pub async fn start_with_url(
        &self,
        surface: Arc<dyn BrowserSurface>,
        auth_url: &str,
    ) -> AuthResult {
        let session = Mutex::new(AuthSession::new(AuthMode::Popup));
        let session_id = session.lock().id;
        let (sender, waiter) = ResultChannel::create();

        info!("Starting auth session {}", session_id);

        // The stream must exist before the first navigation can fire.
        let mut events = match surface.take_events() {
            Ok(events) => events,
            Err(e) => {
                Self::transition(&session, SessionState::Failed);
                sender.deliver(AuthResult::Failed {
                    reason: e.to_string(),
                });
                return waiter.wait().await;
            }
        };

        if let Err(e) = surface.open(auth_url) {
            warn!("Session {}: failed to open browser surface: {}", session_id, e);
            Self::transition(&session, SessionState::Failed);
            sender.deliver(AuthResult::Failed {
                reason: e.to_string(),
            });
            return waiter.wait().await;
        }
        Self::transition(&session, SessionState::AwaitingCallback);

        let decisive = match self.config.timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, Self::await_callback(&self.matcher, &session, &mut events)).await
                {
                    Ok(decisive) => decisive,
                    Err(_) => {
                        // Deadline expired with no callback: same handling
                        // as a user-initiated close, distinct reason.
                        if Self::latch(&session) {
                            warn!("Session {} timed out after {:?}", session_id, deadline);
                            Self::transition(&session, SessionState::Failed);
                            surface.close();
                            sender.deliver(AuthResult::Failed {
                                reason: TIMEOUT_REASON.to_string(),
                            });
                        }
                        return waiter.wait().await;
                    }
                }
            }
            None => Self::await_callback(&self.matcher, &session, &mut events).await,
        };

        match decisive {
            Decisive::Code(code) => {
                self.exchange(&session, Some(surface.as_ref()), &sender, &code)
                    .await;
            }
            Decisive::ProviderError(error) => {
                warn!("Session {}: provider returned error: {}", session_id, error);
                Self::transition(&session, SessionState::Failed);
                surface.close();
                sender.deliver(AuthResult::Failed { reason: error });
            }
            Decisive::Closed => {
                info!(
                    "Session {}: surface closed before completion, authentication cancelled",
                    session_id
                );
                Self::transition(&session, SessionState::Canceled);
                sender.deliver(AuthResult::Canceled);
            }
        }

        waiter.wait().await
    }

    /// Resume a flow handed off across an inline-mode reload
    ///
    /// Returns `Ok(None)` when the store holds no pending handoff. The
    /// handoff is cleared unconditionally before any processing, so a
    /// failure here can never replay on a later load.
    pub async fn resume_inline(&self, store: &dyn HandoffStore) -> AppResult<Option<AuthResult>> {
        let record = match handoff::consume(store)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let session = Mutex::new(AuthSession::new(AuthMode::Inline));
        let session_id = session.lock().id;
        let (sender, waiter) = ResultChannel::create();

        info!("Resuming handed-off auth session {}", session_id);

        // Delayed delivery into the same machine: the landing page already
        // observed the callback, so the session skips AWAITING_CALLBACK.
        session.lock().handled = true;

        match record {
            HandoffRecord::Code(code) => {
                self.exchange(&session, None, &sender, &code).await;
            }
            HandoffRecord::Error(error) => {
                warn!("Session {}: handed-off provider error: {}", session_id, error);
                Self::transition(&session, SessionState::Failed);
                sender.deliver(AuthResult::Failed { reason: error });
            }
        }

        Ok(Some(waiter.wait().await))
    }

    /// Consume surface events until the first decisive one
    ///
    /// The handled latch is taken synchronously before this returns, so a
    /// second signal carrying the same redirect can never win even while
    /// the first is still being processed.
    async fn await_callback(
        matcher: &RedirectMatcher,
        session: &Mutex<AuthSession>,
        events: &mut mpsc::UnboundedReceiver<SurfaceEvent>,
    ) -> Decisive {
        loop {
            let event = match events.recv().await {
                Some(event) => event,
                // The adapter dropped its sender without a close event;
                // treat the surface as gone.
                None => SurfaceEvent::Closed,
            };

            match event {
                SurfaceEvent::WillNavigate(url) | SurfaceEvent::DidNavigate(url) => {
                    match matcher.classify(&url) {
                        CallbackOutcome::None => continue,
                        CallbackOutcome::Code(code) => {
                            if !Self::latch(session) {
                                debug!("Session {}: navigation after handled ignored", session.lock().id);
                                continue;
                            }
                            return Decisive::Code(code);
                        }
                        CallbackOutcome::Error(error) => {
                            if !Self::latch(session) {
                                debug!("Session {}: navigation after handled ignored", session.lock().id);
                                continue;
                            }
                            return Decisive::ProviderError(error);
                        }
                    }
                }
                SurfaceEvent::Closed => {
                    // A latched session has already returned out of this
                    // loop, so close-after-handled never reaches here; the
                    // gate stays anyway as the session's single correctness
                    // mechanism.
                    if !Self::latch(session) {
                        continue;
                    }
                    return Decisive::Closed;
                }
            }
        }
    }

    /// Exchange a captured code and resolve the session
    ///
    /// Exchange failures are converted into a `Failed` result, never
    /// propagated. Popup mode closes the surface either way; inline mode
    /// has none to close.
    async fn exchange(
        &self,
        session: &Mutex<AuthSession>,
        surface: Option<&dyn BrowserSurface>,
        sender: &ResultSender,
        code: &str,
    ) {
        let session_id = session.lock().id;
        Self::transition(session, SessionState::Processing);

        let result = match self.backend.exchange_code(code).await {
            Ok(data) => {
                info!(
                    "Session {}: authentication succeeded for user {}",
                    session_id, data.user_id
                );
                Self::transition(session, SessionState::Succeeded);
                AuthResult::Succeeded { data }
            }
            Err(e) => {
                warn!("Session {}: code exchange failed: {}", session_id, e);
                Self::transition(session, SessionState::Failed);
                AuthResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if let Some(surface) = surface {
            surface.close();
        }
        sender.deliver(result);
    }

    /// Take the handled latch
    ///
    /// Returns false when the session was already handled; callers must
    /// then leave the state alone.
    fn latch(session: &Mutex<AuthSession>) -> bool {
        let mut session = session.lock();
        if session.handled {
            false
        } else {
            session.handled = true;
            true
        }
    }

    /// Record a state transition
    fn transition(session: &Mutex<AuthSession>, state: SessionState) {
        let mut session = session.lock();
        debug!("Session {}: {:?} -> {:?}", session.id, session.state, state);
        session.state = state;
    }
}
