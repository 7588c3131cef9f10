//! Inline-mode landing page handling
//!
//! When no dedicated surface is available the provider redirect lands on
//! the host application itself. The landing path records what it saw in the
//! fallback store and steers the window back; the next host load picks the
//! record up through [`super::AuthFlowCoordinator::resume_inline`].

use crate::flow::callback::{CallbackOutcome, RedirectMatcher};
use crate::flow::handoff::{self, HandoffStore};
use cp_types::AppResult;
use tracing::{debug, info};

/// What the landing page should do after recording the handoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingAction {
    /// Not a callback; leave the page alone
    Ignore,

    /// Transient child context; close it and let the host pick the
    /// handoff up
    CloseSelf,

    /// The host page itself was redirected; navigate back to the home route
    NavigateHome,
}

/// Handle a landing-page load
///
/// Classifies the landing URL, records a pending handoff for anything
/// decisive, and says how to terminate the navigation. `transient_child`
/// is whether the landing happened in a disposable child context rather
/// than the host page itself.
pub fn handle_landing(
    url: &str,
    matcher: &RedirectMatcher,
    store: &dyn HandoffStore,
    transient_child: bool,
) -> AppResult<LandingAction> {
    let action = if transient_child {
        LandingAction::CloseSelf
    } else {
        LandingAction::NavigateHome
    };

    match matcher.classify(url) {
        CallbackOutcome::None => {
            debug!("Landing page load is not a callback");
            Ok(LandingAction::Ignore)
        }
        CallbackOutcome::Code(code) => {
            handoff::write_code(store, &code)?;
            info!("Landing page captured an authorization code");
            Ok(action)
        }
        CallbackOutcome::Error(error) => {
            handoff::write_error(store, &error)?;
            info!("Landing page captured provider error: {}", error);
            Ok(action)
        }
    }
}
