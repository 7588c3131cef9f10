//! Core types for the embedded-browser authorization flow

use chrono::{DateTime, Utc};
use cp_types::UserData;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Default flow deadline (5 minutes)
pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(300);

/// Unique identifier for one invocation of the auth flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new unique session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the flow reaches the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    /// Dedicated browser surface owned and closed by the coordinator
    Popup,

    /// The host surface itself is redirected; completion crosses the
    /// application reload through the fallback handoff store
    Inline,
}

/// Lifecycle states of an [`AuthSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Created; the surface is not yet pointed at the provider
    Init,

    /// Surface is showing the provider; navigation events are being watched
    AwaitingCallback,

    /// Callback captured; exchanging the code with the backend
    Processing,

    /// Terminal: exchange completed
    Succeeded,

    /// Terminal: provider error, exchange failure, or deadline expiry
    Failed,

    /// Terminal: surface closed before any callback was seen
    Canceled,
}

impl SessionState {
    /// Whether the session can never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Failed | SessionState::Canceled
        )
    }
}

/// One authorization attempt
///
/// Exclusively owned by the coordinator for its lifetime. Callers never
/// observe the session directly; the result channel is the only contract.
#[derive(Debug)]
pub struct AuthSession {
    /// Unique session identifier
    pub id: SessionId,

    /// Popup or inline variant
    pub mode: AuthMode,

    /// Current machine state
    pub state: SessionState,

    /// Handled-once latch: once true, no further navigation event may
    /// change `state`
    pub handled: bool,

    /// When this attempt started
    pub started_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a fresh session in the `Init` state
    pub fn new(mode: AuthMode) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            state: SessionState::Init,
            handled: false,
            started_at: Utc::now(),
        }
    }
}

/// Terminal outcome delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum AuthResult {
    /// Exchange completed; carries the signed-in user's data
    Succeeded {
        /// The exchanged user payload
        data: UserData,
    },

    /// Provider error, exchange failure, or deadline expiry
    Failed {
        /// Human-readable failure reason
        reason: String,
    },

    /// Surface closed (or caller abandoned the flow) before completion
    Canceled,
}

impl AuthResult {
    /// Whether the flow completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Succeeded { .. })
    }

    /// Extract the user data if successful
    pub fn data(self) -> Option<UserData> {
        match self {
            AuthResult::Succeeded { data } => Some(data),
            _ => None,
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct AuthFlowConfig {
    /// URL prefixes identifying a navigation as the registered redirect
    /// target (e.g. `http://localhost:3000/auth/callback`)
    pub redirect_prefixes: Vec<String>,

    /// Provider error-page prefixes that classify as an error callback even
    /// without an `error` query parameter
    pub error_page_prefixes: Vec<String>,

    /// Flow deadline; expiry behaves like a user-initiated close with
    /// reason `"timeout"`. `None` disables the deadline.
    pub timeout: Option<Duration>,
}

impl AuthFlowConfig {
    /// Configuration for a single redirect target with the default deadline
    pub fn new(redirect_prefix: impl Into<String>) -> Self {
        Self {
            redirect_prefixes: vec![redirect_prefix.into()],
            error_page_prefixes: Vec::new(),
            timeout: Some(DEFAULT_FLOW_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_uniqueness() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        let display = format!("{}", id);
        assert!(!display.is_empty());
        assert_eq!(display, id.as_uuid().to_string());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Init.is_terminal());
        assert!(!SessionState::AwaitingCallback.is_terminal());
        assert!(!SessionState::Processing.is_terminal());
        assert!(SessionState::Succeeded.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(SessionState::Canceled.is_terminal());
    }

    #[test]
    fn test_new_session_defaults() {
        let session = AuthSession::new(AuthMode::Popup);
        assert_eq!(session.state, SessionState::Init);
        assert!(!session.handled);
        assert_eq!(session.mode, AuthMode::Popup);
    }

    #[test]
    fn test_auth_result_is_success() {
        let succeeded = AuthResult::Succeeded {
            data: UserData {
                user_id: "42".to_string(),
                success: true,
            },
        };
        assert!(succeeded.is_success());

        let failed = AuthResult::Failed {
            reason: "access_denied".to_string(),
        };
        assert!(!failed.is_success());
        assert!(!AuthResult::Canceled.is_success());
    }

    #[test]
    fn test_auth_result_extract_data() {
        let succeeded = AuthResult::Succeeded {
            data: UserData {
                user_id: "42".to_string(),
                success: true,
            },
        };
        assert_eq!(succeeded.data().unwrap().user_id, "42");

        let failed = AuthResult::Failed {
            reason: "access_denied".to_string(),
        };
        assert!(failed.data().is_none());
        assert!(AuthResult::Canceled.data().is_none());
    }

    #[test]
    fn test_auth_result_serialization_tag() {
        let canceled = serde_json::to_string(&AuthResult::Canceled).unwrap();
        assert!(canceled.contains("\"status\":\"Canceled\""));

        let failed = serde_json::to_string(&AuthResult::Failed {
            reason: "timeout".to_string(),
        })
        .unwrap();
        assert!(failed.contains("\"status\":\"Failed\""));
        assert!(failed.contains("timeout"));
    }

    #[test]
    fn test_default_config() {
        let config = AuthFlowConfig::new("https://app/callback");
        assert_eq!(config.redirect_prefixes, vec!["https://app/callback"]);
        assert!(config.error_page_prefixes.is_empty());
        assert_eq!(config.timeout, Some(DEFAULT_FLOW_TIMEOUT));
    }
}
