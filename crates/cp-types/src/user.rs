//! User payload returned by the backend after a code exchange

use serde::{Deserialize, Serialize};

/// User data the backend returns when an authorization code is exchanged
///
/// Mirrors the callback response body of the CastPoll backend. `success` is
/// a transport flag the backend attaches; it defaults to `false` when the
/// field is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Twitch user id of the signed-in streamer
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Whether the backend reported the exchange as successful
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_data_deserialization() {
        let json = r#"{"userId": "42", "success": true}"#;

        let user: UserData = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, "42");
        assert!(user.success);
    }

    #[test]
    fn test_user_data_success_defaults_to_false() {
        let json = r#"{"userId": "42"}"#;

        let user: UserData = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, "42");
        assert!(!user.success);
    }

    #[test]
    fn test_user_data_roundtrip_field_name() {
        let user = UserData {
            user_id: "42".to_string(),
            success: true,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"userId\""));
    }
}
