//! Request and response model at the HTTP boundary.
//!
//! Bodies arrive as loosely-shaped JSON. They are classified once, here,
//! into a [`BootstrapRequest`] so the policy never probes raw fields.

use rolegate_storage::SubjectId;
use serde::Serialize;
use serde_json::Value;

/// What the caller is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapRequest {
    /// Anonymous "is first-admin signup open?" probe.
    StatusCheck,
    /// Grant the admin role to `user_id`.
    ///
    /// `user_id` is `None` when the body did not carry a non-empty string.
    /// Rejecting that is deferred until after authentication.
    AssignAdmin { user_id: Option<SubjectId> },
}

impl BootstrapRequest {
    /// Classify a raw request body.
    ///
    /// `{"check_signup_enabled": true}` is a status check. Everything else,
    /// including bodies that are not JSON objects at all, is an assignment
    /// attempt whose `user_id` is taken only if it is a non-empty string.
    #[must_use]
    pub fn from_json(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        if value.get("check_signup_enabled") == Some(&Value::Bool(true)) {
            return Self::StatusCheck;
        }

        let user_id = value
            .get("user_id")
            .and_then(Value::as_str)
            .and_then(SubjectId::parse);

        Self::AssignAdmin { user_id }
    }
}

/// Successful response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BootstrapResponse {
    /// `{"signup_enabled": bool}`
    SignupStatus { signup_enabled: bool },
    /// `{"ok": true}`
    Assigned { ok: bool },
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty token.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assign(user_id: &str) -> BootstrapRequest {
        BootstrapRequest::AssignAdmin {
            user_id: SubjectId::parse(user_id),
        }
    }

    #[test]
    fn status_check_flag() {
        let req = BootstrapRequest::from_json(br#"{"check_signup_enabled": true}"#);
        assert_eq!(req, BootstrapRequest::StatusCheck);
    }

    #[test]
    fn status_flag_must_be_literal_true() {
        for body in [
            &br#"{"check_signup_enabled": false}"#[..],
            br#"{"check_signup_enabled": "true"}"#,
            br#"{"check_signup_enabled": 1}"#,
        ] {
            assert_eq!(
                BootstrapRequest::from_json(body),
                BootstrapRequest::AssignAdmin { user_id: None }
            );
        }
    }

    #[test]
    fn status_check_wins_over_user_id() {
        let req =
            BootstrapRequest::from_json(br#"{"check_signup_enabled": true, "user_id": "u1"}"#);
        assert_eq!(req, BootstrapRequest::StatusCheck);
    }

    #[test]
    fn user_id_string_is_taken() {
        assert_eq!(BootstrapRequest::from_json(br#"{"user_id": "u1"}"#), assign("u1"));
    }

    #[test]
    fn malformed_user_ids_are_absent() {
        for body in [
            &br#"{}"#[..],
            br#"{"user_id": ""}"#,
            br#"{"user_id": 42}"#,
            br#"{"user_id": null}"#,
            br#"{"user_id": ["u1"]}"#,
            br"not json",
            b"",
            br#"["u1"]"#,
        ] {
            assert_eq!(
                BootstrapRequest::from_json(body),
                BootstrapRequest::AssignAdmin { user_id: None },
                "body: {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn responses_serialize_to_wire_shapes() {
        let status = serde_json::to_value(BootstrapResponse::SignupStatus {
            signup_enabled: true,
        })
        .unwrap();
        assert_eq!(status, serde_json::json!({ "signup_enabled": true }));

        let ok = serde_json::to_value(BootstrapResponse::Assigned { ok: true }).unwrap();
        assert_eq!(ok, serde_json::json!({ "ok": true }));
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token(""), None);
    }
}
