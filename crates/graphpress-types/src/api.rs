use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::GraphId;

// -- JWT Claims --

/// Session token claims. `sub` is the user's node ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: GraphId,
    pub username: String,
    pub exp: usize,
}

// -- Envelopes --

/// Every successful response is `{"success": true, ...data}`.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    MissingFields,
    InvalidRecipientId,
    EmptyMessage,
    InvalidMessageId,
    UnauthorizedMessageAccess,
    NoSession,
    NotFound,
    InvalidSignup,
    InvalidCredentials,
    UsernameTaken,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingFields => "missing-fields",
            ErrorCode::InvalidRecipientId => "invalid-recipient-id",
            ErrorCode::EmptyMessage => "empty-message",
            ErrorCode::InvalidMessageId => "invalid-message-id",
            ErrorCode::UnauthorizedMessageAccess => "unauthorized-message-access",
            ErrorCode::NoSession => "no-session",
            ErrorCode::NotFound => "not-found",
            ErrorCode::InvalidSignup => "invalid-signup",
            ErrorCode::InvalidCredentials => "invalid-credentials",
            ErrorCode::UsernameTaken => "username-taken",
            ErrorCode::Internal => "internal",
        }
    }
}

/// `{"success": false, "error": <code>, "reason": <text>}`
#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub error: ErrorCode,
    pub reason: String,
}

impl Failure {
    pub fn new(error: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error,
            reason: reason.into(),
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: GraphId,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: GraphId,
    pub username: String,
    pub token: String,
}

// -- Messaging --

/// Query parameters of `/message`. Kept as raw strings so presence and
/// format can be reported separately.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageParams {
    pub to: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchMessageParams {
    pub msgid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageCountResponse {
    pub count: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxEntry {
    pub from: GraphId,
    pub message: String,
    pub is_read: bool,
}

/// Inbox keyed by message ID, serialized as a JSON object in store order.
#[derive(Debug, Default)]
pub struct Inbox(pub Vec<(GraphId, InboxEntry)>);

impl Serialize for Inbox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, entry) in &self.0 {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub messages: Inbox,
}

#[derive(Debug, Serialize)]
pub struct FetchMessageResponse {
    pub message: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_flattens_data() {
        let body = serde_json::to_value(Success::new(MessageCountResponse {
            count: "3".into(),
        }))
        .unwrap();
        assert_eq!(body, json!({ "success": true, "count": "3" }));
    }

    #[test]
    fn failure_uses_kebab_case_codes() {
        let body = serde_json::to_value(Failure::new(
            ErrorCode::UnauthorizedMessageAccess,
            "nope",
        ))
        .unwrap();
        assert_eq!(body["error"], ErrorCode::UnauthorizedMessageAccess.as_str());
        assert_eq!(body["success"], false);
    }

    #[test]
    fn inbox_keeps_insertion_order() {
        let a: GraphId = "ffffffffffffffffffffffffffffffff".parse().unwrap();
        let b: GraphId = "00000000000000000000000000000000".parse().unwrap();
        let sender = GraphId::generate();
        let entry = |m: &str| InboxEntry {
            from: sender,
            message: m.into(),
            is_read: false,
        };
        let inbox = Inbox(vec![(a, entry("first")), (b, entry("second"))]);
        let json = serde_json::to_string(&inbox).unwrap();
        assert!(json.find("ffff").unwrap() < json.find("0000").unwrap());
    }
}
