//! Messaging actions. Users are nodes; a message is an edge from sender to
//! recipient carrying its content and a read flag.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use serde_json::Value;
use tracing::{debug, info};

use graphpress_db::GraphStore;
use graphpress_types::GraphId;
use graphpress_types::api::{
    FetchMessageParams, FetchMessageResponse, Inbox, InboxEntry, InboxResponse,
    MessageCountResponse, SendMessageParams, SendMessageResponse, Success,
};
use graphpress_types::models::UserNode;

use crate::error::ApiError;
use crate::middleware::Session;
use crate::state::AppState;

/// Send a message. Query: `to`, `message`.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    params: Result<Query<SendMessageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let (to, message) = validate_send(params)?;

    let from = session.node_id;
    let msg = state
        .with_store(move |store| {
            session_node(store, &session)?;
            store
                .node(&to)?
                .ok_or_else(|| ApiError::NotFound(format!("Recipient {}", to)))?;
            Ok(store.create_message(&from, &to, &message)?)
        })
        .await?;

    info!("Message {} sent {} -> {}", msg.id, msg.tail(), msg.head());

    Ok(Json(Success::new(SendMessageResponse {
        id: msg.id.to_string(),
    })))
}

/// Number of incoming messages, read or not.
// TODO: filter on is_read once clients confirm they expect only unread messages here.
pub async fn fetch_unread_message_count(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .with_store(move |store| {
            let me = session_node(store, &session)?;
            Ok(store.incoming_message_count(&me.id)?)
        })
        .await?;

    Ok(Json(Success::new(MessageCountResponse {
        count: count.to_string(),
    })))
}

pub async fn fetch_inbox(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let incoming = state
        .with_store(move |store| {
            let me = session_node(store, &session)?;
            Ok(store.incoming_messages(&me.id)?)
        })
        .await?;

    let messages = incoming
        .iter()
        .map(|m| {
            (
                m.id,
                InboxEntry {
                    from: m.tail(),
                    message: m.preview(),
                    is_read: m.is_read,
                },
            )
        })
        .collect();

    Ok(Json(Success::new(InboxResponse {
        messages: Inbox(messages),
    })))
}

/// Fetch one message sent or received by the caller and mark it read.
/// Query: `msgid`.
pub async fn fetch_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    params: Result<Query<FetchMessageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let msgid = validate_fetch(params)?;

    let reader = session.username.clone();
    let msg = state
        .with_store(move |store| {
            let me = session_node(store, &session)?;
            if !store.has_incoming_message(&me.id, &msgid)?
                && !store.has_sent_message(&me.id, &msgid)?
            {
                return Err(ApiError::UnauthorizedMessageAccess);
            }

            store.set_is_read(&msgid, true)?;
            store
                .edge(&msgid)?
                .ok_or_else(|| ApiError::NotFound(format!("Message {}", msgid)))
        })
        .await?;

    debug!("Message {} marked read by {}", msg.id, reader);

    let mut message = msg.attributes();
    message.insert("id".into(), Value::String(msg.id.to_string()));
    message.insert("from".into(), Value::String(msg.tail().to_string()));
    message.insert("to".into(), Value::String(msg.head().to_string()));

    Ok(Json(Success::new(FetchMessageResponse { message })))
}

fn session_node(store: &dyn GraphStore, session: &Session) -> Result<UserNode, ApiError> {
    store
        .node(&session.node_id)?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", session.node_id)))
}

fn validate_send(params: SendMessageParams) -> Result<(GraphId, String), ApiError> {
    let (Some(to), Some(message)) = (params.to.filter(|to| !to.is_empty()), params.message) else {
        return Err(ApiError::MissingFields(
            "Valid recipient and message are required.",
        ));
    };

    let to: GraphId = to.parse().map_err(|_| ApiError::InvalidRecipientId)?;

    if message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    Ok((to, message))
}

fn validate_fetch(params: FetchMessageParams) -> Result<GraphId, ApiError> {
    let msgid = params
        .msgid
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingFields("Valid message id required."))?;

    msgid.parse().map_err(|_| ApiError::InvalidMessageId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(to: Option<&str>, message: Option<&str>) -> Result<(GraphId, String), ApiError> {
        validate_send(SendMessageParams {
            to: to.map(String::from),
            message: message.map(String::from),
        })
    }

    #[test]
    fn send_requires_both_fields() {
        assert!(matches!(send(None, Some("hi")), Err(ApiError::MissingFields(_))));
        assert!(matches!(send(Some(&"a".repeat(32)), None), Err(ApiError::MissingFields(_))));
        assert!(matches!(send(Some(""), Some("hi")), Err(ApiError::MissingFields(_))));
    }

    #[test]
    fn send_checks_recipient_before_message() {
        assert!(matches!(send(Some("xyz"), Some("")), Err(ApiError::InvalidRecipientId)));
        assert!(matches!(send(Some(&"a".repeat(32)), Some("")), Err(ApiError::EmptyMessage)));
        assert!(matches!(send(Some(&"a".repeat(32)), Some("   ")), Err(ApiError::EmptyMessage)));
    }

    #[test]
    fn send_keeps_message_as_given() {
        let (to, message) = send(Some(&"AB".repeat(16)), Some(" hi ")).unwrap();
        assert_eq!(to.to_string(), "ab".repeat(16));
        assert_eq!(message, " hi ");
    }

    #[test]
    fn fetch_validates_msgid() {
        let fetch = |id: Option<&str>| {
            validate_fetch(FetchMessageParams {
                msgid: id.map(String::from),
            })
        };
        assert!(matches!(fetch(None), Err(ApiError::MissingFields(_))));
        assert!(matches!(fetch(Some(&"0".repeat(31))), Err(ApiError::InvalidMessageId)));
        assert!(matches!(fetch(Some(&"z".repeat(32))), Err(ApiError::InvalidMessageId)));
        assert!(fetch(Some(&"0".repeat(32))).is_ok());
    }
}
