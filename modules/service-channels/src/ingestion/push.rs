//! Pub/Sub push envelope decoding.
//!
//! A push request carries a storage notification: `message.data` is the
//! base64 encoding of `{"bucket": ..., "name": ...}` and the `eventType`
//! attribute says what happened to the object. Only object creation and
//! update notifications are processed.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Event types that trigger ingestion.
pub const HANDLED_EVENT_TYPES: [&str; 2] = ["OBJECT_FINALIZE", "OBJECT_UPDATE"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushEnvelope {
    #[serde(default)]
    delivery_attempt: Option<u32>,
    message: PushMessage,
    #[serde(default)]
    subscription: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushMessage {
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    data: String,
    #[serde(default)]
    message_id: String,
    #[serde(default)]
    publish_time: String,
}

/// Object announced by a storage notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageEvent {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("error unmarshalling message: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("error decoding message data: {0}")]
    Data(#[source] base64::DecodeError),
    #[error("error unmarshalling storage event data: {0}")]
    Event(#[source] serde_json::Error),
    #[error("error decoding object name: {0}")]
    Name(#[source] std::string::FromUtf8Error),
    #[error("bucket name not found in message")]
    MissingBucket,
    #[error("object name not found in message")]
    MissingName,
}

/// Decode a push request body.
///
/// Returns `Ok(None)` for notifications whose event type is not handled; the
/// caller acknowledges those without doing anything.
///
/// # Errors
/// Returns [`IngestError`] when the envelope, its data or the notification
/// inside is malformed, or when bucket or object name is missing.
pub fn decode_push_message(body: &[u8]) -> Result<Option<StorageEvent>, IngestError> {
    let envelope: PushEnvelope = serde_json::from_slice(body).map_err(IngestError::Envelope)?;
    let message = envelope.message;

    tracing::info!(
        message_id = %message.message_id,
        publish_time = %message.publish_time,
        subscription = %envelope.subscription,
        delivery_attempt = ?envelope.delivery_attempt,
        "push message received"
    );

    let event_type = message
        .attributes
        .get("eventType")
        .map_or("", String::as_str);
    if !HANDLED_EVENT_TYPES.contains(&event_type) {
        tracing::info!(event_type, "unsupported event type, ignoring message");
        return Ok(None);
    }

    let data = STANDARD.decode(message.data.as_bytes()).map_err(IngestError::Data)?;
    let mut event: StorageEvent = serde_json::from_slice(&data).map_err(IngestError::Event)?;
    event.name = unescape_object_name(&event.name)?;

    if event.bucket.is_empty() {
        return Err(IngestError::MissingBucket);
    }
    if event.name.is_empty() {
        return Err(IngestError::MissingName);
    }
    Ok(Some(event))
}

/// Query-string unescaping: `+` is a space, `%XX` a byte.
fn unescape_object_name(name: &str) -> Result<String, IngestError> {
    urlencoding::decode(&name.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(IngestError::Name)
}
