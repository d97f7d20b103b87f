//! Chat message payload carried in `SEND` and `MESSAGE` bodies.
//!
//! Messages travel as JSON objects with Pascal-cased keys:
//!
//! ```json
//! {"Id":"…","User":"alice","Text":"hi","Timestamp":"2024-01-01T00:00:00Z"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User name reserved for messages generated by the system rather than a
/// person.
pub const SYSTEM_USER: &str = "System";

/// A chat message.
///
/// Constructed once and never mutated; received messages are rebuilt from
/// the frame body.
///
/// # Examples
///
/// ```
/// use stompframe::message::ChatMessage;
///
/// let message = ChatMessage::new("alice", "hi");
/// assert_eq!(message.user, "alice");
/// assert!(!message.is_system());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatMessage {
    /// Unique identifier, a UUID in string form.
    #[serde(default)]
    pub id: String,
    /// Display name of the author.
    #[serde(default)]
    pub user: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Creation time in UTC; the Unix epoch when the sender omitted it.
    #[serde(with = "timestamp", default = "timestamp::unset")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with a fresh UUID and the current time.
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: user.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the message was authored by [`SYSTEM_USER`].
    #[must_use]
    pub fn is_system(&self) -> bool { self.user == SYSTEM_USER }
}

/// Serde adapter for ISO-8601 timestamps.
///
/// Serialises as RFC 3339 with a `Z` suffix. Deserialisation also accepts a
/// date-time without offset and reads it as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn unset() -> DateTime<Utc> { DateTime::<Utc>::UNIX_EPOCH }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|err| D::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
    }
}
