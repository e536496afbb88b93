//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// User identifier value object.
///
/// Identifies a marketplace account (member, coach or operator). The same
/// identity may hold one live connection per role at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId.
    ///
    /// # Returns
    ///
    /// A Result containing the UserId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::UserIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection role.
///
/// A registration is keyed by `(UserId, Role)`; the hub never infers a role
/// from an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Coach,
    Operator,
}

impl Role {
    /// Get the role name as used in wire events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Coach => "coach",
            Role::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection identifier value object.
///
/// One per accepted WebSocket transport; this is the "connection ref" that
/// video-call peers address signals to. A reconnect always produces a new
/// ConnectionId, the old one is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Generate a fresh ConnectionId (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a ConnectionId from its string form.
    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        uuid::Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValueObjectError::ConnectionIdInvalidFormat(value.to_string()))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session identifier value object.
///
/// Identifies a booked coaching session; the video room for a session
/// shares its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId.
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::SessionIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::SessionIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name value object.
///
/// Shown to other call participants; carried verbatim in `user-joined`
/// fan-out events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a new DisplayName.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        let len = name.len();
        if len > 100 {
            return Err(ValueObjectError::DisplayNameTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Get the inner millisecond value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Opaque session-description payload (offer / answer / ICE blob).
///
/// The hub relays these verbatim and never inspects or mutates them; any
/// valid JSON value is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPayload(serde_json::Value);

impl SignalPayload {
    /// Wrap a raw JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Get the inner JSON value.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Chat message body: plain text or a reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MessageBody {
    Text { text: String },
    Image { image_ref: String },
}

impl MessageBody {
    /// Create a text body.
    pub fn text(text: String) -> Result<Self, ValueObjectError> {
        if text.is_empty() {
            return Err(ValueObjectError::MessageBodyEmpty);
        }
        let len = text.len();
        if len > 10000 {
            return Err(ValueObjectError::MessageBodyTooLong {
                max: 10000,
                actual: len,
            });
        }
        Ok(Self::Text { text })
    }

    /// Create an image-reference body.
    pub fn image(image_ref: String) -> Result<Self, ValueObjectError> {
        if image_ref.is_empty() {
            return Err(ValueObjectError::MessageBodyEmpty);
        }
        Ok(Self::Image { image_ref })
    }

    /// Validate a body that arrived already shaped (e.g. deserialized from
    /// the wire).
    pub fn validate(self) -> Result<Self, ValueObjectError> {
        match self {
            Self::Text { text } => Self::text(text),
            Self::Image { image_ref } => Self::image(image_ref),
        }
    }
}
