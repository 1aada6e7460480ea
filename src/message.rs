use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-conversation ordering key, distinct from the message timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ordinal(pub u64);

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Deleted,
    Attachment,
    System,
    Placeholder,
}

impl MessageType {
    /// Whether a message of this type lets the next message from the same
    /// author continue its block without a new header.
    pub fn continues_block(self) -> bool {
        matches!(self, MessageType::Text | MessageType::Deleted)
    }
}

/// A chat message as handed to the view layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub ordinal: Ordinal,
    pub author: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default)]
    pub has_been_edited: bool,
    #[serde(default)]
    pub device_revoked_at: Option<i64>,
}

impl Message {
    pub fn new(ordinal: u64, author: impl Into<String>, timestamp: i64) -> Self {
        Self {
            ordinal: Ordinal(ordinal),
            author: author.into(),
            timestamp: Some(timestamp),
            msg_type: MessageType::Text,
            has_been_edited: false,
            device_revoked_at: None,
        }
    }

    pub fn with_type(mut self, msg_type: MessageType) -> Self {
        self.msg_type = msg_type;
        self
    }

    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = None;
        self
    }

    pub fn is_revoked(&self) -> bool {
        self.device_revoked_at.is_some()
    }
}
