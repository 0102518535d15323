//! Chat Messages
//!
//! The running transcript shown on the agent home page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown when an exchange fails before or during streaming
pub const APOLOGY: &str = "I'm sorry, I encountered an issue. Let's try again.";

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Agent reply
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the transcript
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier (list keys in the UI)
    pub id: Uuid,

    pub role: Role,

    /// Text content (markdown from the agent)
    pub content: String,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered chat history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Open an empty assistant message that fragments will be appended to
    pub fn begin_assistant(&mut self) {
        self.push(ChatMessage::assistant(""));
    }

    /// Append a streamed fragment to the trailing assistant message.
    ///
    /// Returns `false` (and changes nothing) when the last message is not
    /// from the assistant.
    pub fn append_fragment(&mut self, fragment: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content.push_str(fragment);
                true
            }
            _ => false,
        }
    }

    pub fn push_apology(&mut self) {
        self.push(ChatMessage::assistant(APOLOGY));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert_ne!(msg.id, ChatMessage::user("Hello").id);
    }

    #[test]
    fn test_fragments_need_assistant_tail() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("Hi"));
        assert!(!transcript.append_fragment("lost"));
        assert_eq!(transcript.last().unwrap().content, "Hi");

        transcript.begin_assistant();
        assert!(transcript.append_fragment("Hel"));
        assert!(transcript.append_fragment("lo"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content, "Hello");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
