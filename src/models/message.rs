use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One conversation turn, in the wire shape of the completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: String) -> Self {
        ChatMessage {
            role: MessageRole::System,
            content,
        }
    }

    pub fn user(content: String) -> Self {
        ChatMessage {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(content: String) -> Self {
        ChatMessage {
            role: MessageRole::Assistant,
            content,
        }
    }
}
