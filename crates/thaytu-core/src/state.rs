//! UI-agnostic conversation types
//!
//! These are shared by the transcript model and any surface that draws it.
//! A message is never mutated once it has been created.

/// A chat message in the conversation with the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Process-wide UI state owned by the session controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionUiState {
    pub pending: bool,
}
