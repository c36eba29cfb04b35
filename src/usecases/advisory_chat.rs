//! Consultant chat transcript. The advisor is stateless; history lives here.

use crate::ports::AdvisorPort;
use std::sync::Arc;
use tracing::debug;

pub const GREETING: &str = "Namaste! I'm ReVibe, your personal e-waste consultant. How can I help you be more circular today? ♻️";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    fn bot(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            text: text.into(),
        }
    }
}

pub struct ChatSession {
    advisor: Arc<dyn AdvisorPort>,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(advisor: Arc<dyn AdvisorPort>) -> Self {
        Self {
            advisor,
            transcript: vec![ChatMessage::bot(GREETING)],
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Append the user's message and the advisor's reply. Blank input is ignored.
    /// Returns the reply, if one was requested.
    pub async fn send(&mut self, text: &str) -> Option<String> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            text: query.to_string(),
        });

        let reply = self.advisor.quick_advice(query).await;
        debug!(reply_len = reply.len(), turns = self.transcript.len(), "advisor replied");
        self.transcript.push(ChatMessage::bot(reply.clone()));
        Some(reply)
    }

    /// Reset to the greeting.
    pub fn clear(&mut self) {
        self.transcript = vec![ChatMessage::bot(GREETING)];
    }
}
