// [[FLEET]]/apps/fleet-console/src/chat.rs
// Purpose: Copilot chat: per-agent conversations with a simulated agent reply.
// Architecture: Domain Logic Layer
// Dependencies: DashMap, chrono, uuid

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::locale::I18n;
use crate::repository::{guarded, FleetRepository, RepositoryError};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChatError {
    #[error("No agent selected")]
    NoAgent,
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
    #[error("Message is empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            sender,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Default)]
pub struct ChatStore {
    conversations: DashMap<String, Vec<ChatMessage>>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, agent_id: &str) -> Vec<ChatMessage> {
        self.conversations
            .get(agent_id)
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }

    /// Append the user's message. `known` tells whether `agent_id` names an existing agent.
    pub fn send(&self, agent_id: &str, known: bool, text: &str) -> Result<ChatMessage, ChatError> {
        if agent_id.is_empty() {
            return Err(ChatError::NoAgent);
        }
        if !known {
            return Err(ChatError::UnknownAgent(agent_id.to_string()));
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let message = ChatMessage::new(Sender::User, text.to_string());
        self.conversations
            .entry(agent_id.to_string())
            .or_default()
            .push(message.clone());
        tracing::debug!("Chat message to {}", agent_id);
        Ok(message)
    }

    pub fn append_reply(&self, agent_id: &str, content: String) -> ChatMessage {
        let message = ChatMessage::new(Sender::Agent, content);
        self.conversations
            .entry(agent_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }
}

/// Wait for the simulated backend, then build the localized canned answer.
pub async fn simulated_reply(
    repo: &dyn FleetRepository,
    agent_name: &str,
    text: &str,
    i18n: &I18n,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String, RepositoryError> {
    guarded(timeout, cancel, repo.agent_reply(agent_name, text)).await?;
    Ok(i18n.t_with("copilot.simulatedResponse", &[("agent", agent_name)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::MemoryPreferenceStore;
    use crate::repository::SimulatedRepository;
    use std::sync::Arc;

    #[test]
    fn test_send_guards() {
        let store = ChatStore::new();
        assert_eq!(store.send("", true, "hi"), Err(ChatError::NoAgent));
        assert_eq!(store.send("agent-404", false, "hi"), Err(ChatError::UnknownAgent("agent-404".to_string())));
        assert_eq!(store.send("agent-001", true, "   "), Err(ChatError::EmptyMessage));
        assert!(store.messages("agent-001").is_empty());

        let sent = store.send("agent-001", true, "status?").unwrap();
        assert_eq!(sent.sender, Sender::User);
        assert_eq!(store.messages("agent-001"), vec![sent]);
        assert!(store.messages("agent-002").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_after_delay() {
        let repo = SimulatedRepository::new(Duration::from_millis(1000));
        let i18n = I18n::restore(Arc::new(MemoryPreferenceStore::new()));
        let store = ChatStore::new();
        store.send("agent-001", true, "hello").unwrap();

        let content = simulated_reply(&repo, "Video Surveillance Agent", "hello", &i18n, Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        store.append_reply("agent-001", content);

        let messages = store.messages("agent-001");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Agent);
        assert!(messages[1]
            .content
            .starts_with("This is a simulated response from Video Surveillance Agent."));
    }
}
