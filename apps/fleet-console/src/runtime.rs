// [[FLEET]]/apps/fleet-console/src/runtime.rs
// Purpose: Shared console state. Owns every panel store, the locale and the event bus.
// Architecture: Domain Logic Layer
// Dependencies: tokio, tokio-util, parking_lot, rand

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::agents::{AgentError, AgentStore};
use crate::chat::{self, ChatError, ChatMessage, ChatStore};
use crate::config::ConsoleConfig;
use crate::events::{EventType, FleetEvent};
use crate::locale::{I18n, PreferenceStore};
use crate::models::{Agent, TransitionReasons};
use crate::monitoring::{self, LogEntry, LogQuery};
use crate::repository::FleetRepository;
use crate::runtime_config::RuntimeConfigStore;
use crate::sample;
use crate::shell::{SettingsDrawer, SidebarState};
use crate::tasks::TaskTemplateStore;

pub struct FleetRuntime {
    pub config: ConsoleConfig,
    pub i18n: I18n,
    repository: Arc<dyn FleetRepository>,
    pub tasks: TaskTemplateStore,
    pub agents: AgentStore,
    pub runtime_config: RuntimeConfigStore,
    pub chat: ChatStore,
    logs: Vec<LogEntry>,
    pub sidebar: RwLock<SidebarState>,
    pub settings: RwLock<SettingsDrawer>,
    pub event_bus: broadcast::Sender<FleetEvent>,
    shutdown: CancellationToken,
}

impl FleetRuntime {
    pub fn new(
        config: ConsoleConfig,
        preferences: Arc<dyn PreferenceStore>,
        repository: Arc<dyn FleetRepository>,
    ) -> Self {
        let (tx, _) = broadcast::channel(100);
        let logs = monitoring::generate_logs(config.log_count, Utc::now(), &mut rand::thread_rng());
        tracing::debug!("Generated {} monitoring log entries", logs.len());

        FleetRuntime {
            i18n: I18n::restore(preferences),
            repository,
            tasks: TaskTemplateStore::new(sample::task_templates()),
            agents: AgentStore::new(),
            runtime_config: RuntimeConfigStore::new(sample::runtime_config()),
            chat: ChatStore::new(),
            logs,
            sidebar: RwLock::new(SidebarState::default()),
            settings: RwLock::new(SettingsDrawer::default()),
            event_bus: tx,
            shutdown: CancellationToken::new(),
            config,
        }
    }

    // === EVENT EMISSION ===

    pub(crate) fn emit_event(&self, event_type: EventType, subject_id: Option<&str>, payload: serde_json::Value) {
        // no subscribers is fine
        let _ = self
            .event_bus
            .send(FleetEvent::new(event_type, subject_id.map(str::to_string), payload));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.event_bus.subscribe()
    }

    // === SHARED CONTEXT ===

    pub fn repository(&self) -> &dyn FleetRepository {
        self.repository.as_ref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }

    /// Cancelled on shutdown; in-flight backend calls resolve as `Cancelled`.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn shutdown(&self) {
        tracing::info!("Cancelling in-flight requests");
        self.shutdown.cancel();
    }

    pub fn invalid_json(&self) -> String {
        self.i18n.t("common.invalidJson")
    }

    pub fn transition_reasons(&self) -> TransitionReasons {
        TransitionReasons {
            stopped: self.i18n.t("agentDeployment.reason.stopped"),
            running: self.i18n.t("agentDeployment.reason.completed"),
        }
    }

    // === PANEL HELPERS ===

    pub async fn load_agents(&self) -> Result<Vec<Agent>, AgentError> {
        self.agents
            .ensure_loaded(self.repository(), self.request_timeout(), self.cancel_token())
            .await
    }

    pub async fn reload_agents(&self) -> Result<Vec<Agent>, AgentError> {
        self.agents
            .reload(self.repository(), self.request_timeout(), self.cancel_token())
            .await
    }

    pub fn logs(&self, query: &LogQuery) -> Vec<LogEntry> {
        monitoring::query_logs(&self.logs, query)
    }

    /// Record the user's message now and deliver the agent's reply in the background.
    pub async fn send_chat(self: &Arc<Self>, agent_id: &str, text: &str) -> Result<ChatMessage, ChatSendError> {
        let agents = self.load_agents().await?;
        let agent = agents.iter().find(|a| a.id == agent_id);
        let message = self.chat.send(agent_id, agent.is_some(), text)?;
        self.emit_event(EventType::ChatMessage, Some(agent_id), json!(message));

        let agent_name = agent.map(|a| a.name.clone()).unwrap_or_else(|| "Agent".to_string());
        let runtime = Arc::clone(self);
        let agent_id = agent_id.to_string();
        let text = text.to_string();
        tokio::spawn(async move {
            let reply = chat::simulated_reply(
                runtime.repository(),
                &agent_name,
                &text,
                &runtime.i18n,
                runtime.request_timeout(),
                runtime.cancel_token(),
            )
            .await;
            match reply {
                Ok(content) => {
                    let message = runtime.chat.append_reply(&agent_id, content);
                    runtime.emit_event(EventType::ChatMessage, Some(&agent_id), json!(message));
                }
                Err(e) => tracing::warn!("No reply from {}: {}", agent_name, e),
            }
        });

        Ok(message)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Arc<Self> {
        use crate::locale::MemoryPreferenceStore;
        use crate::repository::SimulatedRepository;

        let config = ConsoleConfig {
            simulated_latency: Duration::from_millis(10),
            ..ConsoleConfig::default()
        };
        let repo = Arc::new(SimulatedRepository::new(config.simulated_latency));
        Arc::new(FleetRuntime::new(config, Arc::new(MemoryPreferenceStore::new()), repo))
    }
}

/// Chat failures: either the agent list could not be loaded or the message was refused.
#[derive(Debug, thiserror::Error)]
pub enum ChatSendError {
    #[error(transparent)]
    Agents(#[from] AgentError),
    #[error(transparent)]
    Chat(#[from] ChatError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;

    fn test_runtime() -> Arc<FleetRuntime> {
        FleetRuntime::for_tests()
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_reply_arrives_later() {
        let runtime = test_runtime();
        let mut events = runtime.subscribe();

        runtime.send_chat("agent-003", "any anomalies?").await.unwrap();
        assert_eq!(runtime.chat.messages("agent-003").len(), 1);

        let first = events.recv().await.unwrap();
        assert_eq!(first.event_type, EventType::ChatMessage);
        let second = events.recv().await.unwrap();
        assert_eq!(second.subject_id.as_deref(), Some("agent-003"));

        let messages = runtime.chat.messages("agent-003");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Agent);
        assert!(messages[1].content.contains("Anomaly Detection Agent"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_reply() {
        let runtime = test_runtime();
        runtime.send_chat("agent-001", "hello").await.unwrap();
        runtime.shutdown();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runtime.chat.messages("agent-001").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_rejects_unknown_agent() {
        let runtime = test_runtime();
        assert!(matches!(
            runtime.send_chat("agent-404", "hi").await,
            Err(ChatSendError::Chat(ChatError::UnknownAgent(_)))
        ));
    }

    #[test]
    fn test_reasons_are_localized() {
        let runtime = test_runtime();
        let reasons = runtime.transition_reasons();
        assert_eq!(reasons.stopped, "Stopped");
        assert_eq!(reasons.running, "Running normally");
        assert_eq!(runtime.logs(&LogQuery::default()).len(), 50);
    }
}
