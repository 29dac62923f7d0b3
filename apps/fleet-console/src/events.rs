// [[FLEET]]/apps/fleet-console/src/events.rs
// Purpose: Events broadcast to WebSocket subscribers whenever fleet state changes.
// Architecture: Domain Event Layer
// Dependencies: Serde, Chrono, Uuid

use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::Utc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    /// A task template was created, renamed, saved or imported
    TemplateSaved,
    /// One or more templates were removed
    TemplatesDeleted,
    /// An agent was created or edited
    AgentSaved,
    AgentDeleted,
    /// Agent flipped between active and disabled
    AgentStatusChanged,
    /// A task on an agent was started or stopped
    TaskStatusChanged,
    /// Engines, video sources or storage changed
    RuntimeConfigChanged,
    LocaleChanged,
    /// A chat message (user or simulated agent) was appended
    ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetEvent {
    pub id: String,
    pub event_type: EventType,
    pub subject_id: Option<String>,
    pub timestamp: String,
    pub payload: Value,
}

impl FleetEvent {
    pub fn new(event_type: EventType, subject_id: Option<String>, payload: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            subject_id,
            timestamp: Utc::now().to_rfc3339(),
            payload,
        }
    }
}
