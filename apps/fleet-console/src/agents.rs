// [[FLEET]]/apps/fleet-console/src/agents.rs
// Purpose: Agent deployment panel: agent list, lifecycle toggles and the agent edit form.
// Architecture: Domain Logic Layer
// Dependencies: parking_lot, tokio-util, chrono

use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::documents::ConfigDocument;
use crate::editor::{EditorError, JsonConfigEditor};
use crate::models::{Agent, AgentStatus, AgentTask, TaskStatus, TransitionError, TransitionReasons};
use crate::params::ParameterMap;
use crate::repository::{guarded, FleetRepository, RepositoryError};
use crate::sample::{AssignableTask, AVAILABLE_HOSTS};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to load agents: {0}")]
    LoadFailed(RepositoryError),
    #[error("Agent name is required")]
    NameRequired,
    #[error(transparent)]
    InvalidJson(#[from] EditorError),
    #[error("Agent not found: {0}")]
    NotFound(String),
    #[error("Task {0} is already assigned")]
    DuplicateTask(String),
    #[error("Task {0} is not assignable")]
    UnknownTask(String),
    #[error("Unknown host: {0}")]
    UnknownHost(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Edit form for a new or existing agent.
#[derive(Debug)]
pub struct AgentDraft {
    editing_id: Option<String>,
    pub name: String,
    pub description: String,
    config: JsonConfigEditor<Value>,
    pub memory_schema: Vec<String>,
    pub tasks: Vec<AgentTask>,
    selected_task: Option<String>,
    selected_parameters: ParameterMap<String>,
}

impl AgentDraft {
    pub fn new(invalid_json: &str) -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            description: String::new(),
            config: JsonConfigEditor::seeded(Value::Object(Default::default()))
                .with_error_message(invalid_json),
            memory_schema: Vec::new(),
            tasks: Vec::new(),
            selected_task: None,
            selected_parameters: ParameterMap::new(),
        }
    }

    pub fn edit(agent: &Agent, invalid_json: &str) -> Self {
        Self {
            editing_id: Some(agent.id.clone()),
            name: agent.name.clone(),
            description: agent.description.clone(),
            config: JsonConfigEditor::seeded(agent.config.to_value()).with_error_message(invalid_json),
            memory_schema: agent.memory_schema.clone(),
            tasks: agent.tasks.clone(),
            selected_task: None,
            selected_parameters: ParameterMap::new(),
        }
    }

    pub fn on_config_change(&mut self, text: &str) -> Result<(), EditorError> {
        self.config.on_text_change(text).map(|_| ())
    }

    pub fn config_text(&self) -> &str {
        self.config.text()
    }

    /// Append a trimmed schema name. Blank or already listed names are ignored.
    pub fn add_memory_schema(&mut self, schema: &str) -> bool {
        let schema = schema.trim();
        if schema.is_empty() || self.memory_schema.iter().any(|s| s == schema) {
            return false;
        }
        self.memory_schema.push(schema.to_string());
        true
    }

    pub fn remove_memory_schema(&mut self, schema: &str) {
        self.memory_schema.retain(|s| s != schema);
    }

    /// Pick a task to assign, loading its default parameters.
    pub fn select_task(&mut self, task_id: &str, catalog: &[AssignableTask]) {
        self.selected_task = Some(task_id.to_string());
        self.selected_parameters = catalog
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.parameters.clone())
            .unwrap_or_default();
    }

    pub fn selected_parameters(&self) -> &ParameterMap<String> {
        &self.selected_parameters
    }

    pub fn add_task_parameter(&mut self, key: &str, value: &str) -> bool {
        self.selected_parameters.add(key, value.to_string())
    }

    pub fn update_task_parameter(&mut self, key: &str, value: &str) -> bool {
        self.selected_parameters.update(key, |v| *v = value.to_string())
    }

    pub fn delete_task_parameter(&mut self, key: &str) {
        self.selected_parameters.delete(key);
    }

    /// Assign the selected task. It starts stopped on the first host with the chosen parameters.
    pub fn add_task(&mut self, catalog: &[AssignableTask]) -> Result<(), AgentError> {
        let Some(task_id) = self.selected_task.clone() else {
            return Err(AgentError::UnknownTask(String::new()));
        };
        if self.tasks.iter().any(|t| t.id == task_id) {
            return Err(AgentError::DuplicateTask(task_id));
        }
        let info = catalog
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AgentError::UnknownTask(task_id.clone()))?;

        self.tasks.push(AgentTask {
            id: task_id,
            name: info.name.clone(),
            status: TaskStatus::Stopped,
            host: AVAILABLE_HOSTS[0].to_string(),
            reason: None,
            parameters: Some(std::mem::take(&mut self.selected_parameters)),
        });
        self.selected_task = None;
        Ok(())
    }

    pub fn remove_task(&mut self, task_id: &str) {
        self.tasks.retain(|t| t.id != task_id);
    }

    pub fn set_task_host(&mut self, task_id: &str, host: &str) -> Result<(), AgentError> {
        if !AVAILABLE_HOSTS.contains(&host) {
            return Err(AgentError::UnknownHost(host.to_string()));
        }
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.host = host.to_string();
        }
        Ok(())
    }
}

/// A task entry of a submitted agent form.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskAssignment {
    pub id: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub parameters: Option<ParameterMap<String>>,
}

/// Complete agent form as submitted over HTTP. `config` is the raw editor text.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub memory_schema: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<TaskAssignment>,
}

impl AgentForm {
    /// Replay the form onto a draft through the same operations the form controls use.
    pub fn apply(self, draft: &mut AgentDraft, catalog: &[AssignableTask]) -> Result<(), AgentError> {
        draft.name = self.name;
        draft.description = self.description;
        if let Some(text) = self.config {
            // a bad buffer stays on the draft and blocks the save
            let _ = draft.on_config_change(&text);
        }

        draft.memory_schema.clear();
        for schema in &self.memory_schema {
            draft.add_memory_schema(schema);
        }

        let wanted: Vec<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        draft.tasks.retain(|t| wanted.contains(&t.id.as_str()));
        for assignment in self.tasks {
            if !draft.tasks.iter().any(|t| t.id == assignment.id) {
                draft.select_task(&assignment.id, catalog);
                if let Some(parameters) = assignment.parameters {
                    for (key, value) in parameters.iter() {
                        if !draft.update_task_parameter(key, value) {
                            draft.add_task_parameter(key, value);
                        }
                    }
                }
                draft.add_task(catalog)?;
            }
            if let Some(host) = assignment.host {
                draft.set_task_host(&assignment.id, &host)?;
            }
        }
        Ok(())
    }
}

/// `agent-` followed by unix millis in base 36. Taken stamps advance by one.
fn new_agent_id(agents: &[Agent]) -> String {
    let mut stamp = Utc::now().timestamp_millis().max(0) as u64;
    loop {
        let id = format!("agent-{}", base36(stamp));
        if agents.iter().all(|a| a.id != id) {
            return id;
        }
        stamp += 1;
    }
}

fn base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(std::char::from_digit((n % 36) as u32, 36).unwrap_or('0'));
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Agent list of the deployment panel. Empty until the first successful fetch.
pub struct AgentStore {
    agents: RwLock<Option<Vec<Agent>>>,
    last_error: RwLock<Option<String>>,
}

impl Default for AgentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentStore {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.agents.read().is_some()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Fetch once; later calls reuse the loaded list.
    pub async fn ensure_loaded(
        &self,
        repo: &dyn FleetRepository,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<Agent>, AgentError> {
        if let Some(agents) = self.agents.read().as_ref() {
            return Ok(agents.clone());
        }
        self.reload(repo, timeout, cancel).await
    }

    /// User-triggered retry: always refetches.
    pub async fn reload(
        &self,
        repo: &dyn FleetRepository,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<Agent>, AgentError> {
        match guarded(timeout, cancel, repo.fetch_agents()).await {
            Ok(agents) => {
                tracing::info!("Loaded {} agents", agents.len());
                *self.agents.write() = Some(agents.clone());
                *self.last_error.write() = None;
                Ok(agents)
            }
            Err(e) => {
                tracing::warn!("Agent fetch failed: {}", e);
                *self.last_error.write() = Some(e.to_string());
                Err(AgentError::LoadFailed(e))
            }
        }
    }

    pub fn list(&self) -> Vec<Agent> {
        self.agents.read().clone().unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<Agent> {
        self.agents
            .read()
            .as_ref()
            .and_then(|agents| agents.iter().find(|a| a.id == id).cloned())
    }

    pub fn draft(&self, id: &str, invalid_json: &str) -> Result<AgentDraft, AgentError> {
        let agent = self.get(id).ok_or_else(|| AgentError::NotFound(id.to_string()))?;
        Ok(AgentDraft::edit(&agent, invalid_json))
    }

    /// JSON errors block first, then a missing name. Edits keep id and current status.
    ///
    /// The status is read under the write lock, so a draft taken before a disable still
    /// lands with every task stopped.
    pub fn save(
        &self,
        draft: &AgentDraft,
        reasons: &TransitionReasons,
    ) -> Result<Agent, AgentError> {
        let config = draft.config.submit()?;
        if draft.name.is_empty() {
            tracing::warn!("Rejected agent save: missing name");
            return Err(AgentError::NameRequired);
        }

        let mut guard = self.agents.write();
        let agents = guard.get_or_insert_with(Vec::new);
        match draft.editing_id.as_deref() {
            Some(id) => {
                let agent = agents
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| AgentError::NotFound(id.to_string()))?;
                agent.name = draft.name.clone();
                agent.description = draft.description.clone();
                agent.tasks = draft.tasks.clone();
                agent.config = ConfigDocument::from(config);
                agent.memory_schema = draft.memory_schema.clone();
                agent.stop_tasks_if_disabled(reasons);
                tracing::info!("Updated agent {}", id);
                Ok(agent.clone())
            }
            None => {
                let mut agent = Agent {
                    id: new_agent_id(agents),
                    name: draft.name.clone(),
                    description: draft.description.clone(),
                    status: AgentStatus::Disabled,
                    tasks: draft.tasks.clone(),
                    config: ConfigDocument::from(config),
                    memory_schema: draft.memory_schema.clone(),
                };
                agent.stop_tasks_if_disabled(reasons);
                tracing::info!("Created agent {} ({})", agent.id, agent.name);
                agents.push(agent.clone());
                Ok(agent)
            }
        }
    }

    pub fn delete(&self, id: &str) -> Result<(), AgentError> {
        let mut guard = self.agents.write();
        let agents = guard.get_or_insert_with(Vec::new);
        let before = agents.len();
        agents.retain(|a| a.id != id);
        if agents.len() == before {
            return Err(AgentError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted agent {}", id);
        Ok(())
    }

    pub fn toggle_agent(&self, id: &str, reasons: &TransitionReasons) -> Result<Agent, AgentError> {
        self.with_agent(id, |agent| {
            let status = agent.toggle_status(reasons);
            tracing::info!("Agent {} is now {:?}", agent.id, status);
            Ok(())
        })
    }

    pub fn toggle_task(
        &self,
        agent_id: &str,
        task_id: &str,
        reasons: &TransitionReasons,
    ) -> Result<Agent, AgentError> {
        self.with_agent(agent_id, |agent| {
            match agent.toggle_task(task_id, reasons) {
                Ok(status) => {
                    tracing::info!("Task {} on {} is now {:?}", task_id, agent.id, status);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Rejected task toggle: {}", e);
                    Err(e.into())
                }
            }
        })
    }

    fn with_agent<F>(&self, id: &str, apply: F) -> Result<Agent, AgentError>
    where
        F: FnOnce(&mut Agent) -> Result<(), AgentError>,
    {
        let mut guard = self.agents.write();
        let agent = guard
            .as_mut()
            .and_then(|agents| agents.iter_mut().find(|a| a.id == id))
            .ok_or_else(|| AgentError::NotFound(id.to_string()))?;
        apply(agent)?;
        Ok(agent.clone())
    }
}
