use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::documents::{ConfigDocument, ConfigKind};
use crate::params::{ParameterMap, ParameterValue};

// === TASK TEMPLATES ===

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Monitor,
    Ingest,
    Analyze,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskCategory {
    #[default]
    #[serde(rename = "routine")]
    Routine,
    #[serde(rename = "one-time")]
    OneTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
    Datetime,
    Json,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskParameter {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl TaskParameter {
    pub fn new(kind: ParameterType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            default_value: Some(String::new()),
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

impl ParameterValue for TaskParameter {
    fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }

    fn normalized(mut self) -> Self {
        self.description = self.description.trim().to_string();
        self
    }
}

/// A single-field change to a template parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ParameterField {
    Type(ParameterType),
    Description(String),
    DefaultValue(String),
}

impl ParameterField {
    pub fn apply(self, param: &mut TaskParameter) {
        match self {
            ParameterField::Type(kind) => param.kind = kind,
            ParameterField::Description(description) => param.description = description,
            ParameterField::DefaultValue(value) => param.default_value = Some(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub description: String,
    /// JSON document kept as text, exactly as last validated.
    pub specification: String,
    pub parameters: ParameterMap<TaskParameter>,
}

impl TaskSpec {
    /// Specification text of a fresh template.
    pub fn blank_specification() -> String {
        serde_json::to_string_pretty(&serde_json::json!({ "rules": [], "actions": [] }))
            .unwrap_or_else(|_| "{}".to_string())
    }

    pub fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            task_type: TaskType::Monitor,
            category: TaskCategory::Routine,
            description: String::new(),
            specification: Self::blank_specification(),
            parameters: ParameterMap::new(),
        }
    }
}

// === AGENTS ===

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Stopped,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentTask {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterMap<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: AgentStatus,
    pub tasks: Vec<AgentTask>,
    pub config: ConfigDocument,
    pub memory_schema: Vec<String>,
}

/// Reason strings written by user-driven transitions (already localized).
#[derive(Debug, Clone)]
pub struct TransitionReasons {
    pub stopped: String,
    pub running: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Agent {0} is disabled")]
    AgentDisabled(String),
    #[error("Task {0} is in error state")]
    TaskInError(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

impl Agent {
    /// Flip `active ⇄ disabled`.
    ///
    /// Disabling stops every task and stamps the stopped reason; enabling leaves tasks alone.
    pub fn toggle_status(&mut self, reasons: &TransitionReasons) -> AgentStatus {
        match self.status {
            AgentStatus::Active => {
                self.status = AgentStatus::Disabled;
                for task in &mut self.tasks {
                    task.status = TaskStatus::Stopped;
                    task.reason = Some(reasons.stopped.clone());
                }
            }
            AgentStatus::Disabled => {
                self.status = AgentStatus::Active;
            }
        }
        self.status
    }

    /// A disabled agent runs nothing: any task not already stopped is stopped with the reason.
    pub fn stop_tasks_if_disabled(&mut self, reasons: &TransitionReasons) {
        if self.status != AgentStatus::Disabled {
            return;
        }
        for task in self.tasks.iter_mut().filter(|t| t.status != TaskStatus::Stopped) {
            task.status = TaskStatus::Stopped;
            task.reason = Some(reasons.stopped.clone());
        }
    }

    /// Flip a task between `running` and `stopped`.
    ///
    /// Rejected without touching state while the agent is disabled or the task is in `error`.
    pub fn toggle_task(
        &mut self,
        task_id: &str,
        reasons: &TransitionReasons,
    ) -> Result<TaskStatus, TransitionError> {
        if self.status == AgentStatus::Disabled {
            return Err(TransitionError::AgentDisabled(self.id.clone()));
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| TransitionError::TaskNotFound(task_id.to_string()))?;

        let (status, reason) = match task.status {
            TaskStatus::Error => return Err(TransitionError::TaskInError(task.id.clone())),
            TaskStatus::Running => (TaskStatus::Stopped, &reasons.stopped),
            TaskStatus::Stopped => (TaskStatus::Running, &reasons.running),
        };
        task.status = status;
        task.reason = Some(reason.clone());
        Ok(status)
    }
}

// === RUNTIME CONFIGURATION ===

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Connected,
    Disconnected,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    #[default]
    Vsi,
    Modelplus,
    Roboflow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskEngine {
    pub hostname: String,
    pub ip: String,
    #[serde(default)]
    pub status: EngineStatus,
    #[serde(rename = "type")]
    pub engine_type: EngineType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoSourceType {
    Camera,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoSource {
    pub id: String,
    pub uri: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<VideoSourceType>,
    #[serde(default)]
    pub ingestion_config: ConfigDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StorageConfig {
    pub db_config: ConfigDocument,
    pub oss_config: ConfigDocument,
    pub redis_config: ConfigDocument,
}

impl StorageConfig {
    pub fn classified(self) -> Self {
        Self {
            db_config: self.db_config.reclassify(ConfigKind::Db),
            oss_config: self.oss_config.reclassify(ConfigKind::Oss),
            redis_config: self.redis_config.reclassify(ConfigKind::Redis),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogModel {
    pub name: String,
    pub config: ConfigDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogConfig {
    pub llm_model: String,
    pub llm_config: ConfigDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<DialogModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub config: ConfigDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub description: String,
    pub config: ConfigDocument,
}

/// One nested document; no referential integrity between its parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRuntimeConfig {
    pub engines: Vec<TaskEngine>,
    pub storage: StorageConfig,
    pub dialog: DialogConfig,
    pub video_sources: Vec<VideoSource>,
    pub models: Vec<ModelEntry>,
    pub tools: Vec<Tool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reasons() -> TransitionReasons {
        TransitionReasons {
            stopped: "Stopped".to_string(),
            running: "Running normally".to_string(),
        }
    }

    fn agent(status: AgentStatus, tasks: Vec<(&str, TaskStatus, &str)>) -> Agent {
        Agent {
            id: "agent-001".to_string(),
            name: "Video Surveillance Agent".to_string(),
            description: String::new(),
            status,
            tasks: tasks
                .into_iter()
                .map(|(id, status, host)| AgentTask {
                    id: id.to_string(),
                    name: id.to_string(),
                    status,
                    host: host.to_string(),
                    reason: None,
                    parameters: None,
                })
                .collect(),
            config: ConfigDocument::default(),
            memory_schema: vec![],
        }
    }

    #[test]
    fn test_disable_cascades_stop() {
        let mut a = agent(
            AgentStatus::Active,
            vec![
                ("task-1", TaskStatus::Running, "engine-01"),
                ("task-7", TaskStatus::Error, "engine-03"),
            ],
        );
        assert_eq!(a.toggle_status(&reasons()), AgentStatus::Disabled);
        for (task, host) in a.tasks.iter().zip(["engine-01", "engine-03"]) {
            assert_eq!(task.status, TaskStatus::Stopped);
            assert_eq!(task.reason.as_deref(), Some("Stopped"));
            assert_eq!(task.host, host);
        }
        assert_eq!(a.tasks[0].id, "task-1");
    }

    #[test]
    fn test_enable_does_not_restart_tasks() {
        let mut a = agent(AgentStatus::Disabled, vec![("task-3", TaskStatus::Stopped, "engine-01")]);
        assert_eq!(a.toggle_status(&reasons()), AgentStatus::Active);
        assert_eq!(a.tasks[0].status, TaskStatus::Stopped);
        assert!(a.tasks[0].reason.is_none());
    }

    #[test]
    fn test_toggle_task_guards() {
        let mut disabled = agent(AgentStatus::Disabled, vec![("task-3", TaskStatus::Stopped, "h")]);
        let before = disabled.clone();
        assert_eq!(
            disabled.toggle_task("task-3", &reasons()),
            Err(TransitionError::AgentDisabled("agent-001".to_string()))
        );
        assert_eq!(disabled, before);

        let mut active = agent(AgentStatus::Active, vec![("task-7", TaskStatus::Error, "h")]);
        let before = active.clone();
        assert!(matches!(
            active.toggle_task("task-7", &reasons()),
            Err(TransitionError::TaskInError(_))
        ));
        assert_eq!(active, before);
    }

    #[test]
    fn test_toggle_task_flips_and_sets_reason() {
        let mut a = agent(AgentStatus::Active, vec![("task-2", TaskStatus::Stopped, "engine-02")]);
        assert_eq!(a.toggle_task("task-2", &reasons()), Ok(TaskStatus::Running));
        assert_eq!(a.tasks[0].reason.as_deref(), Some("Running normally"));
        assert_eq!(a.toggle_task("task-2", &reasons()), Ok(TaskStatus::Stopped));
        assert_eq!(a.tasks[0].reason.as_deref(), Some("Stopped"));
        assert!(matches!(
            a.toggle_task("nope", &reasons()),
            Err(TransitionError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_wire_names() {
        let spec = TaskSpec {
            category: TaskCategory::OneTime,
            ..TaskSpec::blank()
        };
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["type"], json!("monitor"));
        assert_eq!(v["category"], json!("one-time"));
        assert!(v.get("id").is_none());

        let p = TaskParameter::new(ParameterType::Int, "Timeout").with_default("30");
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"type": "int", "description": "Timeout", "defaultValue": "30"})
        );
    }

    #[test]
    fn test_parameter_field_merges_single_field() {
        let mut p = TaskParameter::new(ParameterType::Int, "Retries").with_default("3");
        ParameterField::Type(ParameterType::Float).apply(&mut p);
        assert_eq!(p.kind, ParameterType::Float);
        assert_eq!(p.description, "Retries");
        assert_eq!(p.default_value.as_deref(), Some("3"));
    }
}
