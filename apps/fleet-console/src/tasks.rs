// [[FLEET]]/apps/fleet-console/src/tasks.rs
// Purpose: Task template store (task editor + task management panels).
// Architecture: Domain Logic Layer
// Dependencies: parking_lot, chrono, serde_json

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::editor::{EditorError, JsonConfigEditor};
use crate::models::{ParameterField, ParameterType, TaskCategory, TaskParameter, TaskSpec, TaskType};
use crate::params::ParameterMap;
use crate::transfer::{self, ExportedTemplate, TransferError};

/// Selecting this id in the editor starts a blank template.
pub const NEW_TEMPLATE: &str = "new";

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Template name is required")]
    NameRequired,
    #[error(transparent)]
    InvalidJson(#[from] EditorError),
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("Parameter {0:?} needs a unique key and a description")]
    InvalidParameter(String),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Form state of the task editor for one template.
#[derive(Debug)]
pub struct TaskDraft {
    /// `None` for a template that has not been saved yet.
    pub selected_id: Option<String>,
    pub spec: TaskSpec,
    specification: JsonConfigEditor<Value>,
}

impl TaskDraft {
    fn from_spec(selected_id: Option<String>, spec: TaskSpec, invalid_json: &str) -> Self {
        let seed = serde_json::from_str(&spec.specification)
            .unwrap_or_else(|_| Value::Object(Default::default()));
        let mut specification = JsonConfigEditor::seeded(seed).with_error_message(invalid_json);
        // keep the stored text as the buffer, not a re-rendering of it
        let _ = specification.on_text_change(&spec.specification);
        Self {
            selected_id,
            spec,
            specification,
        }
    }

    pub fn blank(invalid_json: &str) -> Self {
        Self::from_spec(None, TaskSpec::blank(), invalid_json)
    }

    /// Load an imported template. It is not bound to a stored one until saved.
    pub fn imported(spec: TaskSpec, invalid_json: &str) -> Self {
        Self::from_spec(None, spec, invalid_json)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.spec.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.spec.description = description.into();
    }

    pub fn set_type(&mut self, task_type: TaskType) {
        self.spec.task_type = task_type;
    }

    pub fn set_category(&mut self, category: TaskCategory) {
        self.spec.category = category;
    }

    /// Edit the specification text. Only valid JSON reaches `spec.specification`.
    pub fn on_specification_change(&mut self, text: &str) -> Result<(), EditorError> {
        self.specification.on_text_change(text)?;
        self.spec.specification = self.specification.committed_text().to_string();
        Ok(())
    }

    pub fn specification_error(&self) -> Option<&str> {
        self.specification.error()
    }

    pub fn can_save(&self) -> bool {
        self.specification.can_submit()
    }

    pub fn add_parameter(&mut self, key: &str, kind: ParameterType, description: &str) -> bool {
        self.spec
            .parameters
            .add(key, TaskParameter::new(kind, description))
    }

    pub fn update_parameter(&mut self, key: &str, field: ParameterField) -> bool {
        self.spec.parameters.update(key, |p| field.apply(p))
    }

    pub fn delete_parameter(&mut self, key: &str) {
        self.spec.parameters.delete(key);
    }
}

/// Task editor form as submitted over HTTP. `specification` is the raw editor text.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskForm {
    /// Stored template id, or absent / `"new"` for a fresh one.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub parameters: Option<ParameterMap<TaskParameter>>,
}

impl TaskForm {
    pub fn selection(&self) -> &str {
        self.id.as_deref().unwrap_or(NEW_TEMPLATE)
    }

    /// Replay the form onto a draft. Parameters go through the same `add` rules as the editor.
    pub fn apply(self, draft: &mut TaskDraft) -> Result<(), TaskError> {
        draft.set_name(self.name);
        draft.set_description(self.description);
        draft.set_type(self.task_type);
        draft.set_category(self.category);
        if let Some(text) = self.specification {
            // a bad buffer stays on the draft and blocks the save
            let _ = draft.on_specification_change(&text);
        }
        if let Some(parameters) = self.parameters {
            draft.spec.parameters.clear();
            for (key, param) in parameters {
                if !draft.spec.parameters.add(&key, param) {
                    tracing::warn!("Rejected template parameter {:?}", key);
                    return Err(TaskError::InvalidParameter(key));
                }
            }
        }
        Ok(())
    }
}

/// Checkbox selection in the task management table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSelection {
    ids: BTreeSet<String>,
}

impl TaskSelection {
    pub fn of<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Everything selected -> clear, otherwise select every id.
    pub fn toggle_all(&mut self, all_ids: &[String]) {
        if self.ids.len() == all_ids.len() {
            self.ids.clear();
        } else {
            self.ids = all_ids.iter().cloned().collect();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub struct TaskTemplateStore {
    templates: RwLock<Vec<TaskSpec>>,
}

impl TaskTemplateStore {
    pub fn new(seed: Vec<TaskSpec>) -> Self {
        Self {
            templates: RwLock::new(seed),
        }
    }

    pub fn list(&self) -> Vec<TaskSpec> {
        self.templates.read().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.templates.read().iter().filter_map(|t| t.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<TaskSpec> {
        self.templates
            .read()
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
    }

    /// Editor dropdown: `"new"` starts a blank draft, anything else loads a copy.
    pub fn draft(&self, selection: &str, invalid_json: &str) -> Result<TaskDraft, TaskError> {
        if selection == NEW_TEMPLATE {
            return Ok(TaskDraft::blank(invalid_json));
        }
        let spec = self
            .get(selection)
            .ok_or_else(|| TaskError::NotFound(selection.to_string()))?;
        Ok(TaskDraft::from_spec(Some(selection.to_string()), spec, invalid_json))
    }

    /// Persist a draft. Unsaved drafts get the next `task-N` id; saved ones replace in place.
    pub fn save(&self, draft: &mut TaskDraft) -> Result<TaskSpec, TaskError> {
        draft.specification.submit()?;
        if draft.spec.name.is_empty() {
            tracing::warn!("Rejected template save: missing name");
            return Err(TaskError::NameRequired);
        }

        let mut templates = self.templates.write();
        match draft.selected_id.clone() {
            Some(id) => {
                let slot = templates
                    .iter_mut()
                    .find(|t| t.id.as_deref() == Some(id.as_str()))
                    .ok_or_else(|| TaskError::NotFound(id.clone()))?;
                *slot = TaskSpec {
                    id: Some(id.clone()),
                    ..draft.spec.clone()
                };
                tracing::info!("Updated task template {}", id);
                Ok(slot.clone())
            }
            None => {
                let id = next_template_id(&templates);
                let saved = TaskSpec {
                    id: Some(id.clone()),
                    ..draft.spec.clone()
                };
                templates.push(saved.clone());
                draft.selected_id = Some(id.clone());
                draft.spec.id = Some(id.clone());
                tracing::info!("Created task template {} ({})", id, saved.name);
                Ok(saved)
            }
        }
    }

    /// Task management "create": appends a default template with a time-based id.
    pub fn create_default(&self, name: &str, description: &str) -> TaskSpec {
        let mut templates = self.templates.write();
        // two creates in the same millisecond take consecutive stamps
        let mut stamp = Utc::now().timestamp_millis();
        let mut id = format!("task-{}", stamp);
        while templates.iter().any(|t| t.id.as_deref() == Some(id.as_str())) {
            stamp += 1;
            id = format!("task-{}", stamp);
        }
        let spec = TaskSpec {
            id: Some(id),
            name: name.to_string(),
            description: description.to_string(),
            ..TaskSpec::blank()
        };
        templates.push(spec.clone());
        tracing::info!("Created default task template {:?}", spec.id);
        spec
    }

    /// Inline rename. A blank name becomes `fallback`.
    pub fn rename(&self, id: &str, name: &str, fallback: &str) -> Result<TaskSpec, TaskError> {
        let mut templates = self.templates.write();
        let spec = templates
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(id))
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        let trimmed = name.trim();
        spec.name = if trimmed.is_empty() { fallback.to_string() } else { trimmed.to_string() };
        Ok(spec.clone())
    }

    pub fn delete_selected(&self, selection: &TaskSelection) -> usize {
        let mut templates = self.templates.write();
        let before = templates.len();
        templates.retain(|t| !t.id.as_deref().map(|id| selection.contains(id)).unwrap_or(false));
        let removed = before - templates.len();
        tracing::info!("Deleted {} task template(s)", removed);
        removed
    }

    pub fn export(&self, id: &str, date: NaiveDate) -> Result<ExportedTemplate, TaskError> {
        let spec = self.get(id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        Ok(transfer::export_task_spec(&spec, date)?)
    }
}

fn next_template_id(templates: &[TaskSpec]) -> String {
    // count-based like the dashboard, skipping ids already taken after deletions
    let mut n = templates.len() + 1;
    loop {
        let candidate = format!("task-{}", n);
        if !templates.iter().any(|t| t.id.as_deref() == Some(candidate.as_str())) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DEFAULT_INVALID_JSON;
    use crate::sample;

    fn store() -> TaskTemplateStore {
        TaskTemplateStore::new(sample::task_templates())
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = store().draft(NEW_TEMPLATE, DEFAULT_INVALID_JSON).unwrap();
        assert!(draft.selected_id.is_none());
        assert_eq!(draft.spec.task_type, TaskType::Monitor);
        assert_eq!(draft.spec.category, TaskCategory::Routine);
        assert_eq!(draft.spec.specification, "{\n  \"rules\": [],\n  \"actions\": []\n}");
        assert!(draft.can_save());
    }

    #[test]
    fn test_blank_parameter_inputs_leave_map_unchanged() {
        let mut draft = store().draft("task-1", DEFAULT_INVALID_JSON).unwrap();
        let before = draft.spec.parameters.len();
        assert!(!draft.add_parameter("", ParameterType::Str, "something"));
        assert!(!draft.add_parameter("endpoint", ParameterType::Str, "  "));
        assert!(!draft.add_parameter("timeout", ParameterType::Int, "duplicate"));
        assert_eq!(draft.spec.parameters.len(), before);

        assert!(draft.add_parameter("endpoint", ParameterType::Str, "Target URL"));
        assert_eq!(draft.spec.parameters.len(), before + 1);
        assert_eq!(draft.spec.parameters.keys().last(), Some("endpoint"));
    }

    #[test]
    fn test_invalid_specification_blocks_save() {
        let store = store();
        let mut draft = store.draft(NEW_TEMPLATE, DEFAULT_INVALID_JSON).unwrap();
        draft.set_name("Nightly Audit");
        assert!(draft.on_specification_change("{\"rules\": [").is_err());
        assert_eq!(draft.spec.specification, TaskSpec::blank_specification());
        assert!(matches!(store.save(&mut draft), Err(TaskError::InvalidJson(_))));
        assert_eq!(store.list().len(), 3);

        draft.on_specification_change("{\"rules\": []}").unwrap();
        let saved = store.save(&mut draft).unwrap();
        assert_eq!(saved.id.as_deref(), Some("task-4"));
        assert_eq!(saved.specification, "{\"rules\": []}");
        assert_eq!(draft.selected_id.as_deref(), Some("task-4"));
    }

    #[test]
    fn test_name_required() {
        let store = store();
        let mut draft = store.draft(NEW_TEMPLATE, DEFAULT_INVALID_JSON).unwrap();
        assert!(matches!(store.save(&mut draft), Err(TaskError::NameRequired)));
    }

    #[test]
    fn test_save_existing_replaces_in_place() {
        let store = store();
        let mut draft = store.draft("task-2", DEFAULT_INVALID_JSON).unwrap();
        draft.set_description("Nightly ingest");
        draft.update_parameter("batch_size", ParameterField::DefaultValue("500".to_string()));
        store.save(&mut draft).unwrap();

        let saved = store.get("task-2").unwrap();
        assert_eq!(saved.description, "Nightly ingest");
        assert_eq!(
            saved.parameters.get("batch_size").and_then(|p| p.default_value.as_deref()),
            Some("500")
        );
        assert_eq!(store.list()[1].id.as_deref(), Some("task-2"));
    }

    #[test]
    fn test_new_id_skips_taken_ids() {
        let store = store();
        store.delete_selected(&TaskSelection::of(["task-1"]));
        let mut draft = store.draft(NEW_TEMPLATE, DEFAULT_INVALID_JSON).unwrap();
        draft.set_name("Fresh");
        // count is 2 -> task-3 is taken -> task-4
        assert_eq!(store.save(&mut draft).unwrap().id.as_deref(), Some("task-4"));
    }

    #[test]
    fn test_rename_and_create_default() {
        let store = store();
        let created = store.create_default("New Task", "New task description");
        let id = created.id.unwrap();
        assert!(id.starts_with("task-"));
        assert_eq!(store.rename(&id, "  Nightly  ", "Unnamed Task").unwrap().name, "Nightly");
        assert_eq!(store.rename(&id, "   ", "Unnamed Task").unwrap().name, "Unnamed Task");
        assert!(matches!(store.rename("task-99", "x", "y"), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_create_default_ids_are_unique() {
        let store = store();
        let ids: BTreeSet<String> = (0..5)
            .filter_map(|_| store.create_default("New Task", "New task description").id)
            .collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(store.ids().len(), 8);
    }

    #[test]
    fn test_form_parameters_follow_add_rules() {
        let store = store();
        let mut draft = store.draft("task-1", DEFAULT_INVALID_JSON).unwrap();
        let form: TaskForm = serde_json::from_value(serde_json::json!({
            "name": "Health Check",
            "parameters": {
                "  endpoint ": {"type": "str", "description": "  Target URL "},
                "retries": {"type": "int", "description": "Retry count"}
            }
        }))
        .unwrap();
        form.apply(&mut draft).unwrap();
        let keys: Vec<&str> = draft.spec.parameters.keys().collect();
        assert_eq!(keys, vec!["endpoint", "retries"]);
        assert_eq!(draft.spec.parameters.get("endpoint").unwrap().description, "Target URL");

        for bad in [
            serde_json::json!({"": {"type": "str", "description": "No key"}}),
            serde_json::json!({"   ": {"type": "str", "description": "Blank key"}}),
            serde_json::json!({"endpoint": {"type": "str", "description": "   "}}),
        ] {
            let mut draft = store.draft("task-1", DEFAULT_INVALID_JSON).unwrap();
            let body = serde_json::json!({"name": "Health Check", "parameters": bad});
            let form: TaskForm = serde_json::from_value(body).unwrap();
            assert!(matches!(form.apply(&mut draft), Err(TaskError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_selection_toggle_all() {
        let store = store();
        let all = store.ids();
        let mut selection = TaskSelection::default();
        selection.toggle("task-1");
        selection.toggle_all(&all);
        assert_eq!(selection.len(), 3);
        selection.toggle_all(&all);
        assert!(selection.is_empty());

        selection.toggle("task-2");
        selection.toggle("task-3");
        selection.toggle("task-3");
        assert_eq!(store.delete_selected(&selection), 1);
        assert!(store.get("task-2").is_none());
    }

    #[test]
    fn test_export_file() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let exported = store().export("task-3", date).unwrap();
        assert_eq!(exported.file_name, "System Analysis Template_template_2026-01-02.json");
        assert!(exported.content.contains("\"category\": \"one-time\""));
    }
}
