// [[FLEET]]/apps/fleet-console/src/transfer.rs
// Purpose: TaskSpec import/export as downloadable JSON template files.
// Architecture: Interface Layer (file format)
// Dependencies: serde_json, chrono, thiserror

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{TaskCategory, TaskParameter, TaskSpec, TaskType};
use crate::params::ParameterMap;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to import template: {0}")]
    ImportFailed(String),
    #[error("Failed to export template: {0}")]
    ExportFailed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportedTemplate {
    pub file_name: String,
    pub content: String,
}

#[derive(Serialize)]
struct TemplateFile<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    task_type: TaskType,
    category: TaskCategory,
    description: &'a str,
    specification: &'a str,
    parameters: &'a ParameterMap<TaskParameter>,
}

/// `{name or "task"}_template_{YYYY-MM-DD}.json`
pub fn export_file_name(name: &str, date: NaiveDate) -> String {
    let stem = if name.is_empty() { "task" } else { name };
    format!("{}_template_{}.json", stem, date.format("%Y-%m-%d"))
}

pub fn export_task_spec(spec: &TaskSpec, date: NaiveDate) -> Result<ExportedTemplate, TransferError> {
    let file = TemplateFile {
        id: spec.id.as_deref().unwrap_or(""),
        name: &spec.name,
        task_type: spec.task_type,
        category: spec.category,
        description: &spec.description,
        specification: &spec.specification,
        parameters: &spec.parameters,
    };
    Ok(ExportedTemplate {
        file_name: export_file_name(&spec.name, date),
        content: serde_json::to_string_pretty(&file)?,
    })
}

/// Parse a template file. Absent (or empty) fields take defaults instead of failing.
pub fn import_task_spec(content: &str) -> Result<TaskSpec, TransferError> {
    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| TransferError::ImportFailed(e.to_string()))?;
    let obj = parsed
        .as_object()
        .ok_or_else(|| TransferError::ImportFailed("template must be a JSON object".to_string()))?;

    let text = |key: &str| -> String {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let task_type = match obj.get("type").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => enum_from_str::<TaskType>(s)?,
        _ => TaskType::Monitor,
    };
    let category = match obj.get("category").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => enum_from_str::<TaskCategory>(s)?,
        _ => TaskCategory::Routine,
    };

    let specification = match obj.get("specification") {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(Value::String(s)) if s.trim().is_empty() => Value::Object(Default::default()),
        // exported files carry the specification as text
        Some(Value::String(s)) => serde_json::from_str(s).map_err(|e| {
            TransferError::ImportFailed(format!("specification is not valid JSON: {}", e))
        })?,
        Some(other) => other.clone(),
    };
    let specification = serde_json::to_string_pretty(&specification)?;

    let parameters = match obj.get("parameters") {
        None | Some(Value::Null) => ParameterMap::new(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| TransferError::ImportFailed(format!("invalid parameters: {}", e)))?,
    };

    let id = text("id");
    Ok(TaskSpec {
        id: if id.is_empty() { None } else { Some(id) },
        name: text("name"),
        task_type,
        category,
        description: text("description"),
        specification,
        parameters,
    })
}

fn enum_from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, TransferError> {
    serde_json::from_value(Value::String(s.to_string()))
        .map_err(|_| TransferError::ImportFailed(format!("unknown value '{}'", s)))
}
