// [[FLEET]]/apps/fleet-console/src/server/handlers.rs
// Purpose: API Handlers. One handler per console action; mutations are broadcast on the event bus.
// Architecture: API Layer
// Dependencies: Axum, Runtime

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Json, Path, Query, State,
    },
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::agents::{AgentDraft, AgentError, AgentForm};
use crate::error::{ApiError, ApiResult, Localize};
use crate::events::EventType;
use crate::locale::Locale;
use crate::memory;
use crate::models::{ParameterField, ParameterType};
use crate::monitoring::{self, LogQuery, RESULT_AGENTS};
use crate::runtime::FleetRuntime;
use crate::runtime_config::{EngineForm, StorageForm, VideoSourceDraft, VideoSourceForm};
use crate::sample;
use crate::shell::{self, Credentials};
use crate::tasks::{TaskDraft, TaskError, TaskForm, TaskSelection, NEW_TEMPLATE};
use crate::transfer;

type Runtime = State<Arc<FleetRuntime>>;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: String,
    message: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Fleet console is running".to_string(),
    })
}

pub async fn login(
    State(runtime): Runtime,
    Json(credentials): Json<Credentials>,
) -> ApiResult<Json<Value>> {
    shell::sign_in(
        runtime.repository(),
        &credentials,
        runtime.request_timeout(),
        runtime.cancel_token(),
    )
    .await
    .map_err(|e| e.localize(&runtime.i18n))?;

    Ok(Json(json!({ "success": true, "email": credentials.email })))
}

// === LOCALE ===

#[derive(Deserialize)]
pub struct LocaleRequest {
    locale: String,
}

pub async fn get_locale(State(runtime): Runtime) -> Json<Value> {
    Json(json!({ "locale": runtime.i18n.locale() }))
}

pub async fn set_locale(
    State(runtime): Runtime,
    Json(request): Json<LocaleRequest>,
) -> ApiResult<Json<Value>> {
    let locale: Locale = request.locale.parse().map_err(|e: crate::locale::LocaleError| e.localize(&runtime.i18n))?;
    runtime
        .i18n
        .set_locale(locale)
        .map_err(|e| e.localize(&runtime.i18n))?;
    runtime.emit_event(EventType::LocaleChanged, None, json!({ "locale": locale }));
    Ok(Json(json!({ "success": true, "locale": locale })))
}

/// Query parameters fill `{placeholders}` in the translation.
pub async fn translate(
    State(runtime): Runtime,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    Json(json!({
        "key": key,
        "locale": runtime.i18n.locale(),
        "text": runtime.i18n.t_with(&key, &params),
    }))
}

// === SHELL ===

#[derive(Deserialize)]
pub struct NavigateRequest {
    item: String,
}

fn shell_view(runtime: &FleetRuntime) -> Value {
    let view = shell::view(&runtime.sidebar.read(), &runtime.settings.read(), &runtime.i18n);
    json!(view)
}

pub async fn get_shell(State(runtime): Runtime) -> Json<Value> {
    Json(shell_view(&runtime))
}

pub async fn get_menu(State(runtime): Runtime) -> Json<Value> {
    Json(json!({ "menu": shell::menu(&runtime.i18n) }))
}

pub async fn navigate(
    State(runtime): Runtime,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<Json<Value>> {
    runtime
        .sidebar
        .write()
        .navigate(&request.item)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(shell_view(&runtime)))
}

pub async fn toggle_sidebar(State(runtime): Runtime) -> Json<Value> {
    runtime.sidebar.write().toggle_open();
    Json(shell_view(&runtime))
}

pub async fn toggle_sidebar_section(
    State(runtime): Runtime,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    runtime
        .sidebar
        .write()
        .toggle_section(&id)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(shell_view(&runtime)))
}

pub async fn toggle_settings(State(runtime): Runtime) -> Json<Value> {
    runtime.settings.write().toggle();
    Json(shell_view(&runtime))
}

pub async fn toggle_settings_section(
    State(runtime): Runtime,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    runtime
        .settings
        .write()
        .toggle_section(&id)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(shell_view(&runtime)))
}

// === TASK TEMPLATES ===

fn draft_json(draft: &TaskDraft) -> Value {
    json!({
        "success": true,
        "template": draft.spec,
        "specificationError": draft.specification_error(),
    })
}

fn save_draft(runtime: &FleetRuntime, draft: &mut TaskDraft) -> ApiResult<Json<Value>> {
    let saved = runtime
        .tasks
        .save(draft)
        .map_err(|e| e.localize(&runtime.i18n))?;
    runtime.emit_event(EventType::TemplateSaved, saved.id.as_deref(), json!(saved));
    Ok(Json(json!({ "success": true, "template": saved })))
}

fn stored_draft(runtime: &FleetRuntime, id: &str) -> ApiResult<TaskDraft> {
    runtime
        .tasks
        .draft(id, &runtime.invalid_json())
        .map_err(|e| e.localize(&runtime.i18n))
}

pub async fn list_tasks(State(runtime): Runtime) -> Json<Value> {
    Json(json!({ "success": true, "templates": runtime.tasks.list() }))
}

pub async fn get_task(State(runtime): Runtime, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let draft = stored_draft(&runtime, &id)?;
    Ok(Json(draft_json(&draft)))
}

pub async fn blank_task(State(runtime): Runtime) -> ApiResult<Json<Value>> {
    let draft = stored_draft(&runtime, NEW_TEMPLATE)?;
    Ok(Json(draft_json(&draft)))
}

/// Task editor "save". The form is replayed onto a fresh draft of the selected template.
pub async fn save_task(State(runtime): Runtime, Json(form): Json<TaskForm>) -> ApiResult<Json<Value>> {
    let mut draft = stored_draft(&runtime, form.selection())?;
    form.apply(&mut draft).map_err(|e| e.localize(&runtime.i18n))?;
    save_draft(&runtime, &mut draft)
}

/// Task management "create": a default template, saved immediately.
pub async fn create_task(State(runtime): Runtime) -> Json<Value> {
    let spec = runtime.tasks.create_default(
        &runtime.i18n.t("taskManagement.newTaskDefaultName"),
        &runtime.i18n.t("taskManagement.newTaskDefaultDescription"),
    );
    runtime.emit_event(EventType::TemplateSaved, spec.id.as_deref(), json!(spec));
    Json(json!({ "success": true, "template": spec }))
}

#[derive(Deserialize)]
pub struct DeleteTasksRequest {
    #[serde(default)]
    ids: Vec<String>,
    /// Header checkbox: select every template.
    #[serde(default)]
    all: bool,
}

pub async fn delete_tasks(
    State(runtime): Runtime,
    Json(request): Json<DeleteTasksRequest>,
) -> Json<Value> {
    let mut selection = TaskSelection::of(request.ids);
    if request.all {
        selection = TaskSelection::default();
        selection.toggle_all(&runtime.tasks.ids());
    }
    let deleted = runtime.tasks.delete_selected(&selection);
    if deleted > 0 {
        runtime.emit_event(EventType::TemplatesDeleted, None, json!({ "deleted": deleted }));
    }
    Json(json!({ "success": true, "deleted": deleted }))
}

#[derive(Deserialize)]
pub struct RenameRequest {
    #[serde(default)]
    name: String,
}

pub async fn rename_task(
    State(runtime): Runtime,
    Path(id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<Json<Value>> {
    let spec = runtime
        .tasks
        .rename(&id, &request.name, &runtime.i18n.t("taskManagement.unnamedTask"))
        .map_err(|e| e.localize(&runtime.i18n))?;
    runtime.emit_event(EventType::TemplateSaved, Some(&id), json!(spec));
    Ok(Json(json!({ "success": true, "template": spec })))
}

/// Download of the template file.
pub async fn export_task(
    State(runtime): Runtime,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let exported = runtime
        .tasks
        .export(&id, Utc::now().date_naive())
        .map_err(|e| e.localize(&runtime.i18n))?;
    tracing::info!("Exported template {} as {}", id, exported.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", exported.file_name),
            ),
        ],
        exported.content,
    ))
}

/// Body is the raw file content. The result is loaded as an unsaved draft.
pub async fn import_task(State(runtime): Runtime, body: String) -> ApiResult<Json<Value>> {
    let spec = transfer::import_task_spec(&body).map_err(|e| TaskError::from(e).localize(&runtime.i18n))?;
    let draft = TaskDraft::imported(spec, &runtime.invalid_json());
    tracing::info!("Imported template {:?}", draft.spec.name);
    Ok(Json(draft_json(&draft)))
}

#[derive(Deserialize)]
pub struct NewParameter {
    key: String,
    #[serde(rename = "type", default)]
    kind: ParameterType,
    #[serde(default)]
    description: String,
    #[serde(rename = "defaultValue", default)]
    default_value: Option<String>,
}

pub async fn add_task_parameter(
    State(runtime): Runtime,
    Path(id): Path<String>,
    Json(param): Json<NewParameter>,
) -> ApiResult<Json<Value>> {
    let mut draft = stored_draft(&runtime, &id)?;
    if !draft.add_parameter(&param.key, param.kind, &param.description) {
        return Err(TaskError::InvalidParameter(param.key).localize(&runtime.i18n));
    }
    if let Some(value) = param.default_value {
        draft.update_parameter(param.key.trim(), ParameterField::DefaultValue(value));
    }
    save_draft(&runtime, &mut draft)
}

pub async fn update_task_parameter(
    State(runtime): Runtime,
    Path((id, key)): Path<(String, String)>,
    Json(field): Json<ParameterField>,
) -> ApiResult<Json<Value>> {
    let mut draft = stored_draft(&runtime, &id)?;
    if !draft.update_parameter(&key, field) {
        return Err(ApiError::NotFound(format!("Parameter not found: {}", key)));
    }
    save_draft(&runtime, &mut draft)
}

pub async fn delete_task_parameter(
    State(runtime): Runtime,
    Path((id, key)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let mut draft = stored_draft(&runtime, &id)?;
    draft.delete_parameter(&key);
    save_draft(&runtime, &mut draft)
}

// === AGENTS ===

async fn loaded(runtime: &FleetRuntime) -> ApiResult<()> {
    runtime
        .load_agents()
        .await
        .map(|_| ())
        .map_err(|e| e.localize(&runtime.i18n))
}

fn agent_result(runtime: &FleetRuntime, result: Result<crate::models::Agent, AgentError>, event: EventType) -> ApiResult<Json<Value>> {
    let agent = result.map_err(|e| e.localize(&runtime.i18n))?;
    runtime.emit_event(event, Some(&agent.id), json!(agent));
    Ok(Json(json!({ "success": true, "agent": agent })))
}

pub async fn list_agents(State(runtime): Runtime) -> ApiResult<Json<Value>> {
    let agents = runtime
        .load_agents()
        .await
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "agents": agents })))
}

/// Retry after a failed load.
pub async fn reload_agents(State(runtime): Runtime) -> ApiResult<Json<Value>> {
    let agents = runtime
        .reload_agents()
        .await
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "agents": agents })))
}

pub async fn get_catalog() -> Json<Value> {
    Json(json!({
        "tasks": sample::assignable_tasks(),
        "hosts": sample::AVAILABLE_HOSTS,
    }))
}

pub async fn create_agent(State(runtime): Runtime, Json(form): Json<AgentForm>) -> ApiResult<Json<Value>> {
    loaded(&runtime).await?;
    let mut draft = AgentDraft::new(&runtime.invalid_json());
    let result = form
        .apply(&mut draft, &sample::assignable_tasks())
        .and_then(|_| runtime.agents.save(&draft, &runtime.transition_reasons()));
    agent_result(&runtime, result, EventType::AgentSaved)
}

pub async fn update_agent(
    State(runtime): Runtime,
    Path(id): Path<String>,
    Json(form): Json<AgentForm>,
) -> ApiResult<Json<Value>> {
    loaded(&runtime).await?;
    let result = runtime.agents.draft(&id, &runtime.invalid_json()).and_then(|mut draft| {
        form.apply(&mut draft, &sample::assignable_tasks())?;
        runtime.agents.save(&draft, &runtime.transition_reasons())
    });
    agent_result(&runtime, result, EventType::AgentSaved)
}

pub async fn delete_agent(State(runtime): Runtime, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    loaded(&runtime).await?;
    runtime
        .agents
        .delete(&id)
        .map_err(|e| e.localize(&runtime.i18n))?;
    runtime.emit_event(EventType::AgentDeleted, Some(&id), Value::Null);
    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn toggle_agent(State(runtime): Runtime, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    loaded(&runtime).await?;
    let result = runtime.agents.toggle_agent(&id, &runtime.transition_reasons());
    agent_result(&runtime, result, EventType::AgentStatusChanged)
}

pub async fn toggle_agent_task(
    State(runtime): Runtime,
    Path((id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    loaded(&runtime).await?;
    let result = runtime
        .agents
        .toggle_task(&id, &task_id, &runtime.transition_reasons());
    agent_result(&runtime, result, EventType::TaskStatusChanged)
}

// === RUNTIME CONFIGURATION ===

fn config_changed(runtime: &FleetRuntime, subject: Option<&str>, section: &str, value: Value) -> Json<Value> {
    runtime.emit_event(
        EventType::RuntimeConfigChanged,
        subject,
        json!({ "section": section, "value": value.clone() }),
    );
    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(section.to_string(), value);
    Json(Value::Object(body))
}

pub async fn get_runtime_config(State(runtime): Runtime) -> Json<Value> {
    Json(json!({ "success": true, "config": runtime.runtime_config.snapshot() }))
}

pub async fn add_engine(State(runtime): Runtime, Json(form): Json<EngineForm>) -> ApiResult<Json<Value>> {
    let engine = runtime
        .runtime_config
        .add_engine(form)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&engine.hostname), "engine", json!(engine)))
}

pub async fn update_engine(
    State(runtime): Runtime,
    Path(hostname): Path<String>,
    Json(form): Json<EngineForm>,
) -> ApiResult<Json<Value>> {
    let engine = runtime
        .runtime_config
        .update_engine(&hostname, form)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&hostname), "engine", json!(engine)))
}

pub async fn delete_engine(State(runtime): Runtime, Path(hostname): Path<String>) -> ApiResult<Json<Value>> {
    runtime
        .runtime_config
        .delete_engine(&hostname)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&hostname), "engine", Value::Null))
}

pub async fn add_video_source(
    State(runtime): Runtime,
    Json(form): Json<VideoSourceForm>,
) -> ApiResult<Json<Value>> {
    let mut draft = VideoSourceDraft::new(&runtime.invalid_json());
    form.apply(&mut draft);
    let source = runtime
        .runtime_config
        .add_video_source(&draft)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&source.id), "videoSource", json!(source)))
}

pub async fn update_video_source(
    State(runtime): Runtime,
    Path(id): Path<String>,
    Json(form): Json<VideoSourceForm>,
) -> ApiResult<Json<Value>> {
    let store = &runtime.runtime_config;
    let source = store
        .video_source_draft(&id, &runtime.invalid_json())
        .and_then(|mut draft| {
            form.apply(&mut draft);
            store.update_video_source(&id, &draft)
        })
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&id), "videoSource", json!(source)))
}

pub async fn delete_video_source(State(runtime): Runtime, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    runtime
        .runtime_config
        .delete_video_source(&id)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&id), "videoSource", Value::Null))
}

pub async fn save_storage(State(runtime): Runtime, Json(form): Json<StorageForm>) -> ApiResult<Json<Value>> {
    let mut draft = runtime.runtime_config.storage_draft(&runtime.invalid_json());
    form.apply(&mut draft);
    let storage = runtime
        .runtime_config
        .save_storage(&draft)
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, None, "storage", json!(storage)))
}

#[derive(Deserialize)]
pub struct DialogModelForm {
    /// Raw editor text.
    config: String,
}

pub async fn update_dialog_model(
    State(runtime): Runtime,
    Path(name): Path<String>,
    Json(form): Json<DialogModelForm>,
) -> ApiResult<Json<Value>> {
    let config = runtime
        .runtime_config
        .update_dialog_model(&name, &form.config, &runtime.invalid_json())
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(config_changed(&runtime, Some(&name), "modelConfig", json!(config)))
}

// === MONITORING ===

pub async fn get_logs(State(runtime): Runtime, Query(query): Query<LogQuery>) -> Json<Value> {
    let logs = runtime.logs(&query);
    Json(json!({ "success": true, "count": logs.len(), "logs": logs }))
}

pub async fn get_engine_performance() -> Json<Value> {
    let engines = monitoring::engine_performance(Utc::now(), &mut rand::thread_rng());
    Json(json!({ "success": true, "engines": engines }))
}

pub async fn get_agent_performance() -> Json<Value> {
    let agents = monitoring::agent_performance(Utc::now(), &mut rand::thread_rng());
    Json(json!({ "success": true, "agents": agents }))
}

pub async fn list_result_agents() -> Json<Value> {
    Json(json!({ "success": true, "agents": RESULT_AGENTS }))
}

#[derive(Deserialize)]
pub struct ResultsQuery {
    dashboard: Option<String>,
}

pub async fn get_results(
    State(runtime): Runtime,
    Path(agent_id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<Json<Value>> {
    let panel = monitoring::load_results(
        runtime.repository(),
        &agent_id,
        query.dashboard.as_deref(),
        runtime.request_timeout(),
        runtime.cancel_token(),
    )
    .await
    .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "results": panel })))
}

// === MEMORY ===

pub async fn get_agent_schemas(State(runtime): Runtime, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let agents = runtime
        .load_agents()
        .await
        .map_err(|e| e.localize(&runtime.i18n))?;
    let schemas = memory::schemas_of(&agents, &id)
        .ok_or_else(|| AgentError::NotFound(id.clone()).localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "agentId": id, "schemas": schemas })))
}

pub async fn get_schema(State(runtime): Runtime, Path(schema): Path<String>) -> Json<Value> {
    Json(json!({ "success": true, "schema": memory::schema_view(&schema, &runtime.i18n) }))
}

#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    query: String,
}

pub async fn run_query(State(runtime): Runtime, Json(request): Json<QueryRequest>) -> ApiResult<Json<Value>> {
    let result = memory::run_query(
        runtime.repository(),
        &request.query,
        runtime.request_timeout(),
        runtime.cancel_token(),
    )
    .await
    .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "result": result })))
}

// === COPILOT ===

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    content: String,
}

pub async fn get_messages(State(runtime): Runtime, Path(agent_id): Path<String>) -> Json<Value> {
    Json(json!({ "success": true, "messages": runtime.chat.messages(&agent_id) }))
}

/// Returns the user's message at once; the reply arrives later as a `ChatMessage` event.
pub async fn send_message(
    State(runtime): Runtime,
    Path(agent_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<Value>> {
    let message = runtime
        .send_chat(&agent_id, &request.content)
        .await
        .map_err(|e| e.localize(&runtime.i18n))?;
    Ok(Json(json!({ "success": true, "message": message })))
}

// === EVENT STREAM ===

pub async fn ws_event_stream(State(runtime): Runtime, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_event_stream(socket, runtime))
}

async fn handle_event_stream(socket: WebSocket, runtime: Arc<FleetRuntime>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = runtime.subscribe();
    let shutdown = runtime.cancel_token().clone();

    // Send initial state
    let hello = json!({
        "type": "connected",
        "locale": runtime.i18n.locale(),
        "timestamp": Utc::now().to_rfc3339(),
    });
    if sender.send(Message::Text(hello.to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = receiver.next() => {
                if msg.is_none() {
                    tracing::info!("Client disconnected from event stream");
                    break;
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let text = match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!("Failed to encode event {}: {}", event.id, e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(text)).await.is_err() {
                            tracing::info!("Failed to send event, client disconnected");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Event stream lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            _ = shutdown.cancelled() => {
                let _ = sender.close().await;
                break;
            }
        }
    }
}
