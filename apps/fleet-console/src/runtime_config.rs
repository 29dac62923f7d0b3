// [[FLEET]]/apps/fleet-console/src/runtime_config.rs
// Purpose: Agent runtime configuration: task engines, video sources, storage and dialog models.
// Architecture: Domain Logic Layer
// Dependencies: parking_lot, serde_json

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::documents::{ConfigDocument, ConfigKind, ModelConfig};
use crate::editor::{EditorError, EmptyBuffer, JsonConfigEditor};
use crate::models::{
    AgentRuntimeConfig, EngineStatus, EngineType, StorageConfig, TaskEngine, VideoSource,
    VideoSourceType,
};

#[derive(Error, Debug)]
pub enum RuntimeConfigError {
    #[error("Hostname is required")]
    HostnameRequired,
    #[error("Engine {0} already exists")]
    DuplicateHostname(String),
    #[error("Engine not found: {0}")]
    EngineNotFound(String),
    #[error("Source id is required")]
    SourceIdRequired,
    #[error("Video source {0} already exists")]
    DuplicateSourceId(String),
    #[error("Video source not found: {0}")]
    SourceNotFound(String),
    #[error("Dialog model not found: {0}")]
    ModelNotFound(String),
    #[error(transparent)]
    InvalidJson(#[from] EditorError),
}

/// Submitted engine form. Status is never taken from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineForm {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(rename = "type", default)]
    pub engine_type: EngineType,
}

/// Video source form with its ingestion config editor.
#[derive(Debug)]
pub struct VideoSourceDraft {
    pub id: String,
    pub uri: String,
    pub source_type: VideoSourceType,
    ingestion: JsonConfigEditor<Value>,
}

impl VideoSourceDraft {
    pub fn new(invalid_json: &str) -> Self {
        Self::seeded(String::new(), String::new(), VideoSourceType::Camera, ConfigDocument::default(), invalid_json)
    }

    pub fn edit(source: &VideoSource, invalid_json: &str) -> Self {
        Self::seeded(
            source.id.clone(),
            source.uri.clone(),
            source.source_type.unwrap_or(VideoSourceType::Camera),
            source.ingestion_config.clone(),
            invalid_json,
        )
    }

    fn seeded(
        id: String,
        uri: String,
        source_type: VideoSourceType,
        ingestion: ConfigDocument,
        invalid_json: &str,
    ) -> Self {
        Self {
            id,
            uri,
            source_type,
            ingestion: JsonConfigEditor::seeded(ingestion.to_value())
                .with_empty_buffer(EmptyBuffer::SubstituteEmptyObject)
                .with_error_message(invalid_json),
        }
    }

    pub fn on_ingestion_change(&mut self, text: &str) -> Result<(), EditorError> {
        self.ingestion.on_text_change(text).map(|_| ())
    }

    pub fn ingestion_text(&self) -> &str {
        self.ingestion.text()
    }

    fn submit(&self) -> Result<VideoSource, RuntimeConfigError> {
        let ingestion = self.ingestion.submit()?;
        if self.id.trim().is_empty() {
            return Err(RuntimeConfigError::SourceIdRequired);
        }
        Ok(VideoSource {
            id: self.id.trim().to_string(),
            uri: self.uri.clone(),
            source_type: Some(self.source_type),
            ingestion_config: ConfigDocument::classify(ConfigKind::Ingestion, ingestion),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSourceForm {
    /// Absent fields keep the draft's current value.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "type", default)]
    pub source_type: Option<VideoSourceType>,
    /// Raw editor text of the ingestion config.
    #[serde(default)]
    pub ingestion_config: Option<String>,
}

impl VideoSourceForm {
    pub fn apply(self, draft: &mut VideoSourceDraft) {
        if let Some(id) = self.id {
            draft.id = id;
        }
        if let Some(uri) = self.uri {
            draft.uri = uri;
        }
        if let Some(source_type) = self.source_type {
            draft.source_type = source_type;
        }
        if let Some(text) = self.ingestion_config {
            let _ = draft.on_ingestion_change(&text);
        }
    }
}

/// The three storage buffers. They are only checked together, when saving.
#[derive(Debug)]
pub struct StorageDraft {
    db: JsonConfigEditor<Value>,
    oss: JsonConfigEditor<Value>,
    redis: JsonConfigEditor<Value>,
}

impl StorageDraft {
    pub fn edit(storage: &StorageConfig, invalid_json: &str) -> Self {
        let editor = |doc: &ConfigDocument| {
            JsonConfigEditor::seeded(doc.to_value()).with_error_message(invalid_json)
        };
        Self {
            db: editor(&storage.db_config),
            oss: editor(&storage.oss_config),
            redis: editor(&storage.redis_config),
        }
    }

    pub fn set_db(&mut self, text: &str) {
        let _ = self.db.on_text_change(text);
    }

    pub fn set_oss(&mut self, text: &str) {
        let _ = self.oss.on_text_change(text);
    }

    pub fn set_redis(&mut self, text: &str) {
        let _ = self.redis.on_text_change(text);
    }

    fn submit(&self) -> Result<StorageConfig, RuntimeConfigError> {
        Ok(StorageConfig {
            db_config: self.db.submit()?.into(),
            oss_config: self.oss.submit()?.into(),
            redis_config: self.redis.submit()?.into(),
        }
        .classified())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageForm {
    pub db_config: Option<String>,
    pub oss_config: Option<String>,
    pub redis_config: Option<String>,
}

impl StorageForm {
    pub fn apply(self, draft: &mut StorageDraft) {
        if let Some(text) = self.db_config {
            draft.set_db(&text);
        }
        if let Some(text) = self.oss_config {
            draft.set_oss(&text);
        }
        if let Some(text) = self.redis_config {
            draft.set_redis(&text);
        }
    }
}

pub struct RuntimeConfigStore {
    config: RwLock<AgentRuntimeConfig>,
}

impl RuntimeConfigStore {
    pub fn new(seed: AgentRuntimeConfig) -> Self {
        Self {
            config: RwLock::new(seed),
        }
    }

    pub fn snapshot(&self) -> AgentRuntimeConfig {
        self.config.read().clone()
    }

    pub fn add_engine(&self, form: EngineForm) -> Result<TaskEngine, RuntimeConfigError> {
        let hostname = form.hostname.trim().to_string();
        if hostname.is_empty() {
            return Err(RuntimeConfigError::HostnameRequired);
        }
        let mut config = self.config.write();
        if config.engines.iter().any(|e| e.hostname == hostname) {
            tracing::warn!("Rejected duplicate engine {}", hostname);
            return Err(RuntimeConfigError::DuplicateHostname(hostname));
        }
        let engine = TaskEngine {
            hostname,
            ip: form.ip,
            status: EngineStatus::Unknown,
            engine_type: form.engine_type,
        };
        config.engines.push(engine.clone());
        tracing::info!("Added task engine {}", engine.hostname);
        Ok(engine)
    }

    /// Hostname and status are fixed once an engine exists; only ip and type change.
    pub fn update_engine(&self, hostname: &str, form: EngineForm) -> Result<TaskEngine, RuntimeConfigError> {
        let mut config = self.config.write();
        let engine = config
            .engines
            .iter_mut()
            .find(|e| e.hostname == hostname)
            .ok_or_else(|| RuntimeConfigError::EngineNotFound(hostname.to_string()))?;
        engine.ip = form.ip;
        engine.engine_type = form.engine_type;
        tracing::info!("Updated task engine {}", hostname);
        Ok(engine.clone())
    }

    pub fn delete_engine(&self, hostname: &str) -> Result<(), RuntimeConfigError> {
        let mut config = self.config.write();
        let before = config.engines.len();
        config.engines.retain(|e| e.hostname != hostname);
        if config.engines.len() == before {
            return Err(RuntimeConfigError::EngineNotFound(hostname.to_string()));
        }
        tracing::info!("Deleted task engine {}", hostname);
        Ok(())
    }

    pub fn video_source_draft(&self, id: &str, invalid_json: &str) -> Result<VideoSourceDraft, RuntimeConfigError> {
        self.config
            .read()
            .video_sources
            .iter()
            .find(|s| s.id == id)
            .map(|s| VideoSourceDraft::edit(s, invalid_json))
            .ok_or_else(|| RuntimeConfigError::SourceNotFound(id.to_string()))
    }

    pub fn add_video_source(&self, draft: &VideoSourceDraft) -> Result<VideoSource, RuntimeConfigError> {
        let source = draft.submit()?;
        let mut config = self.config.write();
        if config.video_sources.iter().any(|s| s.id == source.id) {
            tracing::warn!("Rejected duplicate video source {}", source.id);
            return Err(RuntimeConfigError::DuplicateSourceId(source.id));
        }
        config.video_sources.push(source.clone());
        tracing::info!("Added video source {}", source.id);
        Ok(source)
    }

    /// Replace the source stored under `id`. The id itself is not editable.
    pub fn update_video_source(&self, id: &str, draft: &VideoSourceDraft) -> Result<VideoSource, RuntimeConfigError> {
        let mut source = draft.submit()?;
        source.id = id.to_string();
        let mut config = self.config.write();
        let slot = config
            .video_sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RuntimeConfigError::SourceNotFound(id.to_string()))?;
        *slot = source.clone();
        tracing::info!("Updated video source {}", id);
        Ok(source)
    }

    pub fn delete_video_source(&self, id: &str) -> Result<(), RuntimeConfigError> {
        let mut config = self.config.write();
        let before = config.video_sources.len();
        config.video_sources.retain(|s| s.id != id);
        if config.video_sources.len() == before {
            return Err(RuntimeConfigError::SourceNotFound(id.to_string()));
        }
        tracing::info!("Deleted video source {}", id);
        Ok(())
    }

    pub fn storage_draft(&self, invalid_json: &str) -> StorageDraft {
        StorageDraft::edit(&self.config.read().storage, invalid_json)
    }

    /// All three buffers parse or nothing is written.
    pub fn save_storage(&self, draft: &StorageDraft) -> Result<StorageConfig, RuntimeConfigError> {
        let storage = draft.submit().map_err(|e| {
            tracing::warn!("Rejected storage save: {}", e);
            e
        })?;
        self.config.write().storage = storage.clone();
        tracing::info!("Saved storage configuration");
        Ok(storage)
    }

    /// Replace the sampling config of a dialog model. The active model's `llm_config` follows.
    pub fn update_dialog_model(
        &self,
        name: &str,
        text: &str,
        invalid_json: &str,
    ) -> Result<ConfigDocument, RuntimeConfigError> {
        let mut config = self.config.write();
        let dialog = &mut config.dialog;
        let model = dialog
            .models
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| RuntimeConfigError::ModelNotFound(name.to_string()))?;

        let seed: ModelConfig = serde_json::from_value(model.config.to_value()).unwrap_or(ModelConfig {
            temperature: None,
            max_tokens: None,
            top_p: None,
            extra: Default::default(),
        });
        let mut editor = JsonConfigEditor::seeded(seed).with_error_message(invalid_json);
        let parsed = editor.on_text_change(text)?.clone();

        model.config = ConfigDocument::Model(parsed);
        let updated = model.config.clone();
        if dialog.llm_model == name {
            dialog.llm_config = updated.clone();
        }
        tracing::info!("Updated dialog model {}", name);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DEFAULT_INVALID_JSON;
    use crate::sample;
    use serde_json::json;

    fn store() -> RuntimeConfigStore {
        RuntimeConfigStore::new(sample::runtime_config())
    }

    fn engine(hostname: &str) -> EngineForm {
        EngineForm {
            hostname: hostname.to_string(),
            ip: "10.0.0.9".to_string(),
            engine_type: EngineType::Roboflow,
        }
    }

    #[test]
    fn test_engine_hostname_rules() {
        let store = store();
        assert!(matches!(store.add_engine(engine("  ")), Err(RuntimeConfigError::HostnameRequired)));
        assert!(matches!(
            store.add_engine(engine("engine-02")),
            Err(RuntimeConfigError::DuplicateHostname(_))
        ));
        let added = store.add_engine(engine("engine-04")).unwrap();
        assert_eq!(added.status, EngineStatus::Unknown);
        assert_eq!(store.snapshot().engines.len(), 4);
    }

    #[test]
    fn test_engine_edit_preserves_status() {
        let store = store();
        let updated = store.update_engine("engine-01", engine("ignored")).unwrap();
        assert_eq!(updated.hostname, "engine-01");
        assert_eq!(updated.status, EngineStatus::Connected);
        assert_eq!(updated.ip, "10.0.0.9");
        store.delete_engine("engine-01").unwrap();
        assert!(matches!(store.delete_engine("engine-01"), Err(RuntimeConfigError::EngineNotFound(_))));
    }

    #[test]
    fn test_video_source_ingestion_editor() {
        let store = store();
        let mut draft = VideoSourceDraft::new(DEFAULT_INVALID_JSON);
        assert_eq!(draft.source_type, VideoSourceType::Camera);
        assert_eq!(draft.ingestion_text(), "{}");
        draft.id = "cam-03".to_string();
        draft.uri = "rtsp://192.168.1.203/stream1".to_string();

        assert!(draft.on_ingestion_change("{\"fps\": ").is_err());
        assert!(matches!(store.add_video_source(&draft), Err(RuntimeConfigError::InvalidJson(_))));

        // an emptied buffer stands for {}
        draft.on_ingestion_change("").unwrap();
        let added = store.add_video_source(&draft).unwrap();
        assert_eq!(added.ingestion_config.to_value(), json!({}));

        assert!(matches!(
            store.add_video_source(&draft),
            Err(RuntimeConfigError::DuplicateSourceId(_))
        ));
        draft.id = String::new();
        assert!(matches!(store.add_video_source(&draft), Err(RuntimeConfigError::SourceIdRequired)));
    }

    #[test]
    fn test_video_source_edit() {
        let store = store();
        let mut draft = store.video_source_draft("cam-02", DEFAULT_INVALID_JSON).unwrap();
        assert!(draft.ingestion_text().contains("\"fps\": 30"));
        draft.on_ingestion_change("{\"fps\": 25, \"resolution\": \"1080p\"}").unwrap();
        let updated = store.update_video_source("cam-02", &draft).unwrap();
        assert_eq!(updated.ingestion_config.kind(), ConfigKind::Ingestion);
        store.delete_video_source("cam-02").unwrap();
        assert_eq!(store.snapshot().video_sources.len(), 2);
    }

    #[test]
    fn test_form_without_id_keeps_source_id() {
        let store = store();
        let mut draft = store.video_source_draft("cam-02", DEFAULT_INVALID_JSON).unwrap();
        let uri = draft.uri.clone();
        let form: VideoSourceForm =
            serde_json::from_value(json!({"ingestion_config": "{\"fps\": 15}"})).unwrap();
        form.apply(&mut draft);
        assert_eq!(draft.id, "cam-02");
        assert_eq!(draft.uri, uri);
        let updated = store.update_video_source("cam-02", &draft).unwrap();
        assert_eq!(updated.ingestion_config.to_value()["fps"], json!(15));

        let mut fresh = VideoSourceDraft::new(DEFAULT_INVALID_JSON);
        let form: VideoSourceForm = serde_json::from_value(json!({"uri": "rtsp://cam-09/stream"})).unwrap();
        form.apply(&mut fresh);
        assert!(matches!(store.add_video_source(&fresh), Err(RuntimeConfigError::SourceIdRequired)));
    }

    #[test]
    fn test_storage_save_is_all_or_nothing() {
        let store = store();
        let before = store.snapshot().storage;
        let mut draft = store.storage_draft(DEFAULT_INVALID_JSON);
        draft.set_db("{\"host\": \"db2\", \"port\": 5433, \"database\": \"x\"}");
        draft.set_redis("{ nope");
        assert!(matches!(store.save_storage(&draft), Err(RuntimeConfigError::InvalidJson(_))));
        assert_eq!(store.snapshot().storage, before);

        draft.set_redis("{\"host\": \"redis2\", \"port\": 6380}");
        let saved = store.save_storage(&draft).unwrap();
        assert_eq!(saved.db_config.kind(), ConfigKind::Db);
        assert_eq!(saved.db_config.to_value()["host"], json!("db2"));
        assert_eq!(saved.oss_config, before.oss_config);
    }

    #[test]
    fn test_dialog_model_config() {
        let store = store();
        store
            .update_dialog_model("gpt-4", "{\"temperature\": 0.2, \"max_tokens\": 512}", DEFAULT_INVALID_JSON)
            .unwrap();
        let dialog = store.snapshot().dialog;
        assert_eq!(dialog.llm_config.to_value(), json!({"temperature": 0.2, "max_tokens": 512}));

        let err = store
            .update_dialog_model("gpt-3.5-turbo", "{\"max_tokens\": \"lots\"}", DEFAULT_INVALID_JSON)
            .unwrap_err();
        assert!(matches!(err, RuntimeConfigError::InvalidJson(_)));
        assert_eq!(
            store.snapshot().dialog.models[1].config.to_value()["max_tokens"],
            json!(2048)
        );
    }
}
