// [[FLEET]]/apps/fleet-console/src/documents.rs
// Purpose: Typed views over the free-form JSON configuration blobs (storage, models, ingestion).
// Architecture: Domain Model Layer
// Dependencies: Serde, serde_json

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which schema a configuration blob is expected to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    Db,
    Oss,
    Redis,
    Model,
    Ingestion,
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub database: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OssConfig {
    pub endpoint: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sampling parameters of an LLM or vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A configuration blob. Serializes to exactly the JSON object the user wrote.
///
/// Deserialization always yields `Passthrough`; [`ConfigDocument::classify`] upgrades a blob to
/// its typed variant when it matches the schema of the requested kind. Anything that does not
/// match (or would not survive a round trip unchanged) stays `Passthrough`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    Db(DbConfig),
    Oss(OssConfig),
    Redis(RedisConfig),
    Model(ModelConfig),
    Ingestion(IngestionConfig),
    Passthrough(Value),
}

impl Default for ConfigDocument {
    fn default() -> Self {
        ConfigDocument::Passthrough(Value::Object(Map::new()))
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ConfigDocument::Passthrough)
    }
}

impl From<Value> for ConfigDocument {
    fn from(value: Value) -> Self {
        ConfigDocument::Passthrough(value)
    }
}

impl ConfigDocument {
    pub fn classify(kind: ConfigKind, value: Value) -> Self {
        let typed = match kind {
            ConfigKind::Db => typed_as(&value).map(ConfigDocument::Db),
            ConfigKind::Oss => typed_as(&value).map(ConfigDocument::Oss),
            ConfigKind::Redis => typed_as(&value).map(ConfigDocument::Redis),
            ConfigKind::Model => typed_as(&value).map(ConfigDocument::Model),
            ConfigKind::Ingestion => typed_as(&value).map(ConfigDocument::Ingestion),
            ConfigKind::Passthrough => None,
        };

        match typed {
            Some(doc) if doc.to_value() == value => doc,
            _ => ConfigDocument::Passthrough(value),
        }
    }

    /// Re-run classification against `kind`, e.g. after a payload was deserialized.
    pub fn reclassify(self, kind: ConfigKind) -> Self {
        let value = self.to_value();
        Self::classify(kind, value)
    }

    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigDocument::Db(_) => ConfigKind::Db,
            ConfigDocument::Oss(_) => ConfigKind::Oss,
            ConfigDocument::Redis(_) => ConfigKind::Redis,
            ConfigDocument::Model(_) => ConfigKind::Model,
            ConfigDocument::Ingestion(_) => ConfigKind::Ingestion,
            ConfigDocument::Passthrough(_) => ConfigKind::Passthrough,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ConfigDocument::Passthrough(v) => v.clone(),
            other => serde_json::to_value(other).unwrap_or(Value::Null),
        }
    }
}

fn typed_as<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_db_config_is_typed() {
        let value = json!({
            "host": "db.example.com",
            "port": 5432,
            "username": "agent_user",
            "database": "agent_db"
        });
        let doc = ConfigDocument::classify(ConfigKind::Db, value.clone());
        match &doc {
            ConfigDocument::Db(db) => {
                assert_eq!(db.port, 5432);
                assert_eq!(db.database, "agent_db");
            }
            other => panic!("expected Db, got {:?}", other),
        }
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
    }

    #[test]
    fn test_unknown_fields_survive() {
        let value = json!({"host": "redis.example.com", "port": 6379, "db": 0, "tls": true});
        let doc = ConfigDocument::classify(ConfigKind::Redis, value.clone());
        assert_eq!(doc.kind(), ConfigKind::Redis);
        assert_eq!(doc.to_value(), value);
    }

    #[test]
    fn test_mismatch_falls_back_to_passthrough() {
        // port as string does not fit the redis schema
        let value = json!({"host": "redis", "port": "6379"});
        let doc = ConfigDocument::classify(ConfigKind::Redis, value.clone());
        assert_eq!(doc, ConfigDocument::Passthrough(value));

        // explicit null would be dropped by the typed form, so it stays verbatim
        let value = json!({"host": "db", "port": 1, "database": "x", "username": null});
        assert_eq!(ConfigDocument::classify(ConfigKind::Db, value).kind(), ConfigKind::Passthrough);
    }

    #[test]
    fn test_deserialize_then_reclassify() {
        let doc: ConfigDocument = serde_json::from_str(r#"{"fps": 15, "resolution": "720p"}"#).unwrap();
        assert_eq!(doc.kind(), ConfigKind::Passthrough);
        let doc = doc.reclassify(ConfigKind::Ingestion);
        assert_eq!(doc.kind(), ConfigKind::Ingestion);
    }
}
