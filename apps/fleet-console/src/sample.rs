// [[FLEET]]/apps/fleet-console/src/sample.rs
// Purpose: Seed data standing in for a backend (templates, agents, runtime config).
// Architecture: Fixture Layer
// Dependencies: serde_json

use serde_json::{json, Value};

use crate::documents::{ConfigDocument, ConfigKind};
use crate::models::*;
use crate::params::ParameterMap;

/// Hosts a newly assigned task can run on; the first one is the default.
pub const AVAILABLE_HOSTS: [&str; 3] = ["engine-01", "engine-02", "engine-03"];

fn pretty(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

fn params(entries: &[(&str, ParameterType, &str, &str)]) -> ParameterMap<TaskParameter> {
    entries
        .iter()
        .map(|(key, kind, description, default)| {
            (
                key.to_string(),
                TaskParameter::new(*kind, *description).with_default(*default),
            )
        })
        .collect()
}

fn values(entries: &[(&str, &str)]) -> ParameterMap<String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn task_templates() -> Vec<TaskSpec> {
    vec![
        TaskSpec {
            id: Some("task-1".to_string()),
            name: "Website Monitoring Template".to_string(),
            task_type: TaskType::Monitor,
            category: TaskCategory::Routine,
            description: "Monitor website availability and response time".to_string(),
            specification: pretty(json!({
                "rules": [
                    { "type": "availability", "threshold": 99.9 },
                    { "type": "responseTime", "threshold": 200 }
                ],
                "actions": [{ "type": "alert", "target": "email" }]
            })),
            parameters: params(&[
                ("check_interval", ParameterType::Int, "Interval between checks in seconds", "300"),
                ("timeout", ParameterType::Int, "Request timeout in seconds", "30"),
                ("retry_count", ParameterType::Int, "Number of retries on failure", "3"),
            ]),
        },
        TaskSpec {
            id: Some("task-2".to_string()),
            name: "Data Ingestion Template".to_string(),
            task_type: TaskType::Ingest,
            category: TaskCategory::Routine,
            description: "Ingest data from API endpoints into the database".to_string(),
            specification: pretty(json!({
                "sources": [{ "type": "rest", "endpoint": "https://api.example.com/data" }],
                "destination": { "type": "database", "table": "raw_data" }
            })),
            parameters: params(&[
                ("batch_size", ParameterType::Int, "Number of records to process in each batch", "1000"),
                ("sync_interval", ParameterType::Int, "Synchronization interval in seconds", "3600"),
                ("max_retries", ParameterType::Int, "Maximum number of retry attempts", "5"),
            ]),
        },
        TaskSpec {
            id: Some("task-3".to_string()),
            name: "System Analysis Template".to_string(),
            task_type: TaskType::Analyze,
            category: TaskCategory::OneTime,
            description: "Analyze system performance metrics".to_string(),
            specification: pretty(json!({
                "metrics": ["cpu", "memory", "disk", "network"],
                "period": "hourly",
                "aggregation": "average"
            })),
            parameters: params(&[
                ("analysis_depth", ParameterType::Str, "Level of analysis detail", "detailed"),
                ("report_format", ParameterType::Str, "Output format for the report", "pdf"),
                ("include_recommendations", ParameterType::Bool, "Whether to include recommendations in the report", "true"),
            ]),
        },
    ]
}

/// A task that can be assigned to an agent, with its default parameter values.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssignableTask {
    pub id: String,
    pub name: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub description: String,
    pub parameters: ParameterMap<String>,
}

/// Catalog offered when assigning tasks to an agent. Only routine tasks are assignable.
pub fn assignable_tasks() -> Vec<AssignableTask> {
    let catalog = vec![
        AssignableTask {
            id: "task-1".to_string(),
            name: "Camera Feed Analysis".to_string(),
            task_type: TaskType::Monitor,
            category: TaskCategory::Routine,
            description: "Analyzes camera feeds for objects and events".to_string(),
            parameters: values(&[("detection_threshold", "0.75"), ("frame_rate", "15"), ("max_objects", "10")]),
        },
        AssignableTask {
            id: "task-2".to_string(),
            name: "Motion Detection".to_string(),
            task_type: TaskType::Monitor,
            category: TaskCategory::Routine,
            description: "Detects motion in video streams".to_string(),
            parameters: values(&[("sensitivity", "medium"), ("min_area", "100"), ("cooldown_period", "5")]),
        },
        AssignableTask {
            id: "task-6".to_string(),
            name: "Metric Collection".to_string(),
            task_type: TaskType::Monitor,
            category: TaskCategory::Routine,
            description: "Collects system and application metrics".to_string(),
            parameters: values(&[("collection_interval", "60"), ("metrics_types", "cpu,memory,disk"), ("retention_days", "30")]),
        },
    ];
    catalog
        .into_iter()
        .filter(|t| t.category == TaskCategory::Routine)
        .collect()
}

fn task(id: &str, name: &str, status: TaskStatus, host: &str, reason: &str, parameters: Option<&[(&str, &str)]>) -> AgentTask {
    AgentTask {
        id: id.to_string(),
        name: name.to_string(),
        status,
        host: host.to_string(),
        reason: Some(reason.to_string()),
        parameters: parameters.map(values),
    }
}

pub fn agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "agent-001".to_string(),
            name: "Video Surveillance Agent".to_string(),
            description: "Video surveillance monitoring agent".to_string(),
            status: AgentStatus::Active,
            tasks: vec![
                task("task-1", "Camera Feed Analysis", TaskStatus::Running, "engine-01", "Running normally",
                    Some(&[("detection_threshold", "0.75"), ("frame_rate", "15"), ("max_objects", "10")])),
                task("task-2", "Motion Detection", TaskStatus::Stopped, "engine-02", "Manually stopped",
                    Some(&[("sensitivity", "medium"), ("min_area", "100"), ("cooldown_period", "5")])),
            ],
            config: json!({
                "detection_threshold": 0.75,
                "frame_rate": 15,
                "notification_endpoint": "https://api.example.com/notifications"
            })
            .into(),
            memory_schema: vec!["detection_events".to_string(), "person_tracking".to_string()],
        },
        Agent {
            id: "agent-002".to_string(),
            name: "Data Processing Agent".to_string(),
            description: "Data processing agent".to_string(),
            status: AgentStatus::Disabled,
            tasks: vec![
                task("task-3", "Data Ingestion", TaskStatus::Stopped, "engine-01", "Agent disabled", None),
                task("task-4", "Data Transformation", TaskStatus::Stopped, "engine-03", "Agent disabled", None),
                task("task-5", "Data Export", TaskStatus::Stopped, "engine-02", "Agent disabled", None),
            ],
            config: json!({ "batch_size": 100, "processing_interval": 300, "output_format": "json" }).into(),
            memory_schema: vec![
                "raw_data".to_string(),
                "processed_data".to_string(),
                "export_logs".to_string(),
            ],
        },
        Agent {
            id: "agent-003".to_string(),
            name: "Anomaly Detection Agent".to_string(),
            description: "Anomaly detection agent".to_string(),
            status: AgentStatus::Active,
            tasks: vec![
                task("task-6", "Metric Collection", TaskStatus::Running, "engine-02", "Running normally",
                    Some(&[("collection_interval", "60"), ("metrics_types", "cpu,memory,disk"), ("retention_days", "30")])),
                task("task-7", "Anomaly Analysis", TaskStatus::Error, "engine-03", "Execution error: Out of memory", None),
            ],
            config: json!({ "sensitivity": "high", "baseline_period": "7d", "alert_threshold": 3 }).into(),
            memory_schema: vec!["metrics".to_string(), "anomalies".to_string(), "alerts".to_string()],
        },
    ]
}

fn model_config(temperature: f64, max_tokens: u32, top_p: f64) -> ConfigDocument {
    ConfigDocument::classify(
        ConfigKind::Model,
        json!({ "temperature": temperature, "max_tokens": max_tokens, "top_p": top_p }),
    )
}

pub fn runtime_config() -> AgentRuntimeConfig {
    AgentRuntimeConfig {
        engines: vec![
            TaskEngine { hostname: "engine-01".to_string(), ip: "192.168.1.101".to_string(), status: EngineStatus::Connected, engine_type: EngineType::Vsi },
            TaskEngine { hostname: "engine-02".to_string(), ip: "192.168.1.102".to_string(), status: EngineStatus::Disconnected, engine_type: EngineType::Modelplus },
            TaskEngine { hostname: "engine-03".to_string(), ip: "192.168.1.103".to_string(), status: EngineStatus::Unknown, engine_type: EngineType::Roboflow },
        ],
        storage: StorageConfig {
            db_config: json!({ "host": "db.example.com", "port": 5432, "username": "agent_user", "database": "agent_db" }).into(),
            oss_config: json!({ "endpoint": "oss.example.com", "bucket": "agent-data", "region": "us-west-1" }).into(),
            redis_config: json!({ "host": "redis.example.com", "port": 6379, "db": 0 }).into(),
        }
        .classified(),
        dialog: DialogConfig {
            llm_model: "gpt-4".to_string(),
            llm_config: model_config(0.7, 1024, 0.9),
            models: vec![
                DialogModel { name: "gpt-4".to_string(), config: model_config(0.7, 1024, 0.9) },
                DialogModel { name: "gpt-3.5-turbo".to_string(), config: model_config(0.9, 2048, 1.0) },
            ],
        },
        video_sources: vec![
            VideoSource {
                id: "cam-01".to_string(),
                uri: "rtsp://192.168.1.201/stream1".to_string(),
                source_type: Some(VideoSourceType::Camera),
                ingestion_config: ConfigDocument::classify(ConfigKind::Ingestion, json!({ "fps": 15, "resolution": "720p" })),
            },
            VideoSource {
                id: "cam-02".to_string(),
                uri: "rtsp://192.168.1.202/stream1".to_string(),
                source_type: Some(VideoSourceType::Camera),
                ingestion_config: ConfigDocument::classify(ConfigKind::Ingestion, json!({ "fps": 30, "resolution": "1080p" })),
            },
            VideoSource {
                id: "file-01".to_string(),
                uri: "/path/to/video.mp4".to_string(),
                source_type: Some(VideoSourceType::File),
                ingestion_config: ConfigDocument::classify(ConfigKind::Ingestion, json!({ "loop": true })),
            },
        ],
        models: vec![
            ModelEntry {
                id: "model-01".to_string(),
                name: "Object Detection".to_string(),
                model_type: "vision".to_string(),
                config: json!({ "threshold": 0.5, "classes": ["person", "car"] }).into(),
            },
            ModelEntry {
                id: "model-02".to_string(),
                name: "Face Recognition".to_string(),
                model_type: "vision".to_string(),
                config: json!({ "threshold": 0.7 }).into(),
            },
        ],
        tools: vec![
            Tool { id: "tool-01".to_string(), name: "Image Analyzer".to_string(), description: "Analyzes image content".to_string(), config: json!({ "enabled": true }).into() },
            Tool { id: "tool-02".to_string(), name: "Text Extractor".to_string(), description: "Extracts text from images".to_string(), config: json!({ "enabled": true }).into() },
        ],
    }
}
