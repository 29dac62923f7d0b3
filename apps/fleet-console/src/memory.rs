// [[FLEET]]/apps/fleet-console/src/memory.rs
// Purpose: Agent memory browser: schema tables and ad-hoc SQL queries.
// Architecture: Domain Logic Layer
// Dependencies: tokio-util, serde

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::locale::I18n;
use crate::models::Agent;
use crate::repository::{guarded, FleetRepository, QueryResult, RepositoryError};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query is empty")]
    EmptyQuery,
    #[error(transparent)]
    Failed(#[from] RepositoryError),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Column {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub sql_type: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableStructure {
    pub name: &'static str,
    pub columns: Vec<Column>,
}

fn table(name: &'static str, columns: &[(&'static str, &'static str)]) -> TableStructure {
    TableStructure {
        name,
        columns: columns
            .iter()
            .map(|(name, sql_type)| Column { name, sql_type })
            .collect(),
    }
}

/// Tables stored under a memory schema. Unknown schemas have none.
pub fn table_structures(schema: &str) -> Vec<TableStructure> {
    match schema {
        "detection_events" => vec![
            table(
                "events",
                &[
                    ("id", "INTEGER"),
                    ("timestamp", "DATETIME"),
                    ("object_type", "VARCHAR(50)"),
                    ("confidence", "FLOAT"),
                    ("bbox_x", "INTEGER"),
                    ("bbox_y", "INTEGER"),
                    ("bbox_width", "INTEGER"),
                    ("bbox_height", "INTEGER"),
                ],
            ),
            table(
                "cameras",
                &[
                    ("id", "INTEGER"),
                    ("name", "VARCHAR(100)"),
                    ("location", "VARCHAR(200)"),
                    ("status", "VARCHAR(20)"),
                ],
            ),
        ],
        "person_tracking" => vec![
            table(
                "tracks",
                &[
                    ("id", "INTEGER"),
                    ("person_id", "VARCHAR(50)"),
                    ("timestamp", "DATETIME"),
                    ("x_position", "FLOAT"),
                    ("y_position", "FLOAT"),
                    ("camera_id", "INTEGER"),
                ],
            ),
            table(
                "persons",
                &[
                    ("id", "VARCHAR(50)"),
                    ("first_seen", "DATETIME"),
                    ("last_seen", "DATETIME"),
                    ("total_detections", "INTEGER"),
                ],
            ),
        ],
        "raw_data" => vec![
            table(
                "ingestion_log",
                &[
                    ("id", "INTEGER"),
                    ("source", "VARCHAR(100)"),
                    ("timestamp", "DATETIME"),
                    ("file_path", "VARCHAR(500)"),
                    ("file_size", "BIGINT"),
                    ("status", "VARCHAR(20)"),
                ],
            ),
        ],
        "processed_data" => vec![
            table(
                "processing_results",
                &[
                    ("id", "INTEGER"),
                    ("input_file", "VARCHAR(500)"),
                    ("output_file", "VARCHAR(500)"),
                    ("processing_time", "FLOAT"),
                    ("timestamp", "DATETIME"),
                    ("status", "VARCHAR(20)"),
                ],
            ),
        ],
        "export_logs" => vec![
            table(
                "exports",
                &[
                    ("id", "INTEGER"),
                    ("export_type", "VARCHAR(50)"),
                    ("destination", "VARCHAR(200)"),
                    ("timestamp", "DATETIME"),
                    ("record_count", "INTEGER"),
                    ("status", "VARCHAR(20)"),
                ],
            ),
        ],
        "metrics" => vec![
            table(
                "system_metrics",
                &[
                    ("id", "INTEGER"),
                    ("timestamp", "DATETIME"),
                    ("cpu_usage", "FLOAT"),
                    ("memory_usage", "FLOAT"),
                    ("disk_usage", "FLOAT"),
                    ("network_io", "FLOAT"),
                ],
            ),
        ],
        "anomalies" => vec![
            table(
                "detected_anomalies",
                &[
                    ("id", "INTEGER"),
                    ("timestamp", "DATETIME"),
                    ("anomaly_type", "VARCHAR(100)"),
                    ("severity", "VARCHAR(20)"),
                    ("description", "TEXT"),
                    ("resolved", "BOOLEAN"),
                ],
            ),
        ],
        "alerts" => vec![
            table(
                "alert_history",
                &[
                    ("id", "INTEGER"),
                    ("timestamp", "DATETIME"),
                    ("alert_type", "VARCHAR(50)"),
                    ("message", "TEXT"),
                    ("acknowledged", "BOOLEAN"),
                    ("acknowledged_by", "VARCHAR(100)"),
                ],
            ),
        ],
        _ => Vec::new(),
    }
}

pub fn schemas_of<'a>(agents: &'a [Agent], agent_id: &str) -> Option<&'a [String]> {
    agents
        .iter()
        .find(|a| a.id == agent_id)
        .map(|a| a.memory_schema.as_slice())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaView {
    pub schema: String,
    pub tables: Vec<TableStructure>,
    /// Starter query over the first table, if there is one.
    pub sample_query: Option<String>,
}

pub fn schema_view(schema: &str, i18n: &I18n) -> SchemaView {
    let tables = table_structures(schema);
    let sample_query = tables
        .first()
        .map(|t| i18n.t_with("queryMemory.sampleQuery", &[("schema", schema), ("table", t.name)]));
    SchemaView {
        schema: schema.to_string(),
        tables,
        sample_query,
    }
}

pub async fn run_query(
    repo: &dyn FleetRepository,
    query: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<QueryResult, QueryError> {
    if query.trim().is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let result = guarded(timeout, cancel, repo.execute_query(query)).await?;
    tracing::info!("Query returned {} rows in {} ms", result.row_count, result.execution_time);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::MemoryPreferenceStore;
    use crate::repository::SimulatedRepository;
    use crate::sample;
    use std::sync::Arc;

    #[test]
    fn test_schema_view_sample_query() {
        let i18n = I18n::restore(Arc::new(MemoryPreferenceStore::new()));
        let view = schema_view("metrics", &i18n);
        assert_eq!(view.tables[0].columns.len(), 6);
        assert_eq!(
            view.sample_query.as_deref(),
            Some("SELECT * FROM metrics.system_metrics LIMIT 10;")
        );
        assert!(schema_view("unknown", &i18n).sample_query.is_none());
    }

    #[test]
    fn test_schemas_by_agent() {
        let agents = sample::agents();
        assert_eq!(schemas_of(&agents, "agent-002").map(|s| s.len()), Some(3));
        assert!(schemas_of(&agents, "agent-404").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_is_rejected() {
        let repo = SimulatedRepository::new(Duration::from_millis(1000));
        let err = run_query(&repo, "  \n ", Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyQuery));

        let result = run_query(&repo, "SELECT 1", Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.rows.len(), 3);
    }
}
