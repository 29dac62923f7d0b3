// [[FLEET]]/apps/fleet-console/src/repository.rs
// Purpose: Data-access seam. Every "backend" call goes through here with timeout + cancellation.
// Architecture: Infrastructure Layer
// Dependencies: async-trait, tokio, tokio-util, rand

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::models::Agent;
use crate::sample;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub execution_time: u64,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMetric {
    pub name: String,
    pub value: Value,
}

/// Backend operations the console depends on.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    async fn fetch_agents(&self) -> Result<Vec<Agent>, RepositoryError>;
    async fn sign_in(&self, email: &str) -> Result<(), RepositoryError>;
    async fn execute_query(&self, query: &str) -> Result<QueryResult, RepositoryError>;
    async fn agent_reply(&self, agent_name: &str, message: &str) -> Result<(), RepositoryError>;
    async fn fetch_result_metrics(&self, agent_id: &str, dashboard: &str) -> Result<Vec<ResultMetric>, RepositoryError>;
}

/// Run a repository call under the request timeout, resolving early on cancellation.
pub async fn guarded<T, F>(
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        result = tokio::time::timeout(timeout, call) => {
            result.map_err(|_| RepositoryError::Timeout(timeout))?
        }
    }
}

/// In-memory backend that answers after a fixed delay.
pub struct SimulatedRepository {
    latency: Duration,
    fail_next: AtomicBool,
}

impl SimulatedRepository {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next call fail, to exercise the error/retry path.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    async fn respond(&self) -> Result<(), RepositoryError> {
        tokio::time::sleep(self.latency).await;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            tracing::warn!("Simulated backend failure");
            return Err(RepositoryError::Unavailable("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FleetRepository for SimulatedRepository {
    async fn fetch_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        self.respond().await?;
        Ok(sample::agents())
    }

    async fn sign_in(&self, email: &str) -> Result<(), RepositoryError> {
        self.respond().await?;
        tracing::info!("Simulated sign-in for {}", email);
        Ok(())
    }

    async fn execute_query(&self, query: &str) -> Result<QueryResult, RepositoryError> {
        self.respond().await?;
        tracing::debug!("Simulated query: {}", query);
        let rows = vec![
            json!({ "id": 1, "timestamp": "2024-01-15 10:30:00", "object_type": "person", "confidence": 0.95 }),
            json!({ "id": 2, "timestamp": "2024-01-15 10:31:15", "object_type": "vehicle", "confidence": 0.87 }),
            json!({ "id": 3, "timestamp": "2024-01-15 10:32:30", "object_type": "person", "confidence": 0.92 }),
        ];
        let columns = ["id", "timestamp", "object_type", "confidence"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Ok(QueryResult {
            columns,
            row_count: rows.len(),
            rows,
            execution_time: rand::thread_rng().gen_range(10..110),
        })
    }

    async fn agent_reply(&self, agent_name: &str, _message: &str) -> Result<(), RepositoryError> {
        self.respond().await?;
        tracing::debug!("Simulated reply ready for {}", agent_name);
        Ok(())
    }

    async fn fetch_result_metrics(&self, agent_id: &str, dashboard: &str) -> Result<Vec<ResultMetric>, RepositoryError> {
        // 800..1200 ms with the default latency
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..400));
        tokio::time::sleep(jitter).await;
        self.respond().await?;
        tracing::debug!("Simulated metrics for {} ({})", agent_id, dashboard);

        let mut rng = rand::thread_rng();
        let metric = |name: &str, value: Value| ResultMetric {
            name: name.to_string(),
            value,
        };
        let metrics = match agent_id {
            "traffic-monitor" => vec![
                metric("Vehicle Count", json!(rng.gen_range(50..250))),
                metric("Max Car Speed", json!(format!("{}km/h", rng.gen_range(60..100)))),
                metric("Traffic Violations", json!(rng.gen_range(0..10))),
                metric("Avg Car Speed", json!(format!("{}km/h", rng.gen_range(40..60)))),
                metric("Congestion Level", json!(format!("{}%", rng.gen_range(20..80)))),
                metric("Peak Traffic Time", json!(format!("{}:00", rng.gen_range(7..19)))),
            ],
            "warehouse-analytics" => vec![
                metric("Workers Present", json!(rng.gen_range(5..25))),
                metric("Safety Violations", json!(rng.gen_range(0..3))),
                metric("Equipment Usage", json!(format!("{}%", rng.gen_range(60..100)))),
                metric("Inventory Movements", json!(rng.gen_range(20..70))),
                metric("Avg Task Duration", json!(format!("{}min", rng.gen_range(15..45)))),
                metric("Efficiency Score", json!(format!("{}%", rng.gen_range(80..100)))),
            ],
            _ => vec![
                metric("People Detected", json!(rng.gen_range(10..60))),
                metric("Avg Stay Duration", json!(format!("{}min", rng.gen_range(5..35)))),
                metric("Suspicious Activities", json!(rng.gen_range(0..5))),
                metric("Crowd Density", json!(format!("{}%", rng.gen_range(20..60)))),
                metric("Face Recognition Rate", json!(format!("{}%", rng.gen_range(80..100)))),
                metric("Last Alert", json!(format!("{}min ago", rng.gen_range(0..60)))),
            ],
        };
        Ok(metrics)
    }
}
