// [[FLEET]]/apps/fleet-console/src/monitoring.rs
// Purpose: Monitoring views: agent logs, engine/agent performance series, result dashboards.
// Architecture: Observability Layer
// Dependencies: chrono, rand, serde

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::repository::{guarded, FleetRepository, RepositoryError, ResultMetric};

const SERIES_POINTS: usize = 60;

const LOG_AGENTS: [&str; 3] = ["agent-001", "agent-002", "agent-003"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    const ALL: [LogLevel; 4] = [LogLevel::Info, LogLevel::Warning, LogLevel::Error, LogLevel::Debug];

    fn message(&self, agent_id: &str) -> String {
        match self {
            LogLevel::Info => format!("Agent {} successfully processed data batch.", agent_id),
            LogLevel::Warning => format!(
                "Agent {} encountered a non-critical issue with data processing.",
                agent_id
            ),
            LogLevel::Error => format!(
                "Agent {} failed to connect to the database. Retrying in 5 seconds.",
                agent_id
            ),
            LogLevel::Debug => format!(
                "Agent {} initialized with configuration: {{ verbose: true, timeout: 30s }}.",
                agent_id
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub agent_id: String,
    pub task_id: String,
    pub host_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub level: LogLevel,
}

/// Generate `count` entries spread over the 24 hours before `now`.
pub fn generate_logs<R: Rng>(count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<LogEntry> {
    (0..count)
        .map(|i| {
            let agent_id = LOG_AGENTS[rng.gen_range(0..LOG_AGENTS.len())];
            let level = LogLevel::ALL[rng.gen_range(0..LogLevel::ALL.len())];
            let age = ChronoDuration::hours(rng.gen_range(0..24))
                + ChronoDuration::minutes(rng.gen_range(0..60))
                + ChronoDuration::seconds(rng.gen_range(0..60));
            LogEntry {
                id: format!("log-{}", i),
                agent_id: agent_id.to_string(),
                task_id: format!("task-{}", rng.gen_range(1..=5)),
                host_id: format!("host-{}", rng.gen_range(1..=3)),
                text: level.message(agent_id),
                timestamp: now - age,
                level,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Agent id, or `all` / absent for every agent.
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortDirection,
}

/// Filter by agent, search text/agent/task/host case-insensitively, then sort by time.
pub fn query_logs(logs: &[LogEntry], query: &LogQuery) -> Vec<LogEntry> {
    let agent = query.agent.as_deref().filter(|a| !a.is_empty() && *a != "all");
    let term = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<LogEntry> = logs
        .iter()
        .filter(|log| agent.map_or(true, |a| log.agent_id == a))
        .filter(|log| match &term {
            Some(term) => [&log.text, &log.agent_id, &log.task_id, &log.host_id]
                .iter()
                .any(|field| field.to_lowercase().contains(term.as_str())),
            None => true,
        })
        .cloned()
        .collect();

    match query.sort {
        SortDirection::Asc => matched.sort_by_key(|l| l.timestamp),
        SortDirection::Desc => matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }
    matched
}

/// One metric over the last hour at one-minute intervals.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricSeries {
    pub values: Vec<u32>,
    pub current: u32,
    pub average: f64,
}

impl MetricSeries {
    fn sample<R: Rng>(rng: &mut R, min: u32, max: u32) -> Self {
        let values: Vec<u32> = (0..SERIES_POINTS)
            .map(|_| if max == 0 { 0 } else { rng.gen_range(min..=max) })
            .collect();
        Self::from_values(values)
    }

    pub fn from_values(values: Vec<u32>) -> Self {
        let current = values.last().copied().unwrap_or(0);
        let average = if values.is_empty() {
            0.0
        } else {
            values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
        };
        Self {
            values,
            current,
            average,
        }
    }
}

fn minute_timestamps(now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    (0..SERIES_POINTS)
        .map(|i| now - ChronoDuration::minutes((SERIES_POINTS - i) as i64))
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Connected,
    Warning,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSpecs {
    pub cpu_cores: u32,
    /// GB
    pub memory_total: u32,
    pub disk_total: u32,
    pub gpu_model: String,
    pub gpu_memory: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnginePerformance {
    pub id: String,
    pub hostname: String,
    pub status: HealthStatus,
    pub running_tasks: u32,
    pub total_tasks: u32,
    pub specs: EngineSpecs,
    pub cpu: MetricSeries,
    pub memory: MetricSeries,
    pub disk: MetricSeries,
    pub gpu: MetricSeries,
    pub timestamps: Vec<DateTime<Utc>>,
}

type Range = (u32, u32);

struct EngineProfile {
    id: &'static str,
    status: HealthStatus,
    tasks: (u32, u32),
    specs: (u32, u32, u32, &'static str, u32),
    ranges: [Range; 4],
}

const ENGINE_PROFILES: [EngineProfile; 4] = [
    EngineProfile {
        id: "engine-01",
        status: HealthStatus::Connected,
        tasks: (3, 5),
        specs: (16, 64, 1024, "NVIDIA A100", 40),
        ranges: [(20, 80), (30, 70), (40, 60), (10, 90)],
    },
    EngineProfile {
        id: "engine-02",
        status: HealthStatus::Warning,
        tasks: (4, 4),
        specs: (32, 128, 2048, "NVIDIA A6000", 48),
        ranges: [(40, 95), (50, 85), (60, 75), (30, 80)],
    },
    EngineProfile {
        id: "engine-03",
        status: HealthStatus::Disconnected,
        tasks: (0, 3),
        specs: (8, 32, 512, "NVIDIA T4", 16),
        ranges: [(0, 0), (0, 0), (0, 0), (0, 0)],
    },
    EngineProfile {
        id: "engine-04",
        status: HealthStatus::Connected,
        tasks: (2, 6),
        specs: (24, 96, 1536, "NVIDIA RTX A5000", 24),
        ranges: [(15, 65), (25, 55), (35, 45), (5, 85)],
    },
];

pub fn engine_performance<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Vec<EnginePerformance> {
    ENGINE_PROFILES
        .iter()
        .map(|p| {
            let (cpu_cores, memory_total, disk_total, gpu_model, gpu_memory) = p.specs;
            let [cpu, memory, disk, gpu] = p.ranges;
            EnginePerformance {
                id: p.id.to_string(),
                hostname: format!("{}.avis.local", p.id),
                status: p.status,
                running_tasks: p.tasks.0,
                total_tasks: p.tasks.1,
                specs: EngineSpecs {
                    cpu_cores,
                    memory_total,
                    disk_total,
                    gpu_model: gpu_model.to_string(),
                    gpu_memory,
                },
                cpu: MetricSeries::sample(rng, cpu.0, cpu.1),
                memory: MetricSeries::sample(rng, memory.0, memory.1),
                disk: MetricSeries::sample(rng, disk.0, disk.1),
                gpu: MetricSeries::sample(rng, gpu.0, gpu.1),
                timestamps: minute_timestamps(now),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentTotals {
    pub frames_analyzed: u64,
    pub events_generated: u64,
    pub alerts_generated: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub frames_analyzed: MetricSeries,
    pub events_generated: MetricSeries,
    pub alerts_generated: MetricSeries,
    pub timestamps: Vec<DateTime<Utc>>,
    pub totals: AgentTotals,
}

pub fn agent_performance<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Vec<AgentPerformance> {
    let profiles: [(&str, &str, [Range; 3], (u64, u64, u64)); 4] = [
        ("agent-001", "Video Surveillance Agent", [(100, 500), (5, 20), (0, 5)], (15782, 423, 47)),
        ("agent-002", "Data Processing Agent", [(50, 300), (10, 30), (1, 8)], (8945, 612, 89)),
        (
            "agent-003",
            "Anomaly Detection Agent",
            [(200, 600), (15, 40), (2, 10)],
            (21456, 876, 124),
        ),
        ("agent-004", "Security Monitoring Agent", [(0, 0), (0, 0), (0, 0)], (0, 0, 0)),
    ];
    profiles
        .iter()
        .map(|(id, name, [frames, events, alerts], totals)| AgentPerformance {
            id: id.to_string(),
            name: name.to_string(),
            active: frames.1 > 0,
            frames_analyzed: MetricSeries::sample(rng, frames.0, frames.1),
            events_generated: MetricSeries::sample(rng, events.0, events.1),
            alerts_generated: MetricSeries::sample(rng, alerts.0, alerts.1),
            timestamps: minute_timestamps(now),
            totals: AgentTotals {
                frames_analyzed: totals.0,
                events_generated: totals.1,
                alerts_generated: totals.2,
            },
        })
        .collect()
}

/// An agent card on the result dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultAgent {
    pub id: &'static str,
    pub name: &'static str,
    pub active: bool,
    pub dashboards: [&'static str; 4],
}

pub const RESULT_AGENTS: [ResultAgent; 3] = [
    ResultAgent {
        id: "security-camera",
        name: "Security Camera Agent",
        active: true,
        dashboards: ["Default", "Detailed", "Security Focus", "Performance"],
    },
    ResultAgent {
        id: "traffic-monitor",
        name: "Traffic Monitor Agent",
        active: true,
        dashboards: ["Default", "Traffic Flow", "Violations", "Speed Analysis"],
    },
    ResultAgent {
        id: "warehouse-analytics",
        name: "Warehouse Analytics Agent",
        active: false,
        dashboards: ["Default", "Safety", "Productivity", "Inventory"],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct ResultPanel {
    pub agent_id: String,
    pub dashboard: String,
    pub metrics: Vec<ResultMetric>,
}

/// Load the metric cards of one result dashboard; `None` selects `Default`.
pub async fn load_results(
    repo: &dyn FleetRepository,
    agent_id: &str,
    dashboard: Option<&str>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ResultPanel, RepositoryError> {
    let dashboard = dashboard.unwrap_or("Default");
    let metrics = guarded(timeout, cancel, repo.fetch_result_metrics(agent_id, dashboard)).await?;
    Ok(ResultPanel {
        agent_id: agent_id.to_string(),
        dashboard: dashboard.to_string(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SimulatedRepository;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(id: &str, agent: &str, text: &str, minutes_ago: i64) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            agent_id: agent.to_string(),
            task_id: "task-1".to_string(),
            host_id: "host-2".to_string(),
            text: text.to_string(),
            timestamp: Utc::now() - ChronoDuration::minutes(minutes_ago),
            level: LogLevel::Info,
        }
    }

    #[test]
    fn test_generated_logs_within_last_day() {
        let now = Utc::now();
        let logs = generate_logs(50, now, &mut StdRng::seed_from_u64(7));
        assert_eq!(logs.len(), 50);
        for log in &logs {
            assert!(log.timestamp <= now);
            assert!(now - log.timestamp < ChronoDuration::hours(25));
            assert!(log.text.contains(&log.agent_id));
        }
    }

    #[test]
    fn test_query_filters_and_sorts() {
        let logs = vec![
            entry("log-0", "agent-001", "Batch done", 30),
            entry("log-1", "agent-002", "DATABASE unreachable", 10),
            entry("log-2", "agent-001", "database retry", 20),
        ];

        let all = query_logs(&logs, &LogQuery { agent: Some("all".to_string()), ..Default::default() });
        assert_eq!(all.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["log-1", "log-2", "log-0"]);

        let searched = query_logs(&logs, &LogQuery {
            search: Some("Database".to_string()),
            sort: SortDirection::Asc,
            ..Default::default()
        });
        assert_eq!(searched.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["log-2", "log-1"]);

        let by_agent = query_logs(&logs, &LogQuery {
            agent: Some("agent-001".to_string()),
            search: Some("host-2".to_string()),
            ..Default::default()
        });
        assert_eq!(by_agent.len(), 2);
    }

    #[test]
    fn test_disconnected_engine_is_flat() {
        let engines = engine_performance(Utc::now(), &mut StdRng::seed_from_u64(1));
        assert_eq!(engines.len(), 4);
        let offline = &engines[2];
        assert_eq!(offline.status, HealthStatus::Disconnected);
        assert!(offline.cpu.values.iter().all(|v| *v == 0));
        let busy = &engines[1];
        assert_eq!(busy.cpu.values.len(), 60);
        assert!(busy.cpu.values.iter().all(|v| (40..=95).contains(v)));
        assert_eq!(busy.timestamps.len(), 60);
    }

    #[test]
    fn test_series_summary() {
        let series = MetricSeries::from_values(vec![10, 20, 60]);
        assert_eq!(series.current, 60);
        assert!((series.average - 30.0).abs() < f64::EPSILON);
        let agents = agent_performance(Utc::now(), &mut StdRng::seed_from_u64(3));
        assert!(!agents[3].active);
        assert_eq!(agents[0].totals.frames_analyzed, 15782);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_dashboard_metrics() {
        let repo = SimulatedRepository::new(Duration::from_millis(800));
        let token = CancellationToken::new();
        let panel = load_results(&repo, "traffic-monitor", None, Duration::from_secs(5), &token)
            .await
            .unwrap();
        assert_eq!(panel.dashboard, "Default");
        assert_eq!(panel.metrics.len(), 6);
        assert_eq!(panel.metrics[0].name, "Vehicle Count");
    }
}
