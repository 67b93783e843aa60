//! Health checks
//!
//! `/health/live` only proves the process answers; `/health` and `/health/ready` ping the
//! database and return 503 while it is unreachable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use flex_core::config::StorageBackend;
use flex_db::Database;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for the database ping
    pub check_timeout: Duration,
    /// How long a report is reused
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(2),
            cache_duration: Duration::from_secs(5),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    storage: StorageBackend,
    database: Option<Database>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, storage: StorageBackend) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            storage,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        *self.cache.write().await = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let storage = match &self.database {
            Some(db) => self.check_database(db).await,
            None => ComponentHealth {
                name: "storage".to_string(),
                status: match self.storage {
                    StorageBackend::Memory => HealthStatus::Healthy,
                    StorageBackend::Postgres => HealthStatus::Unhealthy,
                },
                message: Some(match self.storage {
                    StorageBackend::Memory => "in-memory".to_string(),
                    StorageBackend::Postgres => "no database pool".to_string(),
                }),
                response_time_ms: 0,
            },
        };

        HealthReport {
            status: storage.status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components: vec![storage],
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_database(&self, db: &Database) -> ComponentHealth {
        let start = Instant::now();

        let (status, message) = match tokio::time::timeout(self.config.check_timeout, db.ping()).await {
            Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
            Ok(Err(e)) => {
                warn!(error = %e, "Database health check failed");
                (HealthStatus::Unhealthy, e.to_string())
            }
            Err(_) => {
                warn!("Database health check timed out");
                (HealthStatus::Unhealthy, "timed out".to_string())
            }
        };

        ComponentHealth {
            name: "database".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check
pub async fn readiness(State(health): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = health.check().await;
    (report.http_status(), Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_is_healthy() {
        let checker = HealthChecker::new(HealthConfig::default(), StorageBackend::Memory);
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.components[0].name, "storage");
    }

    #[tokio::test]
    async fn test_postgres_without_pool_is_unhealthy() {
        let checker = HealthChecker::new(HealthConfig::default(), StorageBackend::Postgres);
        let report = checker.check().await;

        assert_eq!(report.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_cache() {
        let checker = HealthChecker::new(
            HealthConfig {
                cache_duration: Duration::from_secs(60),
                ..Default::default()
            },
            StorageBackend::Memory,
        );

        let first = checker.check().await;
        let second = checker.check().await;
        assert_eq!(first.timestamp, second.timestamp);
    }
}
