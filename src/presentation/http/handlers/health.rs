//! Health Handlers
//!
//! `/health` and `/health/live` answer without touching any dependency.
//! `/health/ready` pings PostgreSQL and, when rate limiting is on, Redis.

use std::future::Future;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::startup::AppState;

static STARTED: Lazy<Instant> = Lazy::new(Instant::now);

const DB_SLOW_AFTER: Duration = Duration::from_millis(100);
const REDIS_SLOW_AFTER: Duration = Duration::from_millis(50);

/// Pin the uptime clock to server start.
pub fn init_server_start() {
    Lazy::force(&STARTED);
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// Switched off by configuration
    Disabled,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Check {
    fn disabled() -> Self {
        Self {
            status: HealthStatus::Disabled,
            latency_ms: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: Check,
    /// Backs the rate limiter only
    pub redis: Check,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub gateway_sessions: usize,
    pub checks: ReadinessChecks,
}

pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "healthy",
        version: Some(env!("CARGO_PKG_VERSION")),
    })
}

pub async fn liveness() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive",
        version: None,
    })
}

/// 503 when the database is unreachable; everything else only degrades.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = timed(
        sqlx::query("SELECT 1").execute(&state.db),
        DB_SLOW_AFTER,
    )
    .await;

    let redis = match state.redis.clone() {
        Some(mut conn) => {
            timed(
                async move { redis::cmd("PING").query_async::<String>(&mut conn).await },
                REDIS_SLOW_AFTER,
            )
            .await
        }
        None => Check::disabled(),
    };

    let checks = ReadinessChecks { database, redis };
    let status = overall(&checks);
    if status != HealthStatus::Healthy {
        tracing::warn!(?status, "Readiness check not healthy");
    }

    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: STARTED.elapsed().as_secs(),
        gateway_sessions: state.gateway.session_count(),
        checks,
    };

    (code, Json(body))
}

async fn timed<F, T, E>(ping: F, slow_after: Duration) -> Check
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    match ping.await {
        Ok(_) => {
            let elapsed = start.elapsed();
            Check {
                status: if elapsed < slow_after {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                latency_ms: Some(elapsed.as_millis() as u64),
                error: None,
            }
        }
        Err(e) => Check {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    }
}

fn overall(checks: &ReadinessChecks) -> HealthStatus {
    match (checks.database.status, checks.redis.status) {
        (HealthStatus::Unhealthy, _) => HealthStatus::Unhealthy,
        (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded | HealthStatus::Unhealthy) => {
            HealthStatus::Degraded
        }
        _ => HealthStatus::Healthy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn check(status: HealthStatus) -> Check {
        Check {
            status,
            latency_ms: None,
            error: None,
        }
    }

    #[test_case(HealthStatus::Healthy, HealthStatus::Healthy => HealthStatus::Healthy)]
    #[test_case(HealthStatus::Healthy, HealthStatus::Disabled => HealthStatus::Healthy ; "redis disabled")]
    #[test_case(HealthStatus::Degraded, HealthStatus::Disabled => HealthStatus::Degraded ; "slow database")]
    #[test_case(HealthStatus::Healthy, HealthStatus::Unhealthy => HealthStatus::Degraded ; "redis down")]
    #[test_case(HealthStatus::Unhealthy, HealthStatus::Healthy => HealthStatus::Unhealthy ; "database down")]
    fn test_overall(database: HealthStatus, redis: HealthStatus) -> HealthStatus {
        overall(&ReadinessChecks {
            database: check(database),
            redis: check(redis),
        })
    }

    #[tokio::test]
    async fn test_timed_failure_is_unhealthy() {
        let result = timed(async { Err::<(), _>("refused") }, DB_SLOW_AFTER).await;
        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert_eq!(result.error.as_deref(), Some("refused"));
    }

    #[tokio::test]
    async fn test_timed_slow_ping_is_degraded() {
        let result = timed(async { Ok::<_, String>(()) }, Duration::ZERO).await;
        assert_eq!(result.status, HealthStatus::Degraded);
        assert!(result.latency_ms.is_some());
    }

    #[test]
    fn test_disabled_serializes_lowercase() {
        let json = serde_json::to_value(Check::disabled()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "disabled" }));
    }
}
