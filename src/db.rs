use std::time::Duration;

use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
#[error("Database unavailable")]
pub struct DbUnavailable;

impl From<DbUnavailable> for (StatusCode, String) {
    fn from(e: DbUnavailable) -> Self {
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    }
}

/// Shared connection pool that may be missing.
///
/// Startup never fails on a dead database: the handle is kept empty and every
/// caller goes through [`Database::pool`], which turns the missing pool into a
/// recoverable [`DbUnavailable`].
#[derive(Clone, Default)]
pub struct Database {
    pool: Option<PgPool>,
}

impl Database {
    pub async fn connect(url: &str) -> Self {
        let res = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await;
        match res {
            Ok(pool) => {
                info!("connected to database");
                Self { pool: Some(pool) }
            }
            Err(e) => {
                warn!(error = %e, "database connection failed; persistence disabled");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { pool: None }
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pool(&self) -> Result<&PgPool, DbUnavailable> {
        self.pool.as_ref().ok_or(DbUnavailable)
    }
}

/// `?limit=&offset=` query for history listings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    const MAX_LIMIT: i64 = 100;

    /// Limit and offset as bound into queries.
    pub fn bounds(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_database_reports_503() {
        let db = Database::unavailable();
        assert!(!db.is_available());
        let err = db.pool().unwrap_err();
        let (status, msg): (StatusCode, String) = err.into();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(msg, "Database unavailable");
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::default().bounds(), (20, 0));
        let p = Pagination { limit: 10_000, offset: -5 };
        assert_eq!(p.bounds(), (100, 0));
        let p = Pagination { limit: 0, offset: 40 };
        assert_eq!(p.bounds(), (1, 40));
    }
}
