//! Page-view log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::PageViewId;
use orchard_core::models::{PageViewStats, PathCount};

use super::RepositoryError;

/// Number of paths reported in [`PageViewStats::path_stats`].
const TOP_PATHS: i64 = 10;

#[derive(Debug, sqlx::FromRow)]
struct PathCountRow {
    path: String,
    count: i64,
}

/// Repository for page-view database operations.
pub struct PageViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PageViewRepository<'a> {
    /// Create a new page-view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one view of `path`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        path: &str,
        user_agent: Option<&str>,
        client_ip: Option<&str>,
    ) -> Result<PageViewId, RepositoryError> {
        let id: PageViewId = sqlx::query_scalar(
            "INSERT INTO page_view (path, user_agent, client_ip) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(path)
        .bind(user_agent)
        .bind(client_ip)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Total views, views since `today_start`, and the most viewed paths.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self, today_start: DateTime<Utc>) -> Result<PageViewStats, RepositoryError> {
        let (total_views, today_views): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE viewed_at >= $1) FROM page_view",
        )
        .bind(today_start)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PathCountRow>(
            r"
            SELECT path, COUNT(*) AS count
            FROM page_view
            GROUP BY path
            ORDER BY count DESC, path ASC
            LIMIT $1
            ",
        )
        .bind(TOP_PATHS)
        .fetch_all(self.pool)
        .await?;

        Ok(PageViewStats {
            total_views,
            today_views,
            path_stats: rows
                .into_iter()
                .map(|row| PathCount {
                    path: row.path,
                    count: row.count,
                })
                .collect(),
        })
    }

    /// Views of paths under any of `prefixes` (a prefix itself or `prefix/...`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_under(&self, prefixes: &[&str]) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM page_view v
            WHERE EXISTS (
                SELECT 1 FROM unnest($1::text[]) AS p(prefix)
                WHERE v.path = p.prefix OR starts_with(v.path, p.prefix || '/')
            )
            ",
        )
        .bind(prefixes)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
