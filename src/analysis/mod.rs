mod aggregator;
mod categorizer;
mod report;

pub use aggregator::{aggregate, AggregateReport, LevelStats};
pub use categorizer::{categorize, Category, CategoryScores};
pub use report::render;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::db::ResponseRepository;

/// Fetch, aggregate and render in one pass. A storage failure degrades to an
/// empty report instead of propagating.
pub async fn generate_report(
    pool: &SqlitePool,
    since: Option<DateTime<Utc>>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let responses = match ResponseRepository::fetch_responses(pool, since).await {
        Ok(responses) => responses,
        Err(err) => {
            warn!("Storage unavailable, rendering empty report: {}", err);
            Vec::new()
        }
    };

    let report = aggregate(&responses);
    render(&report, out_dir)
}

/// Batch entrypoint variant: a store that could not even be opened degrades
/// to an empty report the same way a failed fetch does.
pub async fn generate_report_or_empty(
    pool: Result<SqlitePool>,
    since: Option<DateTime<Utc>>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    match pool {
        Ok(pool) => generate_report(&pool, since, out_dir).await,
        Err(err) => {
            warn!("Storage unavailable, rendering empty report: {}", err);
            render(&AggregateReport::default(), out_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Level, NewResponse, SurveyPayload};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database")
    }

    #[tokio::test]
    async fn storage_failure_degrades_to_empty_report() {
        // No migrations: the responses table does not exist, so the fetch
        // fails the way an unreachable store would.
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().unwrap();

        let artifacts = generate_report(&pool, None, dir.path()).await.unwrap();

        assert_eq!(artifacts.len(), 1);
        let summary = std::fs::read_to_string(dir.path().join("summary.txt")).unwrap();
        assert!(summary.contains("Total responses: 0"));
    }

    #[tokio::test]
    async fn unopenable_store_degrades_to_empty_report() {
        let dir = tempfile::tempdir().unwrap();

        let artifacts = generate_report_or_empty(
            Err(anyhow::anyhow!("unable to open database file")),
            None,
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(artifacts.len(), 1);
        let summary = std::fs::read_to_string(dir.path().join("summary.txt")).unwrap();
        assert!(summary.contains("Total responses: 0"));
    }

    #[tokio::test]
    async fn stored_responses_produce_chart_artifacts() {
        let pool = memory_pool().await;
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let dir = tempfile::tempdir().unwrap();

        let new_response = NewResponse {
            level: Level::Beginner,
            payload: SurveyPayload {
                experience: Some("some python".to_string()),
                ..Default::default()
            },
            voice_question: None,
            clarified_question: None,
            ip_address: None,
        };
        ResponseRepository::insert_response(&pool, &new_response, chrono::Utc::now())
            .await
            .unwrap();

        let artifacts = generate_report(&pool, None, dir.path()).await.unwrap();

        assert!(dir.path().join("level_distribution.svg").exists());
        assert!(dir.path().join("responses_per_day.svg").exists());
        assert!(artifacts.contains(&dir.path().join("summary.txt")));
    }
}
