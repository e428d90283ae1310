use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::db::error::DatabaseError;
use crate::db::models::{NewResponse, Response};

pub struct ResponseRepository;

impl ResponseRepository {
    pub async fn insert_response(
        pool: &SqlitePool,
        new_response: &NewResponse,
        timestamp: DateTime<Utc>,
    ) -> Result<Response, DatabaseError> {
        let response = sqlx::query_as::<_, Response>(
            r#"
            INSERT INTO responses (level, data, voice_question, clarified_question, timestamp, ip_address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, level, data, voice_question, clarified_question, timestamp, ip_address
            "#,
        )
        .bind(new_response.level)
        .bind(Json(&new_response.payload))
        .bind(&new_response.voice_question)
        .bind(&new_response.clarified_question)
        .bind(timestamp)
        .bind(&new_response.ip_address)
        .fetch_one(pool)
        .await?;

        Ok(response)
    }

    /// Responses matching the optional time window, timestamp ascending.
    pub async fn fetch_responses(
        pool: &SqlitePool,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Response>, DatabaseError> {
        let responses = match since {
            Some(since) => {
                sqlx::query_as::<_, Response>(
                    r#"
                    SELECT id, level, data, voice_question, clarified_question, timestamp, ip_address
                    FROM responses
                    WHERE timestamp >= ?1
                    ORDER BY timestamp ASC
                    "#,
                )
                .bind(since)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Response>(
                    r#"
                    SELECT id, level, data, voice_question, clarified_question, timestamp, ip_address
                    FROM responses
                    ORDER BY timestamp ASC
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(responses)
    }

    #[allow(unused)]
    pub async fn count_responses(pool: &SqlitePool) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Level, SurveyPayload, TopicList};
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    // In-memory SQLite gives every connection its own database, so the pool
    // must be pinned to a single connection.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");
        pool
    }

    fn sample_response(level: Level) -> NewResponse {
        NewResponse {
            level,
            payload: SurveyPayload {
                experience: Some("a year of python scripting".to_string()),
                topics: Some(TopicList::Csv("ml, nlp".to_string())),
                ..Default::default()
            },
            voice_question: None,
            clarified_question: None,
            ip_address: Some("127.0.0.1".to_string()),
        }
    }

    #[tokio::test]
    async fn insert_then_fetch_round_trips() {
        let pool = test_pool().await;
        let now = Utc::now();

        let inserted =
            ResponseRepository::insert_response(&pool, &sample_response(Level::Beginner), now)
                .await
                .unwrap();
        assert_eq!(inserted.level, Level::Beginner);

        let all = ResponseRepository::fetch_responses(&pool, None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data.0.topic_values(), vec!["ml", "nlp"]);
    }

    #[tokio::test]
    async fn fetch_filters_by_window_and_orders_by_timestamp() {
        let pool = test_pool().await;
        let now = Utc::now();

        ResponseRepository::insert_response(
            &pool,
            &sample_response(Level::Beginner),
            now - Duration::days(40),
        )
        .await
        .unwrap();
        ResponseRepository::insert_response(
            &pool,
            &sample_response(Level::Advanced),
            now - Duration::days(2),
        )
        .await
        .unwrap();
        ResponseRepository::insert_response(&pool, &sample_response(Level::Beginner), now)
            .await
            .unwrap();

        let recent =
            ResponseRepository::fetch_responses(&pool, Some(now - Duration::days(30)))
                .await
                .unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].timestamp <= recent[1].timestamp);
        assert_eq!(recent[0].level, Level::Advanced);
    }
}
