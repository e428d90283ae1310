mod repositories;
mod models;
mod error;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use anyhow::Result;
use std::str::FromStr;
use crate::config;

pub use error::DatabaseError;
pub use models::*;
pub use repositories::ResponseRepository;

/// Initialize the database connection pool
pub async fn init_pool() -> Result<SqlitePool> {
    let config = config::get();
    let options = SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections.unwrap_or(10))
        .min_connections(config.database.min_connections.unwrap_or(1))
        .connect_with(options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}
