use anyhow::Context;
use chrono::{Duration, Utc};
use dotenv::dotenv;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use survey_backend::{analysis, config, db};

/// Aggregates stored responses into chart artifacts and a text summary.
/// `ANALYZE_SINCE_DAYS` limits the window; unset means all responses.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analyze=info,survey_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let config = config::init()?;

    let since = match std::env::var("ANALYZE_SINCE_DAYS") {
        Ok(days) => {
            let days: i64 = days.parse().context("Failed to parse ANALYZE_SINCE_DAYS")?;
            Some(Utc::now() - Duration::days(days))
        }
        Err(_) => None,
    };

    let pool = db::init_pool().await;

    let out_dir = Path::new(&config.app.report_dir);
    let artifacts = analysis::generate_report_or_empty(pool, since, out_dir).await?;

    for artifact in &artifacts {
        info!("Wrote {}", artifact.display());
    }
    info!("Report complete: {} artifacts in {}", artifacts.len(), out_dir.display());

    Ok(())
}
