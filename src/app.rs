use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::assistant::assistant_routes,
    modules::survey::survey_routes,
};

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.env.app.static_dir.to_string();

    Router::new()
        .route("/health", get(health_check))
        .merge(survey_routes())
        .merge(assistant_routes())
        .nest_service(
            "/static",
            tower_http::services::ServeDir::new(static_dir),
        )
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
