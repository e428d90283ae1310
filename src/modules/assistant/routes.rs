use axum::{routing::post, Router};
use crate::app_state::AppState;
use super::handlers::{chat, process_voice};

pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/chatgpt", post(chat))
        .route("/process_voice", post(process_voice))
}
