use axum::{
    routing::get,
    Router,
};
use crate::app_state::AppState;
use super::handlers::{
    choose_level, index_page, privacy_policy_page, questions_page, submit_survey, thank_you_page,
};

pub fn survey_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_page).post(choose_level))
        .route("/questions/:level", get(questions_page).post(submit_survey))
        .route("/thank_you", get(thank_you_page))
        .route("/privacy_policy", get(privacy_policy_page))
}
