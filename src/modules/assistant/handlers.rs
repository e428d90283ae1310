use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::client_ip;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VoiceRequest {
    #[validate(length(min = 1))]
    pub voice_input: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceReply {
    pub corrected_question: String,
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    validate_input(&request, &request.message)?;
    enforce_rate_limit(&state, &headers)?;

    let reply = state.assistant.reply(&request.message).await?;
    Ok(Json(ChatReply { reply }))
}

pub async fn process_voice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VoiceRequest>,
) -> AppResult<Json<VoiceReply>> {
    validate_input(&request, &request.voice_input)?;
    enforce_rate_limit(&state, &headers)?;

    let corrected_question = state.assistant.clarify_question(&request.voice_input).await?;
    Ok(Json(VoiceReply { corrected_question }))
}

fn validate_input<T: Validate>(request: &T, text: &str) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Input must not be empty".to_string()))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation("Input must not be empty".to_string()));
    }
    Ok(())
}

fn enforce_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let client = client_ip(headers).unwrap_or_else(|| "unknown".to_string());
    let allowed = state
        .rate_limits
        .lock()
        .map(|mut limits| limits.check(&client))
        .unwrap_or(false);
    if !allowed {
        return Err(AppError::RateLimited);
    }
    Ok(())
}
