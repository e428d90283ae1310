use askama::Template;
use axum::{
    extract::{Path, RawForm, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::db::{Level, NewResponse, ResponseRepository, SurveyPayload};
use crate::error::{AppError, AppResult};
use crate::middleware::client_ip;
use crate::modules::survey::questions::{self, Question};

// Answer fields that must never reach the row store in the clear.
const SENSITIVE_FIELDS: [&str; 2] = ["email", "phone"];
const REDACTED: &str = "REDACTED";

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Failed to render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "survey/index.html")]
struct IndexTemplate;

pub async fn index_page() -> impl IntoResponse {
    HtmlTemplate(IndexTemplate)
}

#[derive(Debug, Deserialize)]
pub struct ChooseLevelForm {
    pub level: String,
}

pub async fn choose_level(Form(form): Form<ChooseLevelForm>) -> AppResult<Redirect> {
    let level: Level = form
        .level
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown level: {}", form.level)))?;
    Ok(Redirect::to(&format!("/questions/{}", level)))
}

#[derive(Template)]
#[template(path = "survey/questions.html")]
struct QuestionsTemplate {
    level: Level,
    questions: &'static [Question],
}

pub async fn questions_page(Path(level): Path<String>) -> AppResult<impl IntoResponse> {
    let level: Level = level
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown level: {}", level)))?;
    Ok(HtmlTemplate(QuestionsTemplate {
        level,
        questions: questions::question_set(level),
    }))
}

pub async fn submit_survey(
    State(state): State<AppState>,
    Path(level): Path<String>,
    headers: HeaderMap,
    RawForm(body): RawForm,
) -> AppResult<Redirect> {
    let level: Level = level
        .parse()
        .map_err(|_| AppError::MalformedPayload(format!("Unknown level: {}", level)))?;

    let mut answers = parse_form(&body);
    questions::validate_required(level, &answers)?;

    let voice_question = take_single(&mut answers, "voice_question");
    let clarified_question = take_single(&mut answers, "clarified_question");
    redact_sensitive(&mut answers);

    let payload = into_payload(answers)?;
    let new_response = NewResponse {
        level,
        payload,
        voice_question,
        clarified_question,
        ip_address: client_ip(&headers),
    };

    let response = ResponseRepository::insert_response(&state.db, &new_response, Utc::now()).await?;
    info!(id = response.id, level = %level, "Stored survey response");

    Ok(Redirect::to("/thank_you"))
}

#[derive(Template)]
#[template(path = "survey/thank_you.html")]
struct ThankYouTemplate;

pub async fn thank_you_page() -> impl IntoResponse {
    HtmlTemplate(ThankYouTemplate)
}

#[derive(Template)]
#[template(path = "survey/privacy_policy.html")]
struct PrivacyPolicyTemplate;

pub async fn privacy_policy_page() -> impl IntoResponse {
    HtmlTemplate(PrivacyPolicyTemplate)
}

/// Urlencoded body into a key -> values map; repeated keys (multi-selects)
/// accumulate.
fn parse_form(body: &[u8]) -> BTreeMap<String, Vec<String>> {
    let mut answers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        answers.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    answers
}

fn take_single(answers: &mut BTreeMap<String, Vec<String>>, key: &str) -> Option<String> {
    answers
        .remove(key)
        .and_then(|values| values.into_iter().find(|value| !value.trim().is_empty()))
}

fn redact_sensitive(answers: &mut BTreeMap<String, Vec<String>>) {
    for field in SENSITIVE_FIELDS {
        if let Some(values) = answers.get_mut(field) {
            for value in values.iter_mut() {
                *value = REDACTED.to_string();
            }
        }
    }
}

fn into_payload(answers: BTreeMap<String, Vec<String>>) -> Result<SurveyPayload, AppError> {
    let mut map = serde_json::Map::new();
    for (key, mut values) in answers {
        let value = if values.len() == 1 {
            Value::String(values.remove(0))
        } else {
            Value::Array(values.into_iter().map(Value::String).collect())
        };
        map.insert(key, value);
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::MalformedPayload(format!("Unreadable submission: {}", e)))
}
