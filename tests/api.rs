use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use survey_backend::app::create_router;
use survey_backend::app_state::AppState;
use survey_backend::config::{AppConfig, Config, DatabaseConfig, Environment, OpenAiConfig, ServerConfig};
use survey_backend::modules::assistant::AssistantClient;

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

fn test_config(api_base: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            min_connections: Some(1),
        },
        openai: OpenAiConfig {
            api_key: "test-key".to_string(),
            api_base: api_base.to_string(),
            model: "gpt-4o-mini".to_string(),
        },
        app: AppConfig {
            name: "Survey Backend".to_string(),
            environment: Environment::Development,
            static_dir: "static".to_string(),
            report_dir: "reports".to_string(),
        },
    }
}

async fn test_app(api_base: &str) -> (axum::Router, SqlitePool) {
    let pool = test_pool().await;
    let config = test_config(api_base);
    let assistant = AssistantClient::new(&config.openai).unwrap();
    let state = AppState::new(pool.clone(), config, assistant);
    (create_router(state), pool)
}

async fn row_count(pool: &SqlitePool) -> i64 {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses")
        .fetch_one(pool)
        .await
        .unwrap();
    count.0
}

#[tokio::test]
async fn index_page_renders() {
    let (app, _pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("Course Survey"));
}

#[tokio::test]
async fn questions_page_renders_per_level() {
    let (app, _pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/questions/advanced")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("advanced"));
}

#[tokio::test]
async fn unknown_level_is_not_found() {
    let (app, _pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/questions/expert")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_submission_is_stored_and_redirects() {
    let (app, pool) = test_app("http://127.0.0.1:1").await;

    let body = "experience=a+year+of+python&goals=ship+a+service&topics=nlp&topics=web+development";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/questions/beginner")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/thank_you");
    assert_eq!(row_count(&pool).await, 1);
}

#[tokio::test]
async fn submission_missing_required_answer_is_rejected() {
    let (app, pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/questions/beginner")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("experience=a+year+of+python"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(row_count(&pool).await, 0);
}

#[tokio::test]
async fn submission_with_unknown_level_persists_nothing() {
    let (app, pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/questions/wizard")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("experience=x&goals=y&topics=nlp"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(row_count(&pool).await, 0);
}

#[tokio::test]
async fn empty_assistant_message_is_rejected() {
    let (app, _pool) = test_app("http://127.0.0.1:1").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chatgpt")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"message": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assistant_proxies_replies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "try asking about traits"}}]
        })))
        .mount(&server)
        .await;

    let (app, _pool) = test_app(&server.uri()).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chatgpt")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"message": "how do I ask about rust"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["reply"], "try asking about traits");
}

#[tokio::test]
async fn provider_failure_yields_generic_unavailable_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("secret provider stack trace"))
        .mount(&server)
        .await;

    let (app, _pool) = test_app(&server.uri()).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process_voice")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"voice_input": "what is lifetimes"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("temporarily unavailable"));
    assert!(!text.contains("secret provider stack trace"));
}

#[tokio::test]
async fn sixth_assistant_request_in_a_minute_is_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let (app, _pool) = test_app(&server.uri()).await;
    for i in 0..6 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chatgpt")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-forwarded-for", "203.0.113.7")
                    .body(Body::from(r#"{"message": "hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        if i < 5 {
            assert_eq!(response.status(), StatusCode::OK);
        } else {
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        }
    }
}
