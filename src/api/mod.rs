// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    media::MAX_IMAGE_BYTES,
    models::{
        AnswerCreate, AnswerResponse, AnswerUpdate, DemoLoginResponse, QuestionCreate,
        QuestionResponse, QuestionUpdate, TopicCreate, TopicUpdate, UploadResponse,
        UserSyncRequest,
    },
    state::AppState,
    storage::{Answer, Question, Topic, User},
};

pub mod answers;
pub mod auth;
pub mod health;
pub mod questions;
pub mod topics;
pub mod upload;
pub mod users;
mod views;

/// Multipart framing allowance on top of the image size limit.
const UPLOAD_BODY_OVERHEAD: usize = 64 * 1024;

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/auth/demo-login", post(auth::demo_login))
        .route("/users/sync", post(users::sync_user))
        .route("/users/me", get(users::get_current_user))
        .route("/topics", get(topics::list_topics).post(topics::create_topic))
        .route(
            "/topics/{topic_id}",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route(
            "/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/questions/{question_id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        )
        .route(
            "/answers",
            get(answers::list_answers).post(answers::create_answer),
        )
        .route(
            "/answers/{answer_id}",
            get(answers::get_answer)
                .put(answers::update_answer)
                .delete(answers::delete_answer),
        )
        .route(
            "/upload/image",
            post(upload::upload_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + UPLOAD_BODY_OVERHEAD)),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(cors_origins)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::readiness,
        auth::demo_login,
        users::sync_user,
        users::get_current_user,
        topics::list_topics,
        topics::get_topic,
        topics::create_topic,
        topics::update_topic,
        topics::delete_topic,
        questions::list_questions,
        questions::get_question,
        questions::create_question,
        questions::update_question,
        questions::delete_question,
        answers::list_answers,
        answers::get_answer,
        answers::create_answer,
        answers::update_answer,
        answers::delete_answer,
        upload::upload_image
    ),
    components(
        schemas(
            User,
            Topic,
            Question,
            Answer,
            QuestionResponse,
            AnswerResponse,
            UserSyncRequest,
            DemoLoginResponse,
            TopicCreate,
            TopicUpdate,
            QuestionCreate,
            QuestionUpdate,
            AnswerCreate,
            AnswerUpdate,
            UploadResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Demo login"),
        (name = "Users", description = "Account sync and profile"),
        (name = "Topics", description = "Question categories"),
        (name = "Questions", description = "Questions under topics"),
        (name = "Answers", description = "Answers to questions"),
        (name = "Upload", description = "Image uploads")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudinarySettings;
    use crate::media::MediaUploader;
    use crate::storage::ensure_demo_user;
    use crate::test_support::{sign_external, spawn_media_host, test_claims, test_state, TEST_KID};
    use axum::{body::to_bytes, http::StatusCode, response::Response};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:5173";

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_request(token: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "questionaura-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"pic.png\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/upload/image")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public_and_tagged_with_request_id() {
        let (state, _dir) = test_state();
        let app = router(state, &[ORIGIN.to_string()]);

        let response = send(&app, get_request("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _dir) = test_state();
        let app = router(state, &[]);

        let response = send(&app, get_request("/api-doc/openapi.json", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/questions/{question_id}"].is_object());
    }

    #[tokio::test]
    async fn writes_require_a_token() {
        let (state, _dir) = test_state();
        let app = router(state, &[]);

        let response = send(
            &app,
            json_request(Method::POST, "/topics", None, json!({"name": "Science"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "missing_auth_header");

        let response = send(
            &app,
            json_request(Method::POST, "/topics", Some("garbage"), json!({"name": "Science"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "invalid_token_header");
    }

    #[tokio::test]
    async fn demo_login_flow() {
        let (state, _dir) = test_state();
        ensure_demo_user(&state.db).unwrap();
        let app = router(state, &[]);

        let response = send(&app, json_request(Method::POST, "/auth/demo-login", None, json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let login = json_body(response).await;
        let token = login["access_token"].as_str().unwrap().to_string();
        assert_eq!(login["user"]["username"], "demo_user");

        let response = send(
            &app,
            json_request(Method::POST, "/topics", Some(&token), json!({"name": "Science"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let topic_id = json_body(response).await["id"].as_u64().unwrap();

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/questions",
                Some(&token),
                json!({"topic_id": topic_id, "ask": "How do magnets work?"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let question = json_body(response).await;
        assert_eq!(question["asker"]["auth0_id"], "demo-user-12345");
        assert_eq!(question["topic"]["name"], "Science");

        let response = send(
            &app,
            get_request(&format!("/questions?topic_id={topic_id}"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn external_identity_must_sync_before_use() {
        let (state, _dir) = test_state();
        let app = router(state, &[]);
        let token = sign_external(&test_claims("auth0|carol"), Some(TEST_KID));

        let response = send(&app, get_request("/users/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["error"],
            "User not found. Please sync your account."
        );

        let sync = json!({"auth0_id": "auth0|carol", "email": "carol@example.com", "username": "carol"});
        let response = send(&app, json_request(Method::POST, "/users/sync", Some(&token), sync.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, json_request(Method::POST, "/users/sync", Some(&token), sync)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get_request("/users/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["username"], "carol");
    }

    #[tokio::test]
    async fn rejected_json_bodies_use_error_shape() {
        let (state, _dir) = test_state();
        let demo = ensure_demo_user(&state.db).unwrap();
        let token = state.verifier.demo().issue(&demo).unwrap().token;
        let app = router(state, &[]);

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/topics")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = send(&app, malformed).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());

        let response = send(
            &app,
            json_request(Method::POST, "/questions", Some(&token), json!({"ask": "No topic given here"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("topic_id"));
    }

    #[tokio::test]
    async fn validation_failures_are_422() {
        let (state, _dir) = test_state();
        let demo = ensure_demo_user(&state.db).unwrap();
        let token = state.verifier.demo().issue(&demo).unwrap().token;
        let app = router(state, &[]);

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/topics",
                Some(&token),
                json!({"name": "Art", "image_url": "ftp://files.example/a.png"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"],
            "URL must start with http:// or https://"
        );
    }

    #[tokio::test]
    async fn upload_requires_configuration() {
        let (state, _dir) = test_state();
        let demo = ensure_demo_user(&state.db).unwrap();
        let token = state.verifier.demo().issue(&demo).unwrap().token;
        let app = router(state, &[]);

        let response = send(&app, multipart_request(&token, "image/png", b"\x89PNG")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn upload_checks_type_and_returns_url() {
        let (base, _) = spawn_media_host(true).await;
        let (state, _dir) = test_state();
        let demo = ensure_demo_user(&state.db).unwrap();
        let token = state.verifier.demo().issue(&demo).unwrap().token;
        let uploader = MediaUploader::new(CloudinarySettings {
            cloud_name: "demo-cloud".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        })
        .with_api_base(base);
        let app = router(state.with_uploader(uploader), &[]);

        let response = send(&app, multipart_request(&token, "application/pdf", b"%PDF-1.7")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, multipart_request(&token, "image/png", b"\x89PNG fake")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["url"],
            "https://res.cloudinary.test/questionaura/pic.png"
        );
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let (state, _dir) = test_state();
        let app = router(state, &[ORIGIN.to_string()]);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/topics")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ORIGIN
        );
    }
}
