/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (Authenticator, GroqClient) → Router 組み立て
 * - Middleware の適用 (API key gate / security headers / CORS / HTTP)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{
    self,
    handlers::{health::health, ui::index},
};
use crate::config::Config;
use crate::error::ErrorResponse;
use crate::middleware;
use crate::services::{auth::Authenticator, env::SystemEnv, inference::GroqClient};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,voice_assist_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {} (gated prefix: {})",
        config.app_env,
        config.addr,
        config.api_prefix
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    // API_KEYS is read from the process environment on every request.
    let auth = Arc::new(Authenticator::new(Arc::new(SystemEnv)));

    let inference = Arc::new(GroqClient::new(
        &config.groq_base_url,
        &config.groq_api_key,
        &config.chat_model,
        &config.transcription_model,
        config.provider_timeout,
    )?);

    Ok(AppState::new(auth, inference, config.api_prefix.as_str()))
}

fn build_router(state: AppState, config: &Config) -> Router {
    async fn not_found() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not found".to_string(),
            }),
        )
    }

    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest(&config.api_prefix, api::routes())
        .fallback(not_found);

    // The gate wraps every route and the fallback, so unknown paths under the
    // prefix are rejected before routing decides they do not exist.
    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, Response, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::key_store::API_KEYS_VAR;
    use crate::services::env::MemEnv;
    use crate::services::inference::client::{
        ChatRequest, InferenceClient, InferenceError, InferenceResult, TranscriptionRequest,
    };

    const KEY: &str = "test-key";
    const BOUNDARY: &str = "X-TEST-BOUNDARY";

    // ── Mock provider ─────────────────────────────────────────────────────────

    #[derive(Clone)]
    enum Reply {
        Content(&'static str),
        Empty,
        Fail,
    }

    struct MockInference {
        reply: Reply,
        chats: Mutex<Vec<ChatRequest>>,
        transcriptions: Mutex<Vec<TranscriptionRequest>>,
    }

    impl MockInference {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                chats: Mutex::new(Vec::new()),
                transcriptions: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.chats.lock().unwrap().len() + self.transcriptions.lock().unwrap().len()
        }

        fn reply(&self) -> InferenceResult<Option<String>> {
            match self.reply {
                Reply::Content(c) => Ok(Some(c.to_string())),
                Reply::Empty => Ok(None),
                Reply::Fail => Err(InferenceError::Api {
                    status: 500,
                    message: "upstream exploded: secret-internal-detail".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for MockInference {
        fn provider_name(&self) -> &'static str {
            "mock"
        }

        async fn chat_completion(&self, request: ChatRequest) -> InferenceResult<Option<String>> {
            self.chats.lock().unwrap().push(request);
            self.reply()
        }

        async fn transcribe(&self, request: TranscriptionRequest) -> InferenceResult<String> {
            self.transcriptions.lock().unwrap().push(request);
            self.reply().map(Option::unwrap_or_default)
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Never answers within any timeout a test configures.
    struct StalledInference;

    #[async_trait]
    impl InferenceClient for StalledInference {
        fn provider_name(&self) -> &'static str {
            "stalled"
        }

        async fn chat_completion(&self, _request: ChatRequest) -> InferenceResult<Option<String>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn transcribe(&self, _request: TranscriptionRequest) -> InferenceResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }
    }

    fn app_with_config(config: Config, inference: Arc<dyn InferenceClient>) -> Router {
        let state = AppState::new(
            Arc::new(Authenticator::new(Arc::new(MemEnv::with(API_KEYS_VAR, KEY)))),
            inference,
            config.api_prefix.as_str(),
        );
        build_router(state, &config)
    }

    fn app_with_env(env: Arc<MemEnv>, inference: Arc<MockInference>) -> Router {
        let config = Config::for_tests();
        let state = AppState::new(
            Arc::new(Authenticator::new(env)),
            inference,
            config.api_prefix.as_str(),
        );
        build_router(state, &config)
    }

    fn app(inference: Arc<MockInference>) -> Router {
        app_with_env(Arc::new(MemEnv::with(API_KEYS_VAR, KEY)), inference)
    }

    fn json_request(path: &str, body: Value) -> Request<Body> {
        Request::post(path)
            .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: audio/wav\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/transcribe")
            .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── Edge gate ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn missing_authorization_is_blocked_before_handler() {
        let inference = MockInference::new(Reply::Content("never"));
        let req = Request::post("/api/compose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"description": "hi"}).to_string()))
            .unwrap();

        let response = app(inference.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(
            body_json(response).await,
            json!({"error": "Authorization header required"})
        );
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_authorization_is_rejected() {
        for value in ["Token abc", "Bearer", "Bearer a b", "bearer test-key"] {
            let inference = MockInference::new(Reply::Content("never"));
            let req = Request::post("/api/proofread")
                .header(header::AUTHORIZATION, value)
                .body(Body::from(json!({"text": "hi"}).to_string()))
                .unwrap();

            let response = app(inference.clone()).oneshot(req).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value:?}");
            assert_eq!(
                body_json(response).await,
                json!({"error": "Invalid authorization format. Use: Bearer <api-key>"})
            );
            assert_eq!(inference.calls(), 0);
        }
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let inference = MockInference::new(Reply::Content("never"));
        let mut req = json_request("/api/compose", json!({"description": "hi"}));
        req.headers_mut()
            .insert(header::AUTHORIZATION, "Bearer other".parse().unwrap());

        let response = app(inference.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(body_json(response).await, json!({"error": "Invalid API key"}));
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn unset_allow_list_rejects_every_api_request() {
        let inference = MockInference::new(Reply::Content("never"));
        let app = app_with_env(Arc::new(MemEnv::new()), inference.clone());

        let response = app
            .oneshot(json_request("/api/compose", json!({"description": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({"error": "Invalid API key"}));
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn allow_list_changes_apply_to_next_request() {
        let env = Arc::new(MemEnv::with(API_KEYS_VAR, "other"));
        let inference = MockInference::new(Reply::Content("ok"));
        let app = app_with_env(env.clone(), inference.clone());

        let response = app
            .clone()
            .oneshot(json_request("/api/compose", json!({"description": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        env.set(API_KEYS_VAR, &format!("other, {KEY}"));
        let response = app
            .oneshot(json_request("/api/compose", json!({"description": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_under_prefix_is_gated() {
        let inference = MockInference::new(Reply::Content("never"));
        let req = Request::get("/api/does-not-exist").body(Body::empty()).unwrap();

        let response = app(inference).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn paths_outside_prefix_are_not_gated() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));

        let response = app(inference.clone())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let response = app(inference)
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_request_id_and_security_headers() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(
            response.headers()["permissions-policy"],
            "camera=(), microphone=(self), geolocation=()"
        );
    }

    // ── compose ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn compose_returns_trimmed_message() {
        let inference = MockInference::new(Reply::Content("  Hi team, ...\n"));

        let response = app(inference.clone())
            .oneshot(json_request(
                "/api/compose",
                json!({"description": "tell the team the meeting moved"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "description": "tell the team the meeting moved",
                "composedMessage": "Hi team, ..."
            })
        );

        let chats = inference.chats.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert!(chats[0].user_message.ends_with("tell the team the meeting moved"));
    }

    #[tokio::test]
    async fn compose_rejects_empty_missing_or_non_string_description() {
        for body in [
            json!({"description": ""}),
            json!({}),
            json!({"description": 42}),
            json!({"description": null}),
            json!("description"),
        ] {
            let inference = MockInference::new(Reply::Content("never"));

            let response = app(inference.clone())
                .oneshot(json_request("/api/compose", body.clone()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(
                body_json(response).await,
                json!({"error": "Description is required and must be a string"})
            );
            assert_eq!(inference.calls(), 0);
        }
    }

    #[tokio::test]
    async fn compose_rejects_non_json_body() {
        let inference = MockInference::new(Reply::Content("never"));
        let req = Request::post("/api/compose")
            .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
            .body(Body::from("description=hi"))
            .unwrap();

        let response = app(inference).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compose_without_content_is_generic_500() {
        let inference = MockInference::new(Reply::Empty);

        let response = app(inference)
            .oneshot(json_request("/api/compose", json!({"description": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Failed to compose message"})
        );
    }

    // ── proofread ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn proofread_returns_original_and_corrected_text() {
        let inference = MockInference::new(Reply::Content("This is correct.\n"));

        let response = app(inference.clone())
            .oneshot(json_request("/api/proofread", json!({"text": "this is corect"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"originalText": "this is corect", "proofreadText": "This is correct."})
        );

        let chats = inference.chats.lock().unwrap();
        assert_eq!(chats[0].user_message, "Please proofread this text: this is corect");
        assert_eq!(chats[0].temperature, 1.0);
    }

    #[tokio::test]
    async fn proofread_rejects_wrong_type() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference.clone())
            .oneshot(json_request("/api/proofread", json!({"text": 123})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Text is required and must be a string"})
        );
        assert_eq!(inference.calls(), 0);
    }

    // ── transcribe ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn transcribe_forwards_file_and_returns_text() {
        let inference = MockInference::new(Reply::Content(" hello world"));

        let response = app(inference.clone())
            .oneshot(multipart_request(&[
                ("note", None, &b"ignored"[..]),
                ("file", Some("clip.wav"), &b"RIFFDATA"[..]),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"text": " hello world"}));

        let calls = inference.transcriptions.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].audio.file_name, "clip.wav");
        assert_eq!(calls[0].audio.content_type.as_deref(), Some("audio/wav"));
        assert_eq!(&calls[0].audio.data[..], b"RIFFDATA");
        assert_eq!(calls[0].response_format, "verbose_json");
        assert_eq!(calls[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn transcribe_without_file_part_is_400() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference.clone())
            .oneshot(multipart_request(&[("other", None, &b"x"[..])]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No audio file provided"})
        );
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn transcribe_rejects_file_sent_as_text_field() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference.clone())
            .oneshot(multipart_request(&[("file", None, &b"not audio"[..])]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No audio file provided"})
        );
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn transcribe_with_non_multipart_body_is_400() {
        let inference = MockInference::new(Reply::Content("never"));

        let response = app(inference.clone())
            .oneshot(json_request("/api/transcribe", json!({"file": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(inference.calls(), 0);
    }

    // ── provider failures ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn provider_failure_is_generic_500_without_detail() {
        let cases: [(Request<Body>, &str); 3] = [
            (
                json_request("/api/compose", json!({"description": "hi"})),
                "Failed to compose message",
            ),
            (
                json_request("/api/proofread", json!({"text": "hi"})),
                "Failed to proofread text",
            ),
            (
                multipart_request(&[("file", Some("a.wav"), &b"RIFF"[..])]),
                "Failed to transcribe audio",
            ),
        ];

        for (req, message) in cases {
            let inference = MockInference::new(Reply::Fail);

            let response = app(inference.clone()).oneshot(req).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = body_json(response).await;
            assert_eq!(body, json!({"error": message}));
            assert!(!body.to_string().contains("secret-internal-detail"));
            assert_eq!(inference.calls(), 1);
        }
    }

    // ── limits ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn oversized_json_body_is_413_json() {
        let inference = MockInference::new(Reply::Content("never"));
        let config = Config::for_tests();
        let description = "a".repeat(config.max_body_bytes + 1);

        let response = app(inference.clone())
            .oneshot(json_request(
                "/api/compose",
                json!({ "description": description }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request body too large"})
        );
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_body_with_content_length_is_413_json() {
        let inference = MockInference::new(Reply::Content("never"));
        let config = Config::for_tests();
        let body = json!({ "text": "a".repeat(config.max_body_bytes) }).to_string();

        let mut req = json_request("/api/proofread", json!({}));
        req.headers_mut()
            .insert(header::CONTENT_LENGTH, body.len().into());
        *req.body_mut() = Body::from(body);

        let response = app(inference.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request body too large"})
        );
        assert_eq!(inference.calls(), 0);
    }

    #[tokio::test]
    async fn stalled_request_times_out_with_json_body() {
        let config = Config {
            request_timeout: Duration::from_millis(50),
            ..Config::for_tests()
        };

        let response = app_with_config(config, Arc::new(StalledInference))
            .oneshot(json_request("/api/compose", json!({"description": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request timed out"})
        );
    }
}
