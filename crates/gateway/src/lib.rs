//! HTTP gateway for docsgpt.
//!
//! Routes:
//! - `GET /`: the showcase page with one precomputed question and answer
//! - `GET /health`: liveness
//! - `POST /v1/ask`: answer a question through the RAG pipeline
//!
//! Built on Axum.

pub mod frontend;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use docsgpt_agent::RagAgent;
use docsgpt_config::AppConfig;
use docsgpt_core::corpus::ChunkId;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Shared application state for the gateway.
pub struct AppState {
    pub agent: Arc<RagAgent>,
    /// Rendered showcase page.
    pub page: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Answer the showcase question once and render the page around it.
    pub async fn prepare(
        agent: Arc<RagAgent>,
        showcase_question: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let showcase = agent.ask(showcase_question).await?;
        info!(
            sections = showcase.metadata.included.len(),
            answer_len = showcase.answer.len(),
            "Showcase answer computed"
        );
        let page = frontend::render_index(&showcase.question, &showcase.answer)?;
        Ok(Self { agent, page })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/ask", post(ask_handler))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// The showcase answer is computed before binding; a failing pipeline
/// keeps the server from starting.
pub async fn start(
    config: &AppConfig,
    agent: Arc<RagAgent>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(AppState::prepare(agent, &config.gateway.showcase_question).await?);
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    question: String,
    answer: String,
    included: Vec<ChunkId>,
    sections_included: usize,
    sections_total: usize,
    total_tokens: usize,
    budget: usize,
}

async fn ask_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    info!(question_len = payload.question.len(), "Ask request received");

    let result = state.agent.ask(&payload.question).await?;
    Ok(Json(AskResponse {
        question: result.question,
        answer: result.answer,
        sections_included: result.metadata.included.len(),
        included: result.metadata.included,
        sections_total: result.metadata.sections_total,
        total_tokens: result.metadata.total_tokens,
        budget: result.metadata.budget,
    }))
}

/// Error body for API failures.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<docsgpt_core::Error> for ApiError {
    fn from(e: docsgpt_core::Error) -> Self {
        use docsgpt_core::Error;

        let status = match &e {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Provider(_) | Error::Index(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::BAD_REQUEST {
            warn!(error = %e, "Rejected ask request");
        } else {
            error!(error = %e, "Ask pipeline failed");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docsgpt_agent::{CharEstimateCounter, RagSettings};
    use docsgpt_core::corpus::DocumentChunk;
    use docsgpt_core::error::ProviderError;
    use docsgpt_core::index::{VectorIndex, VectorRecord};
    use docsgpt_core::message::Message;
    use docsgpt_core::provider::{
        EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
    };
    use docsgpt_store::{CorpusStore, InMemoryIndex};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Echoes the number of prompt characters; embeds everything to `[1, 0]`.
    struct EchoProvider;

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let prompt = &request.messages[1].content;
            Ok(ProviderResponse {
                message: Message::assistant(format!("answer from {} chars", prompt.len())),
                usage: None,
                model: request.model,
            })
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|_| vec![1.0, 0.0]).collect(),
                model: request.model,
                usage: None,
            })
        }
    }

    async fn test_agent(corpus: CorpusStore) -> Arc<RagAgent> {
        let index = Arc::new(InMemoryIndex::new("test", 2));
        index
            .upsert(&[
                VectorRecord { id: 1, values: vec![1.0, 0.0] },
                VectorRecord { id: 2, values: vec![0.0, 1.0] },
            ])
            .await
            .unwrap();
        Arc::new(RagAgent::new(
            Arc::new(EchoProvider),
            index,
            Arc::new(corpus),
            Arc::new(CharEstimateCounter),
            RagSettings::default(),
        ))
    }

    fn full_corpus() -> CorpusStore {
        CorpusStore::from_chunks([
            DocumentChunk { id: 1, text: "Open spaces with openImmersiveSpace.".into() },
            DocumentChunk { id: 2, text: "Volumes use the volumetric window style.".into() },
        ])
    }

    async fn test_state() -> SharedState {
        let agent = test_agent(full_corpus()).await;
        Arc::new(
            AppState::prepare(agent, "How to open a full immersive space?")
                .await
                .unwrap(),
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state().await);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn index_serves_precomputed_showcase() {
        let app = build_router(test_state().await);

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("visionOS Docs GPT"));
        assert!(text.contains("How to open a full immersive space?"));
        assert!(text.contains("answer from"));
    }

    #[tokio::test]
    async fn serves_static_assets() {
        let app = build_router(test_state().await);

        let req = Request::builder()
            .uri("/static/style.css")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/css"));

        let req = Request::builder()
            .uri("/static/app.js")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("javascript"));
    }

    #[tokio::test]
    async fn ask_returns_answer_and_metadata() {
        let app = build_router(test_state().await);

        let response = app
            .oneshot(ask_request(r#"{"question": "What is a volume?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["question"], "What is a volume?");
        assert!(json["answer"].as_str().unwrap().starts_with("answer from"));
        assert_eq!(json["included"], serde_json::json!([1, 2]));
        assert_eq!(json["sections_included"], 2);
        assert_eq!(json["sections_total"], 2);
        assert_eq!(json["budget"], 3596);
    }

    #[tokio::test]
    async fn blank_question_is_bad_request() {
        let app = build_router(test_state().await);

        let response = app.oneshot(ask_request(r#"{"question": " "}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn corpus_desync_is_server_error() {
        let agent = test_agent(CorpusStore::from_chunks([DocumentChunk {
            id: 1,
            text: "only one".into(),
        }]))
        .await;
        let state = Arc::new(AppState {
            agent,
            page: String::new(),
        });
        let app = build_router(state);

        let response = app.oneshot(ask_request(r#"{"question": "q"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Chunk 2"));
    }

    #[tokio::test]
    async fn showcase_fails_when_pipeline_fails() {
        let agent = test_agent(CorpusStore::default()).await;
        assert!(AppState::prepare(agent, "q").await.is_err());
    }
}
