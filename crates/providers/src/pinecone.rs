//! Pinecone vector index client (pod-based, environment-addressed API).
//!
//! Two surfaces:
//! - [`PineconeClient`] talks to the environment controller: list, create,
//!   and describe indexes.
//! - [`PineconeIndex`] talks to one index's data plane and implements
//!   [`VectorIndex`]: upsert, query, stats.

use std::time::Duration;

use async_trait::async_trait;
use docsgpt_core::corpus::ChunkId;
use docsgpt_core::error::IndexError;
use docsgpt_core::index::{IndexStats, RankedMatch, VectorIndex, VectorRecord, check_dimensions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const READY_MAX_POLLS: u32 = 90;

/// Parameters for creating an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub pod_type: String,
}

/// Controller-plane client for one Pinecone environment.
#[derive(Clone)]
pub struct PineconeClient {
    client: reqwest::Client,
    controller_url: String,
    api_key: String,
    ready_poll_interval: Duration,
    ready_max_polls: u32,
}

impl PineconeClient {
    /// Client for `https://controller.{environment}.pinecone.io`.
    pub fn new(
        api_key: impl Into<String>,
        environment: &str,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        Self::with_controller_url(api_key, controller_url(environment), timeout)
    }

    /// Client for an explicit controller URL (proxies, local emulators).
    pub fn with_controller_url(
        api_key: impl Into<String>,
        controller_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Network(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            controller_url: controller_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            ready_poll_interval: READY_POLL_INTERVAL,
            ready_max_polls: READY_MAX_POLLS,
        })
    }

    /// Override how often and how many times `ensure_index` polls for
    /// readiness.
    pub fn with_readiness_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.ready_poll_interval = interval;
        self.ready_max_polls = max_polls.max(1);
        self
    }

    /// Names of all indexes in the environment.
    pub async fn list_indexes(&self) -> Result<Vec<String>, IndexError> {
        let url = format!("{}/databases", self.controller_url);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;
        let response = check_status(response, "list indexes").await?;
        response
            .json()
            .await
            .map_err(|e| IndexError::Network(format!("Failed to parse index list: {e}")))
    }

    /// Create an index. Returns once the controller accepted the request.
    pub async fn create_index(&self, spec: &IndexSpec) -> Result<(), IndexError> {
        let url = format!("{}/databases", self.controller_url);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(spec)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;
        check_status(response, &spec.name).await?;
        info!(index = %spec.name, dimension = spec.dimension, metric = %spec.metric, "Created index");
        Ok(())
    }

    /// Fetch an index's configuration and readiness.
    pub async fn describe_index(&self, name: &str) -> Result<IndexDescription, IndexError> {
        let url = format!("{}/databases/{}", self.controller_url, name);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;
        let response = check_status(response, name).await?;
        response
            .json()
            .await
            .map_err(|e| IndexError::Network(format!("Failed to parse index description: {e}")))
    }

    /// Create the index when it does not exist, wait until it is ready, and
    /// connect to its data plane.
    pub async fn ensure_index(&self, spec: &IndexSpec) -> Result<PineconeIndex, IndexError> {
        let existing = self.list_indexes().await?;
        if existing.iter().any(|name| name == &spec.name) {
            debug!(index = %spec.name, "Index already exists");
        } else {
            info!(index = %spec.name, "Creating index");
            self.create_index(spec).await?;
        }

        let mut polls = 0;
        let description = loop {
            let description = self.describe_index(&spec.name).await?;
            if description.status.ready {
                break description;
            }
            polls += 1;
            if polls >= self.ready_max_polls {
                return Err(IndexError::NotReady(format!(
                    "'{}' still {} after {polls} polls",
                    spec.name, description.status.state
                )));
            }
            debug!(index = %spec.name, state = %description.status.state, "Waiting for index");
            tokio::time::sleep(self.ready_poll_interval).await;
        };

        if description.database.dimension != spec.dimension {
            warn!(
                index = %spec.name,
                configured = spec.dimension,
                actual = description.database.dimension,
                "Index dimension differs from configuration"
            );
        }

        Ok(self.connect(
            &spec.name,
            &description.status.host,
            description.database.dimension,
        ))
    }

    /// Data-plane handle for an index at `host`.
    pub fn connect(&self, name: &str, host: &str, dimension: usize) -> PineconeIndex {
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };
        PineconeIndex {
            client: self.client.clone(),
            base_url,
            api_key: self.api_key.clone(),
            name: name.to_string(),
            dimension,
        }
    }
}

fn controller_url(environment: &str) -> String {
    format!("https://controller.{environment}.pinecone.io")
}

async fn check_status(
    response: reqwest::Response,
    target: &str,
) -> Result<reqwest::Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    match code {
        401 | 403 => Err(IndexError::AuthenticationFailed(
            "Invalid Pinecone API key".into(),
        )),
        404 => Err(IndexError::NotFound(target.to_string())),
        _ => {
            let body = response.text().await.unwrap_or_default();
            warn!(status = code, target, body = %body, "Pinecone returned error");
            Err(IndexError::ApiError {
                status_code: code,
                message: body,
            })
        }
    }
}

/// Controller response for `GET /databases/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub database: DatabaseInfo,
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub pod_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub host: String,
}

/// Data-plane client for a single index.
pub struct PineconeIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    name: String,
    dimension: usize,
}

impl std::fmt::Debug for PineconeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeIndex")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl PineconeIndex {
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, IndexError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;
        check_status(response, &self.name).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, IndexError> {
        if records.is_empty() {
            return Ok(0);
        }
        check_dimensions(records, self.dimension)?;

        let body = UpsertRequest {
            vectors: records
                .iter()
                .map(|r| ApiVector {
                    id: r.id.to_string(),
                    values: &r.values,
                })
                .collect(),
        };
        let response = self.post("/vectors/upsert", &body).await?;
        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Network(format!("Failed to parse upsert response: {e}")))?;
        debug!(index = %self.name, upserted = parsed.upserted_count, "Upserted vectors");
        Ok(parsed.upserted_count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RankedMatch>, IndexError> {
        let body = QueryRequest {
            vector,
            top_k,
            include_values: false,
            include_metadata: true,
        };
        let response = self.post("/query", &body).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Network(format!("Failed to parse query response: {e}")))?;
        parsed.into_ranked_matches()
    }

    async fn stats(&self) -> Result<IndexStats, IndexError> {
        let response = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await?;
        let parsed: StatsResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Network(format!("Failed to parse index stats: {e}")))?;
        Ok(IndexStats {
            vector_count: parsed.total_vector_count,
            dimension: parsed.dimension,
        })
    }
}

// --- Data-plane API types ---

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<ApiVector<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiVector<'a> {
    id: String,
    values: &'a [f32],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

impl QueryResponse {
    fn into_ranked_matches(self) -> Result<Vec<RankedMatch>, IndexError> {
        self.matches
            .into_iter()
            .map(|m| {
                let id: ChunkId = m
                    .id
                    .trim()
                    .parse()
                    .map_err(|_| IndexError::InvalidMatchId(m.id.clone()))?;
                Ok(RankedMatch::new(id, m.score))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: usize,
    #[serde(default)]
    total_vector_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> PineconeClient {
        PineconeClient::with_controller_url(
            "pc-test",
            "http://127.0.0.1:9",
            Duration::from_millis(50),
        )
        .unwrap()
    }

    #[test]
    fn controller_url_uses_environment() {
        assert_eq!(
            controller_url("us-west1-gcp"),
            "https://controller.us-west1-gcp.pinecone.io"
        );
        let client = PineconeClient::new("k", "gcp-starter", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.controller_url,
            "https://controller.gcp-starter.pinecone.io"
        );
    }

    #[test]
    fn connect_adds_scheme_to_bare_host() {
        let index = offline_client().connect(
            "visionos-docs",
            "visionos-docs-abc123.svc.us-west1-gcp.pinecone.io",
            1536,
        );
        assert_eq!(
            index.base_url(),
            "https://visionos-docs-abc123.svc.us-west1-gcp.pinecone.io"
        );
        assert_eq!(index.dimension(), 1536);
        assert_eq!(index.name(), "visionos-docs");
    }

    #[test]
    fn index_spec_serializes_controller_fields() {
        let spec = IndexSpec {
            name: "visionos-docs-2023-07-10".into(),
            dimension: 1536,
            metric: "cosine".into(),
            pod_type: "p1".into(),
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["dimension"], 1536);
        assert_eq!(json["pod_type"], "p1");
        assert_eq!(json["metric"], "cosine");
    }

    #[test]
    fn upsert_body_uses_string_ids() {
        let values = vec![0.5f32, -0.25];
        let body = UpsertRequest {
            vectors: vec![ApiVector {
                id: 17.to_string(),
                values: &values,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["vectors"][0]["id"], "17");
        assert_eq!(json["vectors"][0]["values"][1], -0.25);
    }

    #[test]
    fn query_body_is_camel_case() {
        let vector = [0.1f32, 0.2];
        let json = serde_json::to_value(QueryRequest {
            vector: &vector,
            top_k: 100,
            include_values: false,
            include_metadata: true,
        })
        .unwrap();
        assert_eq!(json["topK"], 100);
        assert_eq!(json["includeMetadata"], true);
        assert!(json.get("top_k").is_none());
    }

    #[test]
    fn parse_query_matches_in_rank_order() {
        let data = r#"{
            "matches": [
                {"id": "12", "score": 0.91, "values": []},
                {"id": "3", "score": 0.87, "values": []}
            ],
            "namespace": ""
        }"#;
        let parsed: QueryResponse = serde_json::from_str(data).unwrap();
        let matches = parsed.into_ranked_matches().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, 12);
        assert_eq!(matches[1].id, 3);
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn non_numeric_match_id_is_error() {
        let data = r#"{"matches": [{"id": "doc-12", "score": 0.5}]}"#;
        let parsed: QueryResponse = serde_json::from_str(data).unwrap();
        assert!(matches!(
            parsed.into_ranked_matches(),
            Err(IndexError::InvalidMatchId(id)) if id == "doc-12"
        ));
    }

    #[test]
    fn parse_stats_and_description() {
        let stats: StatsResponse = serde_json::from_str(
            r#"{"namespaces": {"": {"vectorCount": 42}}, "dimension": 1536, "indexFullness": 0.0, "totalVectorCount": 42}"#,
        )
        .unwrap();
        assert_eq!(stats.total_vector_count, 42);
        assert_eq!(stats.dimension, 1536);

        let description: IndexDescription = serde_json::from_str(
            r#"{
                "database": {"name": "visionos-docs-2023-07-10", "metric": "cosine", "dimension": 1536, "replicas": 1, "shards": 1, "pods": 1, "pod_type": "p1.x1"},
                "status": {"waiting": [], "crashed": [], "host": "visionos-docs-2023-07-10-abc.svc.us-west1-gcp.pinecone.io", "port": 433, "state": "Ready", "ready": true}
            }"#,
        )
        .unwrap();
        assert!(description.status.ready);
        assert_eq!(description.database.dimension, 1536);
        assert!(description.status.host.contains(".svc."));
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension_before_sending() {
        let index = offline_client().connect("idx", "http://127.0.0.1:9", 4);
        let err = index
            .upsert(&[VectorRecord {
                id: 1,
                values: vec![0.0; 3],
            }])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch { id: 1, expected: 4, actual: 3 }
        ));
    }

    #[tokio::test]
    async fn empty_upsert_is_noop() {
        let index = offline_client().connect("idx", "http://127.0.0.1:9", 4);
        assert_eq!(index.upsert(&[]).await.unwrap(), 0);
    }

    // --- Controller round trips against a local fake ---

    mod controller {
        use super::*;
        use axum::extract::{Path, State};
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use axum::routing::get;
        use axum::{Json, Router};
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::{Arc, Mutex};

        const HOST: &str = "visionos-docs-abc.svc.test.pinecone.io";

        struct FakeController {
            indexes: Mutex<Vec<String>>,
            created: Mutex<Vec<serde_json::Value>>,
            describes: AtomicU32,
            /// Describe calls answered with `ready: false` before the first ready one.
            not_ready_polls: u32,
            dimension: usize,
        }

        impl FakeController {
            fn new(existing: &[&str], not_ready_polls: u32, dimension: usize) -> Arc<Self> {
                Arc::new(Self {
                    indexes: Mutex::new(existing.iter().map(|n| n.to_string()).collect()),
                    created: Mutex::new(Vec::new()),
                    describes: AtomicU32::new(0),
                    not_ready_polls,
                    dimension,
                })
            }

            fn created(&self) -> Vec<serde_json::Value> {
                self.created.lock().unwrap().clone()
            }

            fn describes(&self) -> u32 {
                self.describes.load(Ordering::SeqCst)
            }
        }

        async fn list(State(fake): State<Arc<FakeController>>) -> Json<Vec<String>> {
            Json(fake.indexes.lock().unwrap().clone())
        }

        async fn create(
            State(fake): State<Arc<FakeController>>,
            Json(body): Json<serde_json::Value>,
        ) -> StatusCode {
            let name = body["name"].as_str().unwrap_or_default().to_string();
            fake.indexes.lock().unwrap().push(name);
            fake.created.lock().unwrap().push(body);
            StatusCode::CREATED
        }

        async fn describe(
            State(fake): State<Arc<FakeController>>,
            Path(name): Path<String>,
        ) -> Response {
            if !fake.indexes.lock().unwrap().contains(&name) {
                return StatusCode::NOT_FOUND.into_response();
            }
            let call = fake.describes.fetch_add(1, Ordering::SeqCst) + 1;
            let ready = call > fake.not_ready_polls;
            Json(serde_json::json!({
                "database": {
                    "name": name,
                    "dimension": fake.dimension,
                    "metric": "cosine",
                    "pod_type": "p1.x1"
                },
                "status": {
                    "ready": ready,
                    "state": if ready { "Ready" } else { "Initializing" },
                    "host": HOST
                }
            }))
            .into_response()
        }

        async fn serve(fake: Arc<FakeController>) -> PineconeClient {
            let app = Router::new()
                .route("/databases", get(list).post(create))
                .route("/databases/{name}", get(describe))
                .with_state(fake);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            PineconeClient::with_controller_url(
                "pc-test",
                format!("http://{addr}"),
                Duration::from_secs(5),
            )
            .unwrap()
            .with_readiness_polling(Duration::from_millis(1), 3)
        }

        fn spec() -> IndexSpec {
            IndexSpec {
                name: "visionos-docs".into(),
                dimension: 1536,
                metric: "cosine".into(),
                pod_type: "p1".into(),
            }
        }

        #[tokio::test]
        async fn missing_index_is_created_then_connected() {
            let fake = FakeController::new(&[], 1, 1536);
            let client = serve(fake.clone()).await;

            let index = client.ensure_index(&spec()).await.unwrap();

            let created = fake.created();
            assert_eq!(created.len(), 1);
            assert_eq!(created[0]["name"], "visionos-docs");
            assert_eq!(created[0]["dimension"], 1536);
            assert_eq!(created[0]["metric"], "cosine");
            assert_eq!(created[0]["pod_type"], "p1");

            assert_eq!(fake.describes(), 2);
            assert_eq!(index.base_url(), format!("https://{HOST}"));
            assert_eq!(index.name(), "visionos-docs");
            assert_eq!(index.dimension(), 1536);
        }

        #[tokio::test]
        async fn existing_index_is_not_created_again() {
            let fake = FakeController::new(&["other", "visionos-docs"], 0, 1536);
            let client = serve(fake.clone()).await;

            client.ensure_index(&spec()).await.unwrap();

            assert!(fake.created().is_empty());
            assert_eq!(fake.describes(), 1);
            assert_eq!(
                client.list_indexes().await.unwrap(),
                vec!["other".to_string(), "visionos-docs".to_string()]
            );
        }

        #[tokio::test]
        async fn index_that_never_becomes_ready_fails() {
            let fake = FakeController::new(&["visionos-docs"], u32::MAX, 1536);
            let client = serve(fake.clone()).await;

            let err = client.ensure_index(&spec()).await.unwrap_err();
            assert!(matches!(err, IndexError::NotReady(ref m) if m.contains("Initializing")));
            assert_eq!(fake.describes(), 3);
        }

        #[tokio::test]
        async fn connected_dimension_comes_from_the_index() {
            let fake = FakeController::new(&["visionos-docs"], 0, 768);
            let client = serve(fake).await;

            let index = client.ensure_index(&spec()).await.unwrap();
            assert_eq!(index.dimension(), 768);
        }

        #[tokio::test]
        async fn describing_unknown_index_is_not_found() {
            let client = serve(FakeController::new(&[], 0, 1536)).await;
            let err = client.describe_index("nope").await.unwrap_err();
            assert!(matches!(err, IndexError::NotFound(ref name) if name == "nope"));
        }
    }
}
