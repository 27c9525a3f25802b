//! HTTP server for the search front end.
//!
//! Serves the single-page UI and the JSON search API it talks to.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::OrgSearchError;
use crate::format::SearchResult;
use crate::orchestrator::Orchestrator;
use crate::suggestions::filter_suggestions;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

const INDEX_HTML: &str = include_str!("../../../web/index.html");

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Serve, &settings)?;

    let orchestrator = Orchestrator::new(&settings).await?;
    let state = Arc::new(AppState { orchestrator });

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("orgsearch");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Search page", "GET  /");
    Output::kv("Search API", "POST /api/search");
    Output::kv("Suggestions", "GET  /api/suggestions?q=");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    info!("Server listening on {}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/search", post(search))
        .route("/api/suggestions", get(suggestions))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A failed search, ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, details: Option<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.to_string(),
                details,
            },
        }
    }

    pub fn missing_text() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Missing query text", None)
    }

    pub fn invalid_text() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Query text must be a string", None)
    }
}

impl From<OrgSearchError> for ApiError {
    fn from(err: OrgSearchError) -> Self {
        match err {
            OrgSearchError::InvalidInput(_) => Self::missing_text(),
            OrgSearchError::InvalidResponse(details) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid JSON response",
                Some(details),
            ),
            OrgSearchError::NoConcepts => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "No concepts extracted", None)
            }
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to query search index",
                Some(other.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn suggestions(Query(params): Query<SuggestionParams>) -> Json<Vec<&'static str>> {
    Json(filter_suggestions(&params.q))
}

/// Read `text` from a JSON body, whatever its content type.
///
/// Numbers and `true` are stringified; absent, empty, `null`, `false` and `0`
/// count as missing.
pub fn query_text(body: &[u8]) -> Result<String, ApiError> {
    let payload: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Unparseable search body: {}", e);
        ApiError::missing_text()
    })?;

    let text = match payload.get("text") {
        None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => String::new(),
        Some(serde_json::Value::Bool(true)) => "true".to_string(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(_) => return Err(ApiError::invalid_text()),
    };

    if text.trim().is_empty() {
        return Err(ApiError::missing_text());
    }
    Ok(text)
}

/// POST /api/search - question → concepts → index search → ranked videos.
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let text = query_text(&body)?;

    match state.orchestrator.search(&text).await {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            error!("Search failed for {:?}: {}", text, e);
            Err(ApiError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::ConceptExtractor;
    use crate::orchestrator::tests::{calculus_hit, derivative_concepts, StubExtractor, StubSearch};
    use crate::search::RecordSearch;
    use std::sync::atomic::Ordering;

    fn state(
        extractor: Arc<dyn ConceptExtractor>,
        searcher: Arc<dyn RecordSearch>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            orchestrator: Orchestrator::with_components(extractor, searcher, &Settings::default()),
        })
    }

    fn request(text: Option<&str>) -> Bytes {
        let body = match text {
            Some(text) => serde_json::json!({ "text": text }),
            None => serde_json::json!({}),
        };
        Bytes::from(body.to_string())
    }

    async fn into_parts(
        result: Result<Json<Vec<SearchResult>>, ApiError>,
    ) -> (StatusCode, serde_json::Value) {
        let response = result.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_returns_plain_list() {
        let state = state(
            StubExtractor::new(derivative_concepts),
            StubSearch::new(vec![calculus_hit()]),
        );

        let (status, body) = into_parts(
            search(State(state), request(Some("What is the derivative of a function?"))).await,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                { "title": "Calculus Basics", "url": "http://x", "similarity_score": 0.87 }
            ])
        );
    }

    #[tokio::test]
    async fn test_missing_text_is_400_without_outbound_calls() {
        let extractor = StubExtractor::new(derivative_concepts);
        let searcher = StubSearch::new(vec![calculus_hit()]);

        for text in [None, Some(""), Some("   ")] {
            let state = state(extractor.clone(), searcher.clone());
            let (status, body) = into_parts(search(State(state), request(text)).await).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({ "error": "Missing query text" }));
        }

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(searcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_concept_json_is_500() {
        let state = state(
            StubExtractor::new(|| {
                Err(OrgSearchError::InvalidResponse(
                    "expected value at line 1 column 1".to_string(),
                ))
            }),
            StubSearch::new(vec![calculus_hit()]),
        );

        let (status, body) =
            into_parts(search(State(state), request(Some("What is torque?"))).await).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Invalid JSON response");
        assert_eq!(body["details"], "expected value at line 1 column 1");
    }

    #[tokio::test]
    async fn test_empty_concepts_is_500() {
        let state = state(
            StubExtractor::new(|| Err(OrgSearchError::NoConcepts)),
            StubSearch::new(vec![calculus_hit()]),
        );

        let (status, body) =
            into_parts(search(State(state), request(Some("What is torque?"))).await).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "No concepts extracted" }));
    }

    #[tokio::test]
    async fn test_search_failure_is_500_with_details() {
        let state = state(StubExtractor::new(derivative_concepts), StubSearch::failing());

        let (status, body) =
            into_parts(search(State(state), request(Some("What is torque?"))).await).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to query search index");
        assert!(body["details"].as_str().unwrap().contains("503"));
    }

    #[test]
    fn test_query_text_accepts_scalars() {
        assert_eq!(query_text(br#"{"text":"What is torque?"}"#).unwrap(), "What is torque?");
        assert_eq!(query_text(br#"{"text":42}"#).unwrap(), "42");
        assert_eq!(query_text(br#"{"text":true}"#).unwrap(), "true");
    }

    #[test]
    fn test_query_text_missing_and_wrong_types() {
        let missing: [&[u8]; 6] = [
            b"{not json",
            br#"{}"#,
            br#"{"text":null}"#,
            br#"{"text":false}"#,
            br#"{"text":0}"#,
            br#"{"text":"  "}"#,
        ];
        for body in missing {
            let err = query_text(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.error, "Missing query text");
        }

        let wrong_type: [&[u8]; 2] = [br#"{"text":["a"]}"#, br#"{"text":{"q":"a"}}"#];
        for body in wrong_type {
            let err = query_text(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.error, "Query text must be a string");
        }
    }

    #[tokio::test]
    async fn test_body_is_read_without_json_content_type() {
        let state = state(
            StubExtractor::new(derivative_concepts),
            StubSearch::new(vec![calculus_hit()]),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        let client = reqwest::Client::new();
        let url = format!("http://{}/api/search", addr);

        let plain = client
            .post(&url)
            .header("content-type", "text/plain")
            .body(r#"{"text":"What is the derivative of a function?"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(plain.status(), reqwest::StatusCode::OK);
        let results: Vec<SearchResult> = plain.json().await.unwrap();
        assert_eq!(results[0].title, "Calculus Basics");

        let untyped = client
            .post(&url)
            .body(r#"{"text":"What is torque?"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(untyped.status(), reqwest::StatusCode::OK);

        let numeric = client
            .post(&url)
            .json(&serde_json::json!({ "text": 42 }))
            .send()
            .await
            .unwrap();
        assert_eq!(numeric.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_over_tcp() {
        let state = state(
            StubExtractor::new(derivative_concepts),
            StubSearch::new(vec![calculus_hit()]),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        let client = reqwest::Client::new();
        let base = format!("http://{}", addr);

        let page = client.get(&base).send().await.unwrap();
        assert_eq!(page.status(), reqwest::StatusCode::OK);
        assert!(page.text().await.unwrap().contains("/api/search"));

        let malformed = client
            .post(format!("{}/api/search", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: ErrorResponse = malformed.json().await.unwrap();
        assert_eq!(body.error, "Missing query text");

        let found = client
            .post(format!("{}/api/search", base))
            .json(&serde_json::json!({ "text": "What is the derivative of a function?" }))
            .send()
            .await
            .unwrap();
        assert_eq!(found.status(), reqwest::StatusCode::OK);
        let results: Vec<SearchResult> = found.json().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Calculus Basics");

        let suggestions: Vec<String> = client
            .get(format!("{}/api/suggestions?q=newton", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(suggestions, vec!["What are Newton's laws of motion?"]);

        let health: serde_json::Value = client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
    }
}
