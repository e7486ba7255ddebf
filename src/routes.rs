//! HTTP layer powered by axum.
//!
//! Two identical report endpoints (GET and POST), a liveness check, and a
//! root path listing what the API serves.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use report::ReportPipeline;

/// Shared handler state: the pipeline (which owns the cache) and the
/// province allow-list.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub provinces: Arc<Vec<String>>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/weather", get(weather_report).post(weather_report))
        .with_state(state)
}

/// Request-level failures, rendered FastAPI-style as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<common::Error> for ApiError {
    fn from(e: common::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    province: String,
}

/// Serves both `GET /weather` and `POST /weather`.
async fn weather_report(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Html<String>, ApiError> {
    let province = params.province.as_str();

    if !state.provinces.iter().any(|p| p == province) {
        return Err(ApiError::BadRequest(format!(
            "จังหวัด '{}' ไม่พบในรายการ กรุณาเลือกจาก: {}",
            province,
            state.provinces.join(", ")
        )));
    }

    let report = state.pipeline.run(province).await.map_err(|e| {
        error!("Report generation failed for {}: {}", province, e);
        ApiError::from(e)
    })?;

    if report.html.is_empty() {
        return Err(ApiError::Internal(
            "ไม่สามารถสร้างรายงานสภาพอากาศได้ กรุณาลองใหม่อีกครั้ง".into(),
        ));
    }

    info!("Serving report for {} ({} bytes)", province, report.html.len());
    Ok(Html(report.html))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "API is running" }))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Weather Report API",
        "health": "/health",
        "weather": "/weather?province=กรุงเทพมหานคร"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use common::{Result, SearchProvider, Summarizer};
    use http_body_util::BodyExt;
    use report::new_report_cache;
    use tower::ServiceExt;

    struct StaticSearch(&'static str);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct StaticSummarizer(&'static str);

    #[async_trait]
    impl Summarizer for StaticSummarizer {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            Err(common::Error::Search("upstream down".into()))
        }
    }

    fn test_app(search: Arc<dyn SearchProvider>, summarizer: Arc<dyn Summarizer>) -> Router {
        // ASCII province names keep the test URIs simple.
        let provinces = Arc::new(vec!["Bangkok".to_string(), "Phuket".to_string()]);
        let pipeline = Arc::new(ReportPipeline::new(
            search,
            summarizer,
            new_report_cache(),
            1800,
        ));
        router(AppState {
            pipeline,
            provinces,
        })
    }

    async fn body_string(response: Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
    }

    #[tokio::test]
    async fn test_health_always_ok() {
        let app = test_app(Arc::new(FailingSearch), Arc::new(StaticSummarizer("")));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_root_lists_paths() {
        let app = test_app(
            Arc::new(StaticSearch("raw")),
            Arc::new(StaticSummarizer("<div>x</div>")),
        );
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("/health"));
        assert!(body.contains("/weather"));
    }

    #[tokio::test]
    async fn test_unknown_province_is_400_with_options() {
        let app = test_app(
            Arc::new(StaticSearch("raw")),
            Arc::new(StaticSummarizer("<div>x</div>")),
        );
        let response = app
            .oneshot(
                Request::get("/weather?province=Atlantis")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Atlantis"));
        assert!(body.contains("Bangkok"));
        assert!(body.contains("Phuket"));
    }

    #[tokio::test]
    async fn test_valid_province_returns_html() {
        let app = test_app(
            Arc::new(StaticSearch("hot, 35C")),
            Arc::new(StaticSummarizer("```html\n<div>Bangkok</div>\n```")),
        );
        let response = app
            .oneshot(
                Request::get("/weather?province=Bangkok")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));
        assert_eq!(body_string(response).await, "<div>Bangkok</div>");
    }

    #[tokio::test]
    async fn test_post_matches_get_contract() {
        let app = test_app(
            Arc::new(StaticSearch("hot")),
            Arc::new(StaticSummarizer("<div>Phuket</div>")),
        );
        let response = app
            .oneshot(
                Request::post("/weather?province=Phuket")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<div>Phuket</div>");
    }

    #[tokio::test]
    async fn test_empty_generation_is_500() {
        let app = test_app(Arc::new(StaticSearch("raw")), Arc::new(StaticSummarizer("")));
        let response = app
            .oneshot(
                Request::get("/weather?province=Bangkok")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.contains("detail"));
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_500() {
        let app = test_app(Arc::new(FailingSearch), Arc::new(StaticSummarizer("x")));
        let response = app
            .oneshot(
                Request::get("/weather?province=Bangkok")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.contains("upstream down"));
    }
}
