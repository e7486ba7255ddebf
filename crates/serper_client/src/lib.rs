//! Serper search API client.
//!
//! Sends a query to `google.serper.dev` and flattens the structured
//! response (answer box, knowledge graph, organic hits) into the single
//! unstructured text blob the summarizer works from.

use async_trait::async_trait;
use common::{Error, SearchProvider};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const SEARCH_URL: &str = "https://google.serper.dev/search";
const MAX_ORGANIC_SNIPPETS: usize = 5;

/// Serper search API client.
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Response from POST /search.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "answerBox", default)]
    pub answer_box: Option<AnswerBox>,
    #[serde(rename = "knowledgeGraph", default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerBox {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl SerperClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, timeout_secs, SEARCH_URL.to_string())
    }

    /// Construct against a non-default endpoint (used by tests).
    pub fn with_base_url(api_key: String, timeout_secs: u64, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("weather-api/0.1")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build Serper HTTP client");

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Run a search and return the flattened text summary.
    pub async fn run(&self, query: &str) -> Result<String, Error> {
        debug!("Serper search: {}", query);

        let resp = self
            .client
            .post(&self.base_url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "gl": "th", "hl": "th" }))
            .send()
            .await
            .map_err(|e| Error::Search(format!("HTTP error for query '{query}': {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Search(format!(
                "Serper returned {} for query '{}': {}",
                status,
                query,
                truncate_body(&body, 500)
            )));
        }

        let payload: SearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::Search(format!("JSON parse error for query '{query}': {e}")))?;

        let summary = flatten_response(&payload);
        if summary.is_empty() {
            return Err(Error::Search(format!("No results for query '{query}'")));
        }

        Ok(summary)
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<String, Error> {
        self.run(query).await
    }
}

/// Truncate an upstream error body to at most `max` bytes, backing off to
/// the nearest char boundary so Thai (multi-byte) bodies never split.
fn truncate_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Flatten a structured search response into one text blob, preferring the
/// most direct answer the API gives us.
fn flatten_response(resp: &SearchResponse) -> String {
    if let Some(answer_box) = &resp.answer_box {
        if let Some(answer) = answer_box.answer.as_deref().filter(|s| !s.is_empty()) {
            return answer.to_string();
        }
        if let Some(snippet) = answer_box.snippet.as_deref().filter(|s| !s.is_empty()) {
            return snippet.to_string();
        }
    }

    if let Some(kg) = &resp.knowledge_graph {
        if let Some(description) = kg.description.as_deref().filter(|s| !s.is_empty()) {
            return match kg.title.as_deref() {
                Some(title) if !title.is_empty() => format!("{title}: {description}"),
                _ => description.to_string(),
            };
        }
    }

    resp.organic
        .iter()
        .filter_map(|hit| hit.snippet.as_deref())
        .filter(|s| !s.is_empty())
        .take(MAX_ORGANIC_SNIPPETS)
        .collect::<Vec<_>>()
        .join("\n")
}
