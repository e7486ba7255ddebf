//! Domain types shared across the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A generated weather report for one province.
///
/// `html` is non-empty only after a successful pipeline run; `generated_at`
/// never moves backwards for a given province because entries are only
/// overwritten with freshly stamped reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Province name (cache key).
    pub province: String,
    /// Raw unstructured text from the search API.
    pub raw_weather: String,
    /// Summarized Thai-language HTML fragment.
    pub html: String,
    /// When `html` was generated.
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Whether this report is still within the freshness window.
    pub fn is_fresh(&self, max_age_secs: u64, now: DateTime<Utc>) -> bool {
        let age = now - self.generated_at;
        age >= chrono::Duration::zero() && age.num_seconds() as u64 <= max_age_secs
    }
}

/// Text search capability — given a query, returns unstructured text.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, Error>;
}

/// Text generation capability — given a prompt, returns generated text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, Error>;
}
