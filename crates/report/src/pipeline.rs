//! Report generation pipeline.
//!
//! A four-stage state machine per request: check the cache, fetch raw
//! weather text on a miss, summarize it into HTML, then publish the result
//! back to the cache. Concurrent misses for the same province may duplicate
//! the external calls; the last write to the cache wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{Report, Result, SearchProvider, Summarizer};
use tracing::{debug, info};

use crate::cache::ReportCache;
use crate::fence::strip_code_fence;

/// Pipeline stages. `CheckingCache` routes straight to `Done` on a fresh
/// hit, otherwise through `Fetching` and `Building`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    CheckingCache,
    Fetching,
    Building,
    Done,
}

/// Working state carried between stages.
#[derive(Debug, Clone, Default)]
struct RunState {
    raw_weather: String,
    html: String,
    generated_at: Option<DateTime<Utc>>,
    from_cache: bool,
}

/// The report generation pipeline. Owns the cache; request handlers hold a
/// shared handle to the whole pipeline.
pub struct ReportPipeline {
    search: Arc<dyn SearchProvider>,
    summarizer: Arc<dyn Summarizer>,
    cache: ReportCache,
    ttl_secs: u64,
}

impl ReportPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        summarizer: Arc<dyn Summarizer>,
        cache: ReportCache,
        ttl_secs: u64,
    ) -> Self {
        Self {
            search,
            summarizer,
            cache,
            ttl_secs,
        }
    }

    /// Produce a report for `province`, from cache when fresh.
    ///
    /// Collaborator failures propagate; no retry. A run that completes with
    /// empty HTML is returned as-is for the caller to classify.
    pub async fn run(&self, province: &str) -> Result<Report> {
        let mut stage = Stage::CheckingCache;
        let mut state = RunState::default();

        loop {
            stage = match stage {
                Stage::CheckingCache => self.check_cache(province, &mut state),
                Stage::Fetching => {
                    self.fetch_weather(province, &mut state).await?;
                    Stage::Building
                }
                Stage::Building => {
                    self.build_html(province, &mut state).await?;
                    Stage::Done
                }
                Stage::Done => break,
            };
        }

        let report = Report {
            province: province.to_string(),
            raw_weather: state.raw_weather,
            html: state.html,
            generated_at: state.generated_at.unwrap_or_else(Utc::now),
        };

        // Only freshly built reports are written back; a hit would just
        // re-insert the value we read, and could roll back a concurrent
        // rebuild's newer timestamp.
        if !state.from_cache {
            self.cache.insert(province.to_string(), report.clone());
        }

        Ok(report)
    }

    fn check_cache(&self, province: &str, state: &mut RunState) -> Stage {
        if let Some(cached) = self.cache.get(province) {
            if !cached.html.is_empty() && cached.is_fresh(self.ttl_secs, Utc::now()) {
                debug!("Cache hit for {}", province);
                state.raw_weather = cached.raw_weather.clone();
                state.html = cached.html.clone();
                state.generated_at = Some(cached.generated_at);
                state.from_cache = true;
                return Stage::Done;
            }
        }

        debug!("Cache miss for {}", province);
        *state = RunState::default();
        Stage::Fetching
    }

    async fn fetch_weather(&self, province: &str, state: &mut RunState) -> Result<()> {
        let query = format!("สภาพอากาศวันนี้ จังหวัด{province}");
        info!("Fetching weather for {}", province);
        state.raw_weather = self.search.search(&query).await?;
        Ok(())
    }

    async fn build_html(&self, province: &str, state: &mut RunState) -> Result<()> {
        let prompt = format!(
            "ให้สรุปข้อมูลสภาพอากาศรายวันที่ค้นหามา (ภาษาไทย) แล้วจัดรูปแบบเป็น HTML \
             ที่ดูสวยงามและอ่านง่าย โดยควรมีหัวข้อชื่อจังหวัด วันที่ และเนื้อหาสรุปแบบกระชับ \
             ใส่ใน <div> หรือ <section> ให้ return เฉพาะ HTML เท่านั้น ไม่ต้องมีคำอธิบาย\n\
             ข้อมูลที่ได้ (raw): {raw}\n",
            raw = state.raw_weather
        );

        let reply = self.summarizer.complete(&prompt).await?;
        state.html = strip_code_fence(&reply);
        state.generated_at = Some(Utc::now());
        info!("Built report for {} ({} bytes)", province, state.html.len());
        Ok(())
    }
}
