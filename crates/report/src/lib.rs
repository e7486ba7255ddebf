//! Weather report generation: cache, fence stripping, and the
//! check-cache → fetch → build → output pipeline.

pub mod cache;
pub mod fence;
pub mod pipeline;

pub use cache::{new_report_cache, ReportCache};
pub use fence::strip_code_fence;
pub use pipeline::ReportPipeline;
