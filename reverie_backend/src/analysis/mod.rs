//! Structured signals from finished entries.

pub mod extract;
pub mod insights;
pub mod pipeline;

pub use extract::extract_object;
pub use insights::ReflectionInsights;
pub use pipeline::{parse_analysis, AnalysisPipeline, EntryAnalysis};
