//! Prompt rotation and insight extraction for reflective journaling.

pub mod analysis;
pub mod config;
pub mod llm_client;
pub mod prompts;
pub mod session;
pub mod text;

pub use analysis::{AnalysisPipeline, EntryAnalysis, ReflectionInsights};
pub use config::EngineConfig;
pub use llm_client::{LlmClient, Message, Oracle, SamplingOptions};
pub use prompts::{PromptCandidate, PromptGenerator, PromptHistory, ReflectionSignals};
pub use session::ComposeSession;
