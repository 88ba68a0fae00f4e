use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm_client::SamplingOptions;

pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LEAD_PHRASE_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f64,
    #[serde(default = "default_lead_phrase_tokens")]
    pub lead_phrase_tokens: usize,
}

fn default_jaccard_threshold() -> f64 {
    DEFAULT_JACCARD_THRESHOLD
}

fn default_lead_phrase_tokens() -> usize {
    DEFAULT_LEAD_PHRASE_TOKENS
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: default_jaccard_threshold(),
            lead_phrase_tokens: default_lead_phrase_tokens(),
        }
    }
}

impl SimilarityConfig {
    /// Out-of-range values fall back to the defaults instead of disabling the filter.
    pub fn sanitized(self) -> Self {
        let jaccard_threshold = if self.jaccard_threshold > 0.0 && self.jaccard_threshold <= 1.0
        {
            self.jaccard_threshold
        } else {
            tracing::warn!(
                "Ignoring jaccard_threshold {} (must be in (0, 1])",
                self.jaccard_threshold
            );
            DEFAULT_JACCARD_THRESHOLD
        };
        let lead_phrase_tokens = if self.lead_phrase_tokens == 0 {
            tracing::warn!("Ignoring lead_phrase_tokens 0");
            DEFAULT_LEAD_PHRASE_TOKENS
        } else {
            self.lead_phrase_tokens
        };
        Self {
            jaccard_threshold,
            lead_phrase_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_preset_max_draws")]
    pub preset_max_draws: u32,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_max_draft_chars")]
    pub max_draft_chars: usize,
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,
    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_preset_max_draws() -> u32 {
    5
}

fn default_history_capacity() -> usize {
    7
}

fn default_max_draft_chars() -> usize {
    1200
}

fn default_generation_temperature() -> f32 {
    0.9
}

fn default_top_p() -> f32 {
    0.95
}

fn default_frequency_penalty() -> f32 {
    0.5
}

fn default_presence_penalty() -> f32 {
    0.6
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            preset_max_draws: default_preset_max_draws(),
            history_capacity: default_history_capacity(),
            max_draft_chars: default_max_draft_chars(),
            temperature: default_generation_temperature(),
            top_p: default_top_p(),
            frequency_penalty: default_frequency_penalty(),
            presence_penalty: default_presence_penalty(),
        }
    }
}

impl GenerationConfig {
    pub fn sampling(&self) -> SamplingOptions {
        SamplingOptions {
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            frequency_penalty: Some(self.frequency_penalty),
            presence_penalty: Some(self.presence_penalty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_analysis_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_entry_chars")]
    pub max_entry_chars: usize,
}

fn default_analysis_temperature() -> f32 {
    0.2
}

fn default_max_entry_chars() -> usize {
    8000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temperature: default_analysis_temperature(),
            max_entry_chars: default_max_entry_chars(),
        }
    }
}

impl AnalysisConfig {
    pub fn sampling(&self) -> SamplingOptions {
        SamplingOptions {
            temperature: Some(self.temperature),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // LLM configuration (OpenAI-compatible: Ollama, LM Studio, vLLM, OpenAI, etc.)
    #[serde(default = "default_llm_url")]
    pub llm_api_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_llm_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_api_url: default_llm_url(),
            llm_model: default_llm_model(),
            llm_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            similarity: SimilarityConfig::default(),
            generation: GenerationConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Get the directory containing the executable
    fn get_base_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(exe_path) => exe_path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
            Err(_) => PathBuf::from("."),
        }
    }

    /// Get the path to the config file (relative to executable)
    pub fn config_path() -> PathBuf {
        Self::get_base_dir().join("reverie_config.toml")
    }

    /// Load config from reverie_config.toml (next to executable), falling back to defaults + env vars
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                return config;
            }
            Err(e) if path.exists() => {
                tracing::error!("Failed to load {:?}: {:#}", path, e);
            }
            Err(_) => {}
        }

        tracing::warn!("No usable config file found, using defaults + env vars");
        Self::from_env()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str::<EngineConfig>(&contents)
            .with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Save config to file (next to executable)
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("LLM_API_URL") {
            config.llm_api_url = url;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm_model = model;
        }

        if let Ok(key) = env::var("LLM_API_KEY") {
            if !key.trim().is_empty() {
                config.llm_api_key = Some(key);
            }
        }

        if let Ok(threshold) = env::var("REVERIE_SIMILARITY_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                config.similarity.jaccard_threshold = value;
            }
        }

        if let Ok(tokens) = env::var("REVERIE_LEAD_PHRASE_TOKENS") {
            if let Ok(value) = tokens.parse() {
                config.similarity.lead_phrase_tokens = value;
            }
        }

        if let Ok(attempts) = env::var("REVERIE_MAX_ATTEMPTS") {
            if let Ok(value) = attempts.parse() {
                config.generation.max_attempts = value;
            }
        }

        config
    }
}
