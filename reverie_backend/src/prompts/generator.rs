use std::sync::{Arc, OnceLock};

use rand::Rng;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, GenerationConfig};
use crate::llm_client::{Message, Oracle};
use crate::prompts::history::PromptHistory;
use crate::prompts::presets::pick_preset;
use crate::prompts::sequence::{
    build_slot_context, general_context, ReflectionSignals, SlotKey, ThematicSlot,
};
use crate::prompts::similarity::SimilarityFilter;
use crate::text::{strip_reasoning_tags, truncate_chars};

const STYLE_DIRECTIVE: &str = "You write reflective journaling prompts. \
     Reply with exactly one question, under 25 words, warm, specific and non-judgmental. \
     No preamble, no numbering, no quotation marks, no explanation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Generated,
    Preset,
}

/// A prompt produced for a slot but not yet recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCandidate {
    pub text: String,
    pub provenance: Provenance,
    pub slot: SlotKey,
    /// Oracle calls (generated) or pool draws (preset) it took.
    pub attempts: u32,
}

impl PromptCandidate {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Produces one prompt per call. Side-effect free apart from the oracle call;
/// recording into history and advancing the cursor is the caller's job.
pub struct PromptGenerator {
    oracle: Arc<dyn Oracle>,
    filter: SimilarityFilter,
    config: GenerationConfig,
}

impl PromptGenerator {
    pub fn new(oracle: Arc<dyn Oracle>, config: &EngineConfig) -> Self {
        Self {
            oracle,
            filter: SimilarityFilter::new(config.similarity),
            config: config.generation.clone(),
        }
    }

    /// Up to `max_attempts` oracle calls for a generated slot, returning the
    /// first non-empty candidate that clears the similarity filter. When every
    /// attempt is used up, the last non-empty candidate is returned even if it
    /// is similar to history. It is empty only if no attempt produced text.
    pub async fn generate(
        &self,
        slot: &ThematicSlot,
        signals: &ReflectionSignals,
        history: &PromptHistory,
        draft: &str,
    ) -> PromptCandidate {
        if slot.is_preset {
            return self.preset(slot, history, &mut rand::rng());
        }

        let messages = self.build_messages(slot, signals, history, draft);
        let max_attempts = self.config.max_attempts.max(1);
        let mut candidate = String::new();

        for attempt in 1..=max_attempts {
            let produced = match self
                .oracle
                .generate(messages.clone(), Some(self.config.sampling()))
                .await
            {
                Ok(raw) => clean_candidate(&raw),
                Err(error) => {
                    tracing::warn!(
                        slot = slot.key.as_str(),
                        attempt,
                        "Prompt generation call failed: {:#}",
                        error
                    );
                    String::new()
                }
            };

            // Failed or blank attempts keep the previous candidate.
            if produced.is_empty() {
                tracing::debug!(slot = slot.key.as_str(), attempt, "Empty prompt candidate");
                continue;
            }
            candidate = produced;

            if self.filter.is_too_similar(&candidate, history.iter()) {
                tracing::debug!(
                    slot = slot.key.as_str(),
                    attempt,
                    "Candidate too similar to recent prompts: {}",
                    candidate
                );
                continue;
            }

            return PromptCandidate {
                text: candidate,
                provenance: Provenance::Generated,
                slot: slot.key,
                attempts: attempt,
            };
        }

        tracing::info!(
            slot = slot.key.as_str(),
            "Dedup attempts exhausted, returning last candidate"
        );
        PromptCandidate {
            text: candidate,
            provenance: Provenance::Generated,
            slot: slot.key,
            attempts: max_attempts,
        }
    }

    /// Draw from the preset pool, avoiding verbatim repeats of history.
    pub fn preset<R: Rng + ?Sized>(
        &self,
        slot: &ThematicSlot,
        history: &PromptHistory,
        rng: &mut R,
    ) -> PromptCandidate {
        let pick = pick_preset(history.iter(), self.config.preset_max_draws, rng);
        PromptCandidate {
            text: pick.prompt.to_string(),
            provenance: Provenance::Preset,
            slot: slot.key,
            attempts: pick.draws,
        }
    }

    pub fn build_messages(
        &self,
        slot: &ThematicSlot,
        signals: &ReflectionSignals,
        history: &PromptHistory,
        draft: &str,
    ) -> Vec<Message> {
        let draft = draft.trim();
        let draft = if draft.is_empty() {
            "(nothing written yet)".to_string()
        } else {
            truncate_chars(draft, self.config.max_draft_chars)
        };
        let recent = if history.is_empty() {
            "None".to_string()
        } else {
            history
                .iter()
                .map(|prompt| format!("- {prompt}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let user = format!(
            "## Theme\n{}: {}\n\n\
             ## Theme Context\n{}\n\n\
             ## General Context\n{}\n\n\
             ## What They Have Written So Far\n{}\n\n\
             ## Recent Prompts (do not repeat or paraphrase)\n{}\n\n\
             Write the next prompt.",
            slot.label,
            slot.instruction,
            build_slot_context(slot, signals),
            general_context(signals),
            draft,
            recent,
        );

        vec![Message::system(STYLE_DIRECTIVE), Message::user(user)]
    }
}

fn enumeration_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s*").expect("static pattern compiles")
    })
}

const QUOTES: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// First non-blank line of a completion without surrounding quotes or a
/// leading list marker such as "1. ".
pub fn clean_candidate(raw: &str) -> String {
    let text = strip_reasoning_tags(raw);
    let Some(line) = text.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return String::new();
    };

    let unquoted = line.trim_matches(QUOTES).trim();
    let unmarked = enumeration_marker().replace(unquoted, "");
    unmarked.trim().trim_matches(QUOTES).trim().to_string()
}
