use serde::{Deserialize, Serialize};

use crate::prompts::generator::{PromptCandidate, PromptGenerator};
use crate::prompts::history::PromptHistory;
use crate::prompts::sequence::{ReflectionSignals, SequenceCursor, SlotKey};

/// Rotation state for one compose session, threaded through the generator.
///
/// `next_prompt` records the prompt and advances the cursor by one slot.
/// `regenerate` re-issues the slot of the last prompt and leaves the cursor
/// where it is. Both take `&mut self`, so a session can only have one request
/// outstanding at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeSession {
    cursor: SequenceCursor,
    history: PromptHistory,
    last_slot: Option<SlotKey>,
}

impl ComposeSession {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            cursor: SequenceCursor::default(),
            history: PromptHistory::with_capacity(history_capacity),
            last_slot: None,
        }
    }

    pub fn cursor(&self) -> SequenceCursor {
        self.cursor
    }

    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    pub fn last_slot(&self) -> Option<SlotKey> {
        self.last_slot
    }

    pub async fn next_prompt(
        &mut self,
        generator: &PromptGenerator,
        signals: &ReflectionSignals,
        draft: &str,
    ) -> PromptCandidate {
        let slot = self.cursor.slot().key;
        let candidate = self.emit(generator, slot, signals, draft).await;
        self.cursor.advance();
        candidate
    }

    pub async fn regenerate(
        &mut self,
        generator: &PromptGenerator,
        signals: &ReflectionSignals,
        draft: &str,
    ) -> PromptCandidate {
        let slot = self.last_slot.unwrap_or_else(|| self.cursor.slot().key);
        self.emit(generator, slot, signals, draft).await
    }

    async fn emit(
        &mut self,
        generator: &PromptGenerator,
        slot: SlotKey,
        signals: &ReflectionSignals,
        draft: &str,
    ) -> PromptCandidate {
        let thematic = slot.slot();
        let mut candidate = generator
            .generate(thematic, signals, &self.history, draft)
            .await;

        if candidate.is_empty() {
            tracing::warn!(
                slot = slot.as_str(),
                "No usable generated prompt, falling back to the preset pool"
            );
            candidate = generator.preset(thematic, &self.history, &mut rand::rng());
        }

        self.history.push(candidate.text.clone());
        self.last_slot = Some(slot);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::llm_client::{Message, Oracle, SamplingOptions};
    use crate::prompts::generator::Provenance;
    use crate::prompts::presets::PRESET_POOL;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fresh numbered question on every call.
    struct CountingOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Oracle for CountingOracle {
        async fn generate(
            &self,
            _messages: Vec<Message>,
            _options: Option<SamplingOptions>,
        ) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel"];
            Ok(format!(
                "{} {} {} question?",
                words[n % words.len()],
                words[(n + 3) % words.len()],
                n
            ))
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl Oracle for FailingOracle {
        async fn generate(
            &self,
            _messages: Vec<Message>,
            _options: Option<SamplingOptions>,
        ) -> Result<String> {
            anyhow::bail!("provider unavailable")
        }
    }

    fn counting_generator() -> PromptGenerator {
        PromptGenerator::new(
            Arc::new(CountingOracle {
                calls: AtomicUsize::new(0),
            }),
            &EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn next_prompt_walks_the_rotation() {
        let generator = counting_generator();
        let signals = ReflectionSignals::default();
        let mut session = ComposeSession::default();

        let mut slots = Vec::new();
        for _ in 0..8 {
            slots.push(session.next_prompt(&generator, &signals, "").await.slot);
        }

        assert_eq!(slots[0], SlotKey::ActiveGoals);
        assert_eq!(slots[6], SlotKey::Preset);
        assert_eq!(slots[7], SlotKey::ActiveGoals);
        assert_eq!(session.cursor().step(), 1);
        assert_eq!(session.history().len(), 7);
    }

    #[tokio::test]
    async fn regenerate_reissues_same_slot_without_advancing() {
        let generator = counting_generator();
        let signals = ReflectionSignals::default();
        let mut session = ComposeSession::default();

        let first = session.next_prompt(&generator, &signals, "").await;
        let step_after_first = session.cursor().step();
        let again = session.regenerate(&generator, &signals, "").await;

        assert_eq!(again.slot, first.slot);
        assert_ne!(again.text, first.text);
        assert_eq!(session.cursor().step(), step_after_first);
        assert_eq!(session.history().len(), 2);

        let next = session.next_prompt(&generator, &signals, "").await;
        assert_eq!(next.slot, SlotKey::Interests);
    }

    #[tokio::test]
    async fn regenerate_before_any_prompt_uses_current_slot() {
        let generator = counting_generator();
        let mut session = ComposeSession::default();

        let candidate = session
            .regenerate(&generator, &ReflectionSignals::default(), "")
            .await;

        assert_eq!(candidate.slot, SlotKey::ActiveGoals);
        assert_eq!(session.cursor().step(), 0);
    }

    #[tokio::test]
    async fn failed_generation_falls_back_to_preset_text() {
        let generator = PromptGenerator::new(Arc::new(FailingOracle), &EngineConfig::default());
        let mut session = ComposeSession::default();

        let candidate = session
            .next_prompt(&generator, &ReflectionSignals::default(), "")
            .await;

        assert_eq!(candidate.provenance, Provenance::Preset);
        assert_eq!(candidate.slot, SlotKey::ActiveGoals);
        assert!(PRESET_POOL.contains(&candidate.text.as_str()));
        assert_eq!(session.history().latest(), Some(candidate.text.as_str()));
        assert_eq!(session.cursor().step(), 1);
    }

    #[test]
    fn session_state_serializes() {
        let mut session = ComposeSession::new(3);
        session.history.push("What brought you joy today?");
        session.cursor.advance();

        let json = serde_json::to_string(&session).unwrap();
        let restored: ComposeSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
