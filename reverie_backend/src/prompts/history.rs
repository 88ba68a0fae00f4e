use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 7;

/// Most recently emitted prompts, oldest first. Pushing past capacity evicts
/// the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

/// Saved state goes through the same clamp as `with_capacity`, and anything
/// beyond capacity is trimmed from the front.
impl<'de> Deserialize<'de> for PromptHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Saved {
            entries: VecDeque<String>,
            capacity: usize,
        }

        let saved = Saved::deserialize(deserializer)?;
        let mut history = Self::with_capacity(saved.capacity);
        for entry in saved.entries {
            history.push(entry);
        }
        Ok(history)
    }
}

impl Default for PromptHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl PromptHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return;
        }
        while self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(prompt);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.iter().any(|entry| entry == prompt)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
