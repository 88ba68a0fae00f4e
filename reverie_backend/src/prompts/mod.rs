//! Rotating reflective prompts.
//!
//! A fixed seven-slot rotation decides the theme of each prompt. Six slots are
//! written by the oracle and gated by a similarity check against recent
//! history; the seventh draws a classic prompt from a fixed pool.

pub mod generator;
pub mod history;
pub mod presets;
pub mod sequence;
pub mod similarity;

pub use generator::{clean_candidate, PromptCandidate, PromptGenerator, Provenance};
pub use history::PromptHistory;
pub use presets::{pick_preset, PresetPick, PRESET_POOL};
pub use sequence::{
    build_slot_context, next_slot, ReflectionSignals, SequenceCursor, SlotKey, ThematicSlot,
    SEQUENCE,
};
pub use similarity::SimilarityFilter;
