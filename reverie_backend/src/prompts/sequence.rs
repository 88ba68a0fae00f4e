use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    ActiveGoals,
    Interests,
    OpenReflection,
    CurrentHabits,
    RecentActions,
    Vision,
    Preset,
}

impl SlotKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotKey::ActiveGoals => "active_goals",
            SlotKey::Interests => "interests",
            SlotKey::OpenReflection => "open_reflection",
            SlotKey::CurrentHabits => "current_habits",
            SlotKey::RecentActions => "recent_actions",
            SlotKey::Vision => "vision",
            SlotKey::Preset => "preset",
        }
    }

    pub fn slot(self) -> &'static ThematicSlot {
        SEQUENCE
            .iter()
            .find(|slot| slot.key == self)
            .unwrap_or(&SEQUENCE[0])
    }
}

/// One theme in the prompt rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThematicSlot {
    pub key: SlotKey,
    pub label: &'static str,
    pub instruction: &'static str,
    pub is_preset: bool,
}

pub const SEQUENCE_LEN: usize = 7;

pub const SEQUENCE: [ThematicSlot; SEQUENCE_LEN] = [
    ThematicSlot {
        key: SlotKey::ActiveGoals,
        label: "Active goals",
        instruction: "Ask one question that helps the writer reflect on progress, \
                      obstacles, or feelings about one of their active goals.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::Interests,
        label: "Interests & hobbies",
        instruction: "Ask one question that invites the writer to explore something \
                      they enjoy doing or are curious about.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::OpenReflection,
        label: "Open reflection",
        instruction: "Ask one open, gentle question about how the writer is doing \
                      right now, drawing on what is going on in their life.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::CurrentHabits,
        label: "Current habits",
        instruction: "Ask one question about how a current habit is going, what \
                      supports it, or what gets in its way.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::RecentActions,
        label: "Recent actions",
        instruction: "Ask one question that invites the writer to look back on \
                      something they recently did and what it meant to them.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::Vision,
        label: "Vision & future self",
        instruction: "Ask one question that connects today to the person the writer \
                      wants to become or the life they are building toward.",
        is_preset: false,
    },
    ThematicSlot {
        key: SlotKey::Preset,
        label: "Classic prompt",
        instruction: "Use one classic journaling prompt verbatim.",
        is_preset: true,
    },
];

/// Slot for a given step. Pure: `SEQUENCE[step mod 7]`.
pub fn next_slot(step: usize) -> &'static ThematicSlot {
    &SEQUENCE[step % SEQUENCE_LEN]
}

/// Position in the rotation, owned by the caller for the length of a compose session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SequenceCursor {
    step: usize,
}

impl<'de> Deserialize<'de> for SequenceCursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Saved {
            step: usize,
        }

        Saved::deserialize(deserializer).map(|saved| Self::new(saved.step))
    }
}

impl SequenceCursor {
    pub fn new(step: usize) -> Self {
        Self {
            step: step % SEQUENCE_LEN,
        }
    }

    pub fn step(self) -> usize {
        self.step
    }

    pub fn slot(self) -> &'static ThematicSlot {
        next_slot(self.step)
    }

    pub fn advance(&mut self) {
        self.step = (self.step + 1) % SEQUENCE_LEN;
    }
}

/// Caller-supplied signals the slot contexts are built from. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionSignals {
    pub goals: Vec<String>,
    pub habits: Vec<String>,
    pub interests: Vec<String>,
    pub recent_actions: String,
    pub vision: String,
    pub general: String,
    /// Directive passed to entry analysis describing how to judge goal alignment.
    pub goal_alignment: String,
}

const GOALS_FALLBACK: &str =
    "No active goals shared yet. Gently invite them to name something they'd like to move toward.";
const INTERESTS_FALLBACK: &str =
    "No interests shared yet. Invite them to notice what sparks their curiosity lately.";
const GENERAL_FALLBACK: &str =
    "Not much context yet. Keep it open and welcoming, about their day or state of mind.";
const HABITS_FALLBACK: &str =
    "No habits tracked yet. Invite them to think about a small routine they'd like to build.";
const RECENT_ACTIONS_FALLBACK: &str =
    "No recent actions recorded. Invite them to recall one small thing they did recently.";
const VISION_FALLBACK: &str =
    "No vision written yet. Invite them to imagine a day in the life they hope to have.";
const OPEN_REFLECTION_CONTEXT: &str =
    "No specific theme. Let the general context below guide a broad, open question.";
const PRESET_CONTEXT: &str = "A classic prompt is drawn from the preset pool.";

/// Build the slot-specific context. Empty signals yield an invitational
/// fallback so the instruction never carries a blank section.
pub fn build_slot_context(slot: &ThematicSlot, signals: &ReflectionSignals) -> String {
    match slot.key {
        SlotKey::ActiveGoals => list_or(&signals.goals, "Active goals", GOALS_FALLBACK),
        SlotKey::Interests => list_or(&signals.interests, "Interests", INTERESTS_FALLBACK),
        SlotKey::OpenReflection => OPEN_REFLECTION_CONTEXT.to_string(),
        SlotKey::CurrentHabits => list_or(&signals.habits, "Current habits", HABITS_FALLBACK),
        SlotKey::RecentActions => text_or(
            &signals.recent_actions,
            "Recent actions",
            RECENT_ACTIONS_FALLBACK,
        ),
        SlotKey::Vision => text_or(&signals.vision, "Vision", VISION_FALLBACK),
        SlotKey::Preset => PRESET_CONTEXT.to_string(),
    }
}

/// General digest, or its fallback.
pub fn general_context(signals: &ReflectionSignals) -> String {
    text_or(&signals.general, "General context", GENERAL_FALLBACK)
}

fn list_or(items: &[String], heading: &str, fallback: &str) -> String {
    let items = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>();
    if items.is_empty() {
        return fallback.to_string();
    }
    format!("{heading}: {}", items.join(", "))
}

fn text_or(text: &str, heading: &str, fallback: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return fallback.to_string();
    }
    format!("{heading}: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_periodic() {
        for step in 0..50 {
            assert_eq!(next_slot(step), next_slot(step + SEQUENCE_LEN));
        }
    }

    #[test]
    fn exactly_one_preset_slot_at_fixed_position() {
        let presets = SEQUENCE.iter().filter(|slot| slot.is_preset).count();
        assert_eq!(presets, 1);

        for cycle in 0..4 {
            let base = cycle * SEQUENCE_LEN;
            let preset_positions = (0..SEQUENCE_LEN)
                .filter(|offset| next_slot(base + offset).is_preset)
                .collect::<Vec<_>>();
            assert_eq!(preset_positions, vec![6]);
        }
    }

    #[test]
    fn sequence_order_is_fixed() {
        let keys = SEQUENCE.iter().map(|slot| slot.key).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                SlotKey::ActiveGoals,
                SlotKey::Interests,
                SlotKey::OpenReflection,
                SlotKey::CurrentHabits,
                SlotKey::RecentActions,
                SlotKey::Vision,
                SlotKey::Preset,
            ]
        );
    }

    #[test]
    fn cursor_wraps_after_full_cycle() {
        let mut cursor = SequenceCursor::default();
        for _ in 0..SEQUENCE_LEN {
            cursor.advance();
        }
        assert_eq!(cursor.step(), 0);
        assert_eq!(cursor.slot().key, SlotKey::ActiveGoals);

        assert_eq!(SequenceCursor::new(9).slot().key, SlotKey::OpenReflection);
    }

    #[test]
    fn empty_signals_get_fallback_context() {
        let signals = ReflectionSignals::default();
        for slot in SEQUENCE.iter() {
            let context = build_slot_context(slot, &signals);
            assert!(!context.trim().is_empty(), "{} had empty context", slot.label);
        }
        assert_eq!(
            build_slot_context(SlotKey::ActiveGoals.slot(), &signals),
            GOALS_FALLBACK
        );
        assert_eq!(general_context(&signals), GENERAL_FALLBACK);
    }

    #[test]
    fn whitespace_only_signals_count_as_empty() {
        let signals = ReflectionSignals {
            habits: vec!["  ".to_string()],
            vision: "\n".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_slot_context(SlotKey::CurrentHabits.slot(), &signals),
            HABITS_FALLBACK
        );
        assert_eq!(build_slot_context(SlotKey::Vision.slot(), &signals), VISION_FALLBACK);
    }

    #[test]
    fn populated_signals_feed_their_slot() {
        let signals = ReflectionSignals {
            goals: vec!["Run a half marathon".to_string(), "Learn Spanish".to_string()],
            recent_actions: "Called mom, finished the report".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_slot_context(SlotKey::ActiveGoals.slot(), &signals),
            "Active goals: Run a half marathon, Learn Spanish"
        );
        assert!(build_slot_context(SlotKey::RecentActions.slot(), &signals)
            .contains("Called mom"));
    }

    #[test]
    fn open_reflection_leaves_digest_to_general_context() {
        let signals = ReflectionSignals {
            general: "Moving apartments this month".to_string(),
            ..Default::default()
        };
        let context = build_slot_context(SlotKey::OpenReflection.slot(), &signals);
        assert!(!context.contains("Moving apartments"));
        assert!(general_context(&signals).contains("Moving apartments"));
    }

    #[test]
    fn saved_cursor_step_is_reduced_on_load() {
        let cursor: SequenceCursor = serde_json::from_str(r#"{"step":9}"#).unwrap();
        assert_eq!(cursor.step(), 2);
        assert_eq!(cursor.slot().key, SlotKey::OpenReflection);
    }
}
