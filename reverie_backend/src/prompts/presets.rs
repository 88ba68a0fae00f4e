use rand::seq::IndexedRandom;
use rand::Rng;

/// Classic prompts used verbatim by the preset slot.
pub static PRESET_POOL: [&str; 36] = [
    "What brought you joy today?",
    "What are you grateful for right now?",
    "What is something you learned recently?",
    "Describe a moment today when you felt at peace.",
    "What challenged you this week, and how did you respond?",
    "Who made a difference in your day?",
    "What would make tomorrow a good day?",
    "What is weighing on your mind?",
    "What are you proud of lately?",
    "Describe a small win you had today.",
    "What drained your energy today?",
    "What gave you energy today?",
    "What are you looking forward to?",
    "What would you tell your younger self today?",
    "Where did you notice beauty today?",
    "What is one thing you want to let go of?",
    "How did you take care of yourself today?",
    "What surprised you recently?",
    "What conversation has stayed with you?",
    "What does a perfect ordinary day look like for you?",
    "What are you avoiding, and why?",
    "When did you feel most like yourself this week?",
    "What is a boundary you want to keep?",
    "What made you laugh recently?",
    "What decision are you sitting with right now?",
    "Describe how your body feels at this moment.",
    "What would you do if you weren't afraid?",
    "Which of your values showed up in your actions today?",
    "What is something you keep putting off?",
    "What did you notice about your mood today?",
    "Who would you like to reconnect with?",
    "What is a lesson this season of life is teaching you?",
    "What felt easier than you expected?",
    "What is one kind thing you can do for yourself tomorrow?",
    "Write about a place where you feel completely safe.",
    "What story are you telling yourself that might not be true?",
];

/// Result of a preset draw, with how many draws it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetPick {
    pub prompt: &'static str,
    pub draws: u32,
}

/// Draw uniformly from the pool, redrawing while the pick appears verbatim in
/// `history`. Stops after `max_draws` total draws and keeps the last pick even
/// if it is still a repeat.
pub fn pick_preset<I, S, R>(history: I, max_draws: u32, rng: &mut R) -> PresetPick
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let recent = history
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>();
    let max_draws = max_draws.max(1);

    let mut draws = 0;
    loop {
        let prompt = PRESET_POOL.choose(rng).copied().unwrap_or(PRESET_POOL[0]);
        draws += 1;

        let repeated = recent.iter().any(|previous| previous == prompt);
        if !repeated || draws >= max_draws {
            if repeated {
                tracing::debug!(draws, "Preset pool redraws exhausted, keeping repeat");
            }
            return PresetPick { prompt, draws };
        }
    }
}
