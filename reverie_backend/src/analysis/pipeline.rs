use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::extract::extract_object;
use crate::analysis::insights::{string_list, ReflectionInsights};
use crate::config::{AnalysisConfig, EngineConfig};
use crate::llm_client::{Message, Oracle};
use crate::text::{strip_reasoning_tags, truncate_chars};

pub const LIFE_AREAS: [&str; 5] = [
    "Health & Body",
    "Relationships",
    "Work & Career",
    "Personal Growth",
    "Rest & Recreation",
];

pub const EMOTION_VOCABULARY: [&str; 12] = [
    "joy",
    "gratitude",
    "calm",
    "hope",
    "pride",
    "love",
    "anxiety",
    "stress",
    "frustration",
    "sadness",
    "loneliness",
    "overwhelm",
];

const SYSTEM_PROMPT: &str = "You analyze private journal entries into structured signals. \
     Return strict JSON only, with no commentary.";

/// Everything extracted from one finished entry. Always fully populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAnalysis {
    pub tasks: Vec<String>,
    pub habits: Vec<String>,
    pub goals: Vec<String>,
    pub insights: ReflectionInsights,
}

impl EntryAnalysis {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.habits.is_empty()
            && self.goals.is_empty()
            && self.insights.is_empty()
    }
}

pub struct AnalysisPipeline {
    oracle: Arc<dyn Oracle>,
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(oracle: Arc<dyn Oracle>, config: &EngineConfig) -> Self {
        Self {
            oracle,
            config: config.analysis.clone(),
        }
    }

    /// One oracle call, then extraction and normalization. Any failure along
    /// the way degrades to the all-empty analysis.
    pub async fn analyze(&self, entry_text: &str, goal_alignment: &str) -> EntryAnalysis {
        if entry_text.trim().is_empty() {
            tracing::debug!("Skipping analysis of blank entry");
            return EntryAnalysis::default();
        }

        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(self.build_analysis_prompt(entry_text, goal_alignment)),
        ];

        match self
            .oracle
            .generate(messages, Some(self.config.sampling()))
            .await
        {
            Ok(raw) => parse_analysis(&raw),
            Err(error) => {
                tracing::warn!("Entry analysis call failed, returning empty result: {:#}", error);
                EntryAnalysis::default()
            }
        }
    }

    pub fn build_analysis_prompt(&self, entry_text: &str, goal_alignment: &str) -> String {
        let goal_alignment = goal_alignment.trim();
        let goal_alignment = if goal_alignment.is_empty() {
            "No goals shared. Leave goal_alignment empty."
        } else {
            goal_alignment
        };

        format!(
            "Read the journal entry below and pull out what the writer intends to do \
             and how they are doing.\n\n\
             ## Classification Rules\n\
             - goal: a meaningful outcome pursued over weeks or months \
             (\"run a marathon\", \"switch careers\").\n\
             - task: a single concrete action that can be finished in one sitting \
             (\"email Sam\", \"book the dentist\").\n\
             - habit: a behavior to repeat on a schedule \
             (\"meditate every morning\", \"walk after dinner\").\n\
             - Only include items the writer expresses intent about. Use short titles. \
             Never put the same item in two lists.\n\n\
             ## Life Areas (use only these)\n{}\n\n\
             ## Emotional Themes (prefer these words)\n{}\n\n\
             ## Goal Alignment\n{}\n\n\
             ## Entry\n{}\n\n\
             Respond with JSON:\n\
             {{\n\
               \"tasks\": [\"...\"],\n\
               \"habits\": [\"...\"],\n\
               \"goals\": [\"...\"],\n\
               \"insights\": {{\n\
                 \"life_areas\": [\"...\"],\n\
                 \"goal_alignment\": [\"how the entry relates to a goal\"],\n\
                 \"emotions\": [\"...\"],\n\
                 \"wins\": [\"...\"],\n\
                 \"energizers\": [\"...\"],\n\
                 \"drainers\": [\"...\"]\n\
               }}\n\
             }}\n\
             Use empty lists when nothing applies.",
            LIFE_AREAS.join(", "),
            EMOTION_VOCABULARY.join(", "),
            goal_alignment,
            truncate_chars(entry_text.trim(), self.config.max_entry_chars),
        )
    }
}

/// Turn a raw completion into an analysis, degrading to empty on anything
/// that does not parse.
pub fn parse_analysis(raw: &str) -> EntryAnalysis {
    let text = strip_reasoning_tags(raw);
    let Some(object) = extract_object(&text) else {
        tracing::warn!("No JSON object in analysis response");
        return EntryAnalysis::default();
    };

    let parsed = match serde_json::from_str::<Value>(object) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!("Analysis JSON did not parse: {}", error);
            return EntryAnalysis::default();
        }
    };

    EntryAnalysis {
        tasks: string_list(parsed.get("tasks")),
        habits: string_list(parsed.get("habits")),
        goals: string_list(parsed.get("goals")),
        insights: ReflectionInsights::normalize(parsed.get("insights")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::SamplingOptions;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedOracle {
        reply: Option<String>,
        seen: Mutex<Vec<Message>>,
    }

    impl CannedOracle {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Oracle for CannedOracle {
        async fn generate(
            &self,
            messages: Vec<Message>,
            _options: Option<SamplingOptions>,
        ) -> Result<String> {
            self.seen.lock().unwrap().extend(messages);
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => anyhow::bail!("network down"),
            }
        }
    }

    fn pipeline(oracle: Arc<CannedOracle>) -> AnalysisPipeline {
        AnalysisPipeline::new(oracle, &EngineConfig::default())
    }

    #[tokio::test]
    async fn prose_without_object_yields_empty_result() {
        let oracle = CannedOracle::replying("It sounds like you had a thoughtful day.");
        let analysis = pipeline(oracle).analyze("I walked by the river.", "").await;

        assert_eq!(analysis, EntryAnalysis::default());
        assert!(analysis.insights.is_empty());
    }

    #[tokio::test]
    async fn oracle_failure_yields_empty_result() {
        let analysis = pipeline(CannedOracle::failing())
            .analyze("Need to call the bank tomorrow.", "")
            .await;
        assert!(analysis.is_empty());
    }

    #[tokio::test]
    async fn blank_entry_skips_oracle() {
        let oracle = CannedOracle::replying("{}");
        let analysis = pipeline(oracle.clone()).analyze("   \n", "").await;
        assert!(analysis.is_empty());
        assert!(oracle.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn extracts_lists_from_noisy_response() {
        let raw = r#"Sure! Here's the breakdown:
```json
{
  "tasks": ["Email Sam about {the} offsite"],
  "habits": ["Walk after dinner"],
  "goals": ["Run a half marathon"],
  "insights": {
    "life_areas": ["Health & Body"],
    "emotions": ["hope", "stress"],
    "wins": ["Kept the streak"],
    "drainers": "meetings"
  }
}
```
Let me know if you need more."#;
        let oracle = CannedOracle::replying(raw);
        let analysis = pipeline(oracle.clone())
            .analyze("Long day. Walked after dinner again.", "Goals: Run a half marathon")
            .await;

        assert_eq!(analysis.tasks, vec!["Email Sam about {the} offsite"]);
        assert_eq!(analysis.habits, vec!["Walk after dinner"]);
        assert_eq!(analysis.goals, vec!["Run a half marathon"]);
        assert_eq!(analysis.insights.emotions, vec!["hope", "stress"]);
        assert_eq!(analysis.insights.wins, vec!["Kept the streak"]);
        assert!(analysis.insights.drainers.is_empty());
        assert!(analysis.insights.goal_alignment.is_empty());

        let seen = oracle.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].content.contains("Walked after dinner again."));
        assert!(seen[1].content.contains("Goals: Run a half marathon"));
    }

    #[test]
    fn non_list_action_fields_default_to_empty() {
        let analysis = parse_analysis(r#"{"tasks": "call mom", "habits": null, "goals": ["Learn piano"]}"#);
        assert!(analysis.tasks.is_empty());
        assert!(analysis.habits.is_empty());
        assert_eq!(analysis.goals, vec!["Learn piano"]);
        assert!(analysis.insights.is_empty());
    }

    #[test]
    fn balanced_but_invalid_json_degrades() {
        let analysis = parse_analysis(r#"{tasks: [call mom], }"#);
        assert!(analysis.is_empty());
    }

    #[test]
    fn reasoning_block_is_ignored() {
        let raw = r#"<think>maybe {"tasks": ["wrong"]}</think>{"tasks": ["right"]}"#;
        assert_eq!(parse_analysis(raw).tasks, vec!["right"]);
    }

    #[test]
    fn prompt_carries_rules_vocabulary_and_fallback_alignment() {
        let pipeline = pipeline(CannedOracle::failing());
        let prompt = pipeline.build_analysis_prompt("Slept badly.", "");
        assert!(prompt.contains("## Classification Rules"));
        assert!(prompt.contains("Personal Growth"));
        assert!(prompt.contains("overwhelm"));
        assert!(prompt.contains("No goals shared"));
        assert!(prompt.contains("Slept badly."));
        assert!(prompt.contains("\"energizers\""));
    }

    #[test]
    fn analysis_serializes_every_field() {
        let json = serde_json::to_value(EntryAnalysis::default()).unwrap();
        assert_eq!(json["tasks"], serde_json::json!([]));
        assert_eq!(json["insights"]["energizers"], serde_json::json!([]));
    }
}
