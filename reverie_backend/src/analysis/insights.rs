use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categorized signals drawn from one entry. Every list is independent and
/// defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionInsights {
    pub life_areas: Vec<String>,
    pub goal_alignment: Vec<String>,
    pub emotions: Vec<String>,
    pub wins: Vec<String>,
    pub energizers: Vec<String>,
    pub drainers: Vec<String>,
}

impl ReflectionInsights {
    pub const FIELDS: [&'static str; 6] = [
        "life_areas",
        "goal_alignment",
        "emotions",
        "wins",
        "energizers",
        "drainers",
    ];

    /// Fill a possibly partial record. Missing or non-list fields become empty
    /// lists; list fields pass through as-is.
    pub fn normalize(partial: Option<&Value>) -> Self {
        let field = |name: &str| string_list(partial.and_then(|value| value.get(name)));
        Self {
            life_areas: field("life_areas"),
            goal_alignment: field("goal_alignment"),
            emotions: field("emotions"),
            wins: field("wins"),
            energizers: field("energizers"),
            drainers: field("drainers"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.life_areas.is_empty()
            && self.goal_alignment.is_empty()
            && self.emotions.is_empty()
            && self.wins.is_empty()
            && self.energizers.is_empty()
            && self.drainers.is_empty()
    }
}

/// A list value as strings. Anything that is not a list yields an empty vec;
/// non-string elements keep their place as compact JSON text.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
