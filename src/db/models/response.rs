use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Audience segment selecting which question set a respondent sees.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::Beginner, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "advanced" => Ok(Level::Advanced),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}

/// Topic answers have posted in two historical shapes: a multi-select list or
/// a single comma-separated string. Both decode and both split the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicList {
    List(Vec<String>),
    Csv(String),
}

impl TopicList {
    pub fn values(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TopicList::List(items) => items.iter().map(String::as_str).collect(),
            TopicList::Csv(csv) => csv.split(',').collect(),
        };
        raw.iter()
            .flat_map(|item| item.split(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Typed record for one submitted form. Unknown keys from older or newer form
/// revisions land in `extra` instead of being dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectations: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SurveyPayload {
    /// Distinct topic values, from the dedicated field or a legacy
    /// `interests` key in the extra bag.
    pub fn topic_values(&self) -> Vec<String> {
        if let Some(topics) = &self.topics {
            return topics.values();
        }
        if let Some(value) = self.extra.get("interests") {
            if let Ok(topics) = serde_json::from_value::<TopicList>(value.clone()) {
                return topics.values();
            }
        }
        Vec::new()
    }

    /// All free-text-bearing fields concatenated for categorization.
    pub fn free_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(text) = &self.experience {
            parts.push(text);
        }
        if let Some(text) = &self.goals {
            parts.push(text);
        }
        if let Some(text) = &self.expectations {
            parts.push(text);
        }
        for value in self.extra.values() {
            if let Value::String(text) = value {
                parts.push(text);
            }
        }
        parts.join(" ")
    }
}

/// One persisted survey submission. Rows are insert-only: nothing in this
/// system updates or deletes them.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub level: Level,
    pub data: Json<SurveyPayload>,
    pub voice_question: Option<String>,
    pub clarified_question: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResponse {
    pub level: Level,
    pub payload: SurveyPayload,
    pub voice_question: Option<String>,
    pub clarified_question: Option<String>,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_list_decodes_both_shapes() {
        let list: TopicList = serde_json::from_value(serde_json::json!(["ml", "nlp"])).unwrap();
        assert_eq!(list.values(), vec!["ml", "nlp"]);

        let csv: TopicList = serde_json::from_value(serde_json::json!("ml, nlp")).unwrap();
        assert_eq!(csv.values(), vec!["ml", "nlp"]);
    }

    #[test]
    fn topic_values_skip_blank_entries() {
        let csv = TopicList::Csv("ml,, , cv".to_string());
        assert_eq!(csv.values(), vec!["ml", "cv"]);
    }

    #[test]
    fn unknown_form_keys_land_in_extra() {
        let payload: SurveyPayload = serde_json::from_value(serde_json::json!({
            "experience": "two years of python",
            "favourite_editor": "vim",
        }))
        .unwrap();

        assert_eq!(payload.experience.as_deref(), Some("two years of python"));
        assert_eq!(
            payload.extra.get("favourite_editor"),
            Some(&Value::String("vim".to_string()))
        );
    }

    #[test]
    fn free_text_includes_extra_string_fields() {
        let payload: SurveyPayload = serde_json::from_value(serde_json::json!({
            "goals": "learn rust",
            "challenges": "deploying models",
        }))
        .unwrap();

        let text = payload.free_text();
        assert!(text.contains("learn rust"));
        assert!(text.contains("deploying models"));
    }
}
