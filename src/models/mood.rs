use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The closed set of mood labels an entry can carry.
///
/// Declaration order is the canonical category order used by the monthly
/// stacked series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "☀️ Happy", alias = "Happy", alias = "happy")]
    Happy,
    #[serde(rename = "🌧️ Sad", alias = "Sad", alias = "sad")]
    Sad,
    #[serde(rename = "⚡ Angry", alias = "Angry", alias = "angry")]
    Angry,
    #[serde(rename = "🌤️ Calm", alias = "Calm", alias = "calm")]
    Calm,
    #[serde(rename = "🌈 Excited", alias = "Excited", alias = "excited")]
    Excited,
    #[serde(rename = "🌫️ Confused", alias = "Confused", alias = "confused")]
    Confused,
    #[serde(rename = "🌙 Tired", alias = "Tired", alias = "tired")]
    Tired,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Happy,
        Category::Sad,
        Category::Angry,
        Category::Calm,
        Category::Excited,
        Category::Confused,
        Category::Tired,
    ];

    /// Display label, also the persisted representation.
    pub fn label(self) -> &'static str {
        match self {
            Category::Happy => "☀️ Happy",
            Category::Sad => "🌧️ Sad",
            Category::Angry => "⚡ Angry",
            Category::Calm => "🌤️ Calm",
            Category::Excited => "🌈 Excited",
            Category::Confused => "🌫️ Confused",
            Category::Tired => "🌙 Tired",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Happy => "Happy",
            Category::Sad => "Sad",
            Category::Angry => "Angry",
            Category::Calm => "Calm",
            Category::Excited => "Excited",
            Category::Confused => "Confused",
            Category::Tired => "Tired",
        }
    }

    /// Sentiment score on a 1-10 scale, most positive first.
    pub fn score(self) -> u32 {
        match self {
            Category::Happy => 10,
            Category::Excited => 9,
            Category::Calm => 7,
            Category::Confused => 5,
            Category::Tired => 4,
            Category::Sad => 2,
            Category::Angry => 1,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mood category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| {
                c.label() == trimmed || c.name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: Category,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: Option<DateTime<Utc>>,
}

/// A validated entry ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewMood {
    pub owner_id: Uuid,
    pub category: Category,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Fields an edit may replace. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct MoodPatch {
    pub category: Option<Category>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[serde(alias = "mood")]
    pub category: Category,
    #[validate(length(min = 1, max = 5000, message = "Note must be 1-5000 characters"))]
    pub note: String,
    #[serde(default, alias = "date")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMoodRequest {
    #[serde(default, alias = "mood")]
    pub category: Option<Category>,
    #[validate(length(min = 1, max = 5000, message = "Note must be 1-5000 characters"))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Calm).unwrap();
        assert_eq!(json, "\"🌤️ Calm\"");
    }

    #[test]
    fn test_category_accepts_label_and_name() {
        let a: Category = serde_json::from_str("\"🌙 Tired\"").unwrap();
        let b: Category = serde_json::from_str("\"Tired\"").unwrap();
        let c: Category = serde_json::from_str("\"tired\"").unwrap();
        assert_eq!(a, Category::Tired);
        assert_eq!(b, Category::Tired);
        assert_eq!(c, Category::Tired);
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(serde_json::from_str::<Category>("\"Bored\"").is_err());
        assert!("Bored".parse::<Category>().is_err());
    }

    #[test]
    fn test_from_str_matches_label() {
        for c in Category::ALL {
            assert_eq!(c.label().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_scores_are_within_range_and_ordered_by_valence() {
        for c in Category::ALL {
            assert!((1..=10).contains(&c.score()));
        }
        assert_eq!(Category::Happy.score(), 10);
        assert_eq!(Category::Angry.score(), 1);
        assert!(Category::Excited.score() > Category::Calm.score());
        assert!(Category::Tired.score() > Category::Sad.score());
    }

    #[test]
    fn test_create_request_accepts_legacy_field_names() {
        let json = r#"{"mood":"☀️ Happy","note":"sunny walk","date":"2025-10-05T09:00:00Z"}"#;
        let req: CreateMoodRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.category, Category::Happy);
        assert_eq!(req.note, "sunny walk");
        assert!(req.created_at.is_some());
    }

    #[test]
    fn test_create_request_rejects_empty_note() {
        let req = CreateMoodRequest {
            category: Category::Sad,
            note: String::new(),
            created_at: None,
        };
        assert!(req.validate().is_err());
    }
}
