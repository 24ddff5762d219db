use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::MoodScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Tamil,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Tamil];

    /// Unknown or missing values resolve to English.
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "ta" || v == "ta-in" || v == "tamil" || v == "தமிழ்" => Self::Tamil,
            _ => Self::English,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Tamil => "ta",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Tamil => "Tamil",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::English => Self::Tamil,
            Self::Tamil => Self::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Anxiety,
    Stress,
    Sleep,
    LowMood,
    Coping,
    MoodTracking,
    Gratitude,
    Meta,
    Crisis,
    General,
}

impl Intent {
    pub const ALL: [Intent; 11] = [
        Intent::Greeting,
        Intent::Anxiety,
        Intent::Stress,
        Intent::Sleep,
        Intent::LowMood,
        Intent::Coping,
        Intent::MoodTracking,
        Intent::Gratitude,
        Intent::Meta,
        Intent::Crisis,
        Intent::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Anxiety => "anxiety",
            Self::Stress => "stress",
            Self::Sleep => "sleep",
            Self::LowMood => "low_mood",
            Self::Coping => "coping",
            Self::MoodTracking => "mood_tracking",
            Self::Gratitude => "gratitude",
            Self::Meta => "meta",
            Self::Crisis => "crisis",
            Self::General => "general",
        }
    }

    /// Whether the caller should surface the mood-entry form alongside the reply.
    pub fn opens_mood_tracker(self) -> bool {
        self == Self::MoodTracking
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Intent,
    pub is_emergency: bool,
}

impl ClassificationResult {
    pub fn new(category: Intent) -> Self {
        Self {
            category,
            is_emergency: category == Intent::Crisis,
        }
    }

    pub fn crisis() -> Self {
        Self::new(Intent::Crisis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub message: String,
    pub intent: Intent,
    pub is_emergency: bool,
}

impl EngineResponse {
    /// The emergency flag is derived from the intent so the two can never disagree.
    pub fn new(intent: Intent, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            intent,
            is_emergency: intent == Intent::Crisis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub user_id: String,
    pub score: MoodScore,
    pub note: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Helpline {
    pub label: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyNotice {
    pub title: String,
    pub description: String,
    pub helplines: Vec<Helpline>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_codes() {
        assert_eq!(Language::from_optional_str(Some(" Tamil ")), Language::Tamil);
        assert_eq!(Language::from_optional_str(Some("ta")), Language::Tamil);
        assert_eq!(Language::from_optional_str(Some("en-US")), Language::English);
        assert_eq!(Language::from_optional_str(Some("klingon")), Language::English);
        assert_eq!(Language::from_optional_str(None), Language::English);
    }

    #[test]
    fn toggle_flips_between_languages() {
        assert_eq!(Language::English.toggle(), Language::Tamil);
        assert_eq!(Language::Tamil.toggle(), Language::English);
    }

    #[test]
    fn emergency_flag_tracks_crisis_intent() {
        for intent in Intent::ALL {
            let response = EngineResponse::new(intent, "text");
            assert_eq!(response.is_emergency, intent == Intent::Crisis);
            assert_eq!(
                ClassificationResult::new(intent).is_emergency,
                intent == Intent::Crisis
            );
        }
    }

    #[test]
    fn intents_serialize_as_snake_case() {
        let json = serde_json::to_string(&Intent::MoodTracking).unwrap();
        assert_eq!(json, "\"mood_tracking\"");
        for intent in Intent::ALL {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }
}
