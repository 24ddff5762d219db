use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Language;

pub const MAX_MOOD_SCORE: u8 = 10;
/// Entries kept per user; older ones are pruned on save.
pub const MOOD_HISTORY_LIMIT: usize = 30;

const ENGLISH_LABELS: [&str; 11] = [
    "Very Low",
    "Very Low",
    "Low",
    "Low",
    "Below Average",
    "Average",
    "Above Average",
    "Good",
    "Good",
    "Very Good",
    "Excellent",
];

const TAMIL_LABELS: [&str; 11] = [
    "மிக குறைவு",
    "மிக குறைவு",
    "குறைவு",
    "குறைவு",
    "சராசரிக்கு கீழ்",
    "சராசரி",
    "சராசரிக்கு மேல்",
    "நல்லது",
    "நல்லது",
    "மிக நல்லது",
    "சிறந்தது",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mood score {0} is outside 0..=10")]
pub struct MoodScoreError(pub i64);

/// A self-reported mood rating from 0 (very low) to 10 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MoodScore(u8);

impl MoodScore {
    pub fn new(value: i64) -> Result<Self, MoodScoreError> {
        if (0..=MAX_MOOD_SCORE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(MoodScoreError(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            0..=2 => "😢",
            3..=4 => "😞",
            5..=6 => "😐",
            7..=8 => "🙂",
            _ => "😊",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        let labels = match language {
            Language::English => &ENGLISH_LABELS,
            Language::Tamil => &TAMIL_LABELS,
        };
        labels[self.0 as usize]
    }
}

impl TryFrom<i64> for MoodScore {
    type Error = MoodScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MoodScore> for u8 {
    fn from(score: MoodScore) -> Self {
        score.0
    }
}

pub fn saved_confirmation(score: MoodScore, language: Language) -> (String, String) {
    match language {
        Language::English => (
            "Mood Saved".to_string(),
            format!("Your mood ({}/10) has been recorded.", score.value()),
        ),
        Language::Tamil => (
            "மனநிலை சேமிக்கப்பட்டது".to_string(),
            format!(
                "உங்கள் மனநிலை ({}/10) பதிவு செய்யப்பட்டது.",
                score.value()
            ),
        ),
    }
}

/// "Today", "Yesterday" or "N days ago", counted in whole 24-hour periods since
/// the entry was recorded.
pub fn relative_day(recorded_at: DateTime<Utc>, now: DateTime<Utc>, language: Language) -> String {
    let days = (now - recorded_at).num_days().max(0);

    match (days, language) {
        (0, Language::English) => "Today".to_string(),
        (1, Language::English) => "Yesterday".to_string(),
        (n, Language::English) => format!("{n} days ago"),
        (0, Language::Tamil) => "இன்று".to_string(),
        (1, Language::Tamil) => "நேற்று".to_string(),
        (n, Language::Tamil) => format!("{n} நாட்களுக்கு முன்பு"),
    }
}

pub fn empty_history_message(language: Language) -> &'static str {
    match language {
        Language::English => "No mood entries yet. Start tracking to see your patterns!",
        Language::Tamil => "இன்னும் மனநிலை பதிவுகள் இல்லை. உங்கள் முறைகளைக் காண கண்காணிக்கத் தொடங்குங்கள்!",
    }
}

pub fn average_score(scores: &[MoodScore]) -> Option<f32> {
    if scores.is_empty() {
        return None;
    }
    let total: u32 = scores.iter().map(|score| score.value() as u32).sum();
    Some(total as f32 / scores.len() as f32)
}
