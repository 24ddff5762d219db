use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ClassificationResult, Intent};
use crate::safety::CrisisDetector;

/// Keyword sets in priority order. When a message hits several categories the
/// earliest entry wins, so "tired" resolves to stress before sleep.
pub const KEYWORD_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::Anxiety,
        &[
            "anxious", "nervous", "worry", "panic", "scared", "fear", "tension", "கவலை", "பயம்",
            "பதட்டம்",
        ],
    ),
    (
        Intent::Stress,
        &[
            "stress",
            "pressure",
            "overwhelmed",
            "burden",
            "tired",
            "exhausted",
            "மன அழுத்தம்",
            "சோர்வு",
            "நெரிசல்",
        ],
    ),
    (
        Intent::Sleep,
        &[
            "sleep",
            "insomnia",
            "tired",
            "sleepy",
            "rest",
            "bed",
            "dream",
            "nightmare",
            "தூக்கம்",
            "உறக்கம்",
            "கனவு",
        ],
    ),
    (
        Intent::LowMood,
        &[
            "sad",
            "depressed",
            "down",
            "lonely",
            "empty",
            "hopeless",
            "worthless",
            "சோகம்",
            "மனவேதனை",
            "தனிமை",
        ],
    ),
    (
        Intent::Coping,
        &[
            "help",
            "cope",
            "manage",
            "deal with",
            "handle",
            "strategy",
            "technique",
            "உதவி",
            "சமாளிக்க",
            "முறை",
        ],
    ),
    (
        Intent::MoodTracking,
        &[
            "mood", "feeling", "track", "record", "log", "diary", "மனநிலை", "உணர்வு", "பதிவு",
        ],
    ),
    (
        Intent::Gratitude,
        &[
            "thank",
            "grateful",
            "appreciate",
            "positive",
            "good",
            "happy",
            "blessed",
            "நன்றி",
            "மகிழ்ச்சி",
            "நல்லது",
        ],
    ),
    (
        Intent::Meta,
        &[
            "who are you",
            "what are you",
            "doctor",
            "therapist",
            "medical",
            "யார் நீங்கள்",
            "என்ன நீங்கள்",
            "மருத்துவர்",
        ],
    ),
];

static GREETING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(hi|hello|hey|good morning|good evening|வணக்கம்|ஹலோ)")
        .expect("valid greeting regex")
});

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

#[derive(Debug, Clone)]
pub struct Classifier {
    crisis: CrisisDetector,
    keywords: &'static [(Intent, &'static [&'static str])],
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(CrisisDetector::default(), KEYWORD_TABLE)
    }
}

impl Classifier {
    pub fn new(
        crisis: CrisisDetector,
        keywords: &'static [(Intent, &'static [&'static str])],
    ) -> Self {
        Self { crisis, keywords }
    }

    /// Crisis terms are checked first and override every keyword category.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        if self.crisis.is_crisis(text) {
            return ClassificationResult::crisis();
        }

        ClassificationResult::new(self.classify_keywords(text))
    }

    /// Keyword and greeting matching only. Never yields [`Intent::Crisis`].
    pub fn classify_keywords(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();

        for (intent, needles) in self.keywords {
            if contains_any(&lower, needles) {
                return *intent;
            }
        }

        if GREETING_PATTERN.is_match(lower.trim()) {
            return Intent::Greeting;
        }

        Intent::General
    }
}

pub fn classify(text: &str) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify(text)
}

pub fn classify_intent_rules(text: &str) -> Intent {
    DEFAULT_CLASSIFIER.classify_keywords(text)
}

/// Position of `intent` in the keyword priority order, if it has keywords at all.
pub fn keyword_priority(intent: Intent) -> Option<usize> {
    KEYWORD_TABLE
        .iter()
        .position(|(candidate, _)| *candidate == intent)
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
