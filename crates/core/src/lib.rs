pub mod intent;
pub mod models;
pub mod mood;
pub mod responses;
pub mod safety;

pub use intent::{classify, classify_intent_rules, Classifier, KEYWORD_TABLE};
pub use models::*;
pub use mood::{MoodScore, MoodScoreError, MOOD_HISTORY_LIMIT};
pub use responses::{select_response, CatalogError, ResponseCatalog};
pub use safety::{emergency_notice, safety_disclaimer, CrisisDetector, CRISIS_LEXICON};
