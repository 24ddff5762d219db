mod journal;

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use solace_core::{
    ClassificationResult, Classifier, EngineResponse, Intent, Language, ResponseCatalog,
};
use solace_observability::AppMetrics;
use tracing::{info, instrument, warn};

pub use journal::{MoodJournal, MoodSummary};

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Pause before a reply resolves so the UI can show a typing state.
    pub reply_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }
}

impl EngineConfig {
    pub fn immediate() -> Self {
        Self {
            reply_delay: Duration::ZERO,
        }
    }

    pub fn with_reply_delay(reply_delay: Duration) -> Self {
        Self { reply_delay }
    }

    /// Reads `SOLACE_REPLY_DELAY_MS`, keeping the default when unset or unparsable.
    pub fn from_env() -> Self {
        env::var("SOLACE_REPLY_DELAY_MS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|millis| Self::with_reply_delay(Duration::from_millis(millis)))
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct ResponseEngine {
    classifier: Classifier,
    catalog: Arc<ResponseCatalog>,
    config: EngineConfig,
    metrics: Arc<AppMetrics>,
}

impl ResponseEngine {
    pub fn new(config: EngineConfig, metrics: Arc<AppMetrics>) -> Self {
        Self::with_catalog(ResponseCatalog::builtin(), config, metrics)
    }

    pub fn with_catalog(
        catalog: ResponseCatalog,
        config: EngineConfig,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        for (language, intent) in catalog.fallback_pairs() {
            warn!(
                language = %language,
                intent = %intent,
                "no dedicated template, replies fall back to general"
            );
        }

        Self {
            classifier: Classifier::default(),
            catalog: Arc::new(catalog),
            config,
            metrics,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    /// Waits out the configured reply delay, then answers. Dropping the future
    /// abandons the turn with nothing to undo.
    #[instrument(skip_all, fields(language = %language))]
    pub async fn respond(&self, text: &str, language: Language) -> EngineResponse {
        if !self.config.reply_delay.is_zero() {
            tokio::time::sleep(self.config.reply_delay).await;
        }

        self.respond_now(text, language)
    }

    pub fn respond_now(&self, text: &str, language: Language) -> EngineResponse {
        let started = Instant::now();
        self.metrics.inc_request();

        let classification = self.classifier.classify(text);
        let response = if classification.is_emergency {
            self.metrics.inc_emergency();
            warn!(language = %language, "crisis signal detected");
            EngineResponse::new(
                Intent::Crisis,
                self.catalog.select(Intent::Crisis, language),
            )
        } else {
            let intent = classification.category;
            if intent == Intent::General {
                self.metrics.inc_fallback();
            }
            EngineResponse::new(intent, self.catalog.select(intent, language))
        };

        self.metrics.record_intent(response.intent.as_str());
        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = %response.intent,
            language = %language,
            emergency = response.is_emergency,
            input_chars = text.chars().count(),
            "turn handled"
        );

        response
    }
}
