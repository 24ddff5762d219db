use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::models::{Intent, Language};

const ENGLISH_TEMPLATES: &[(Intent, &str)] = &[
    (
        Intent::Greeting,
        "Hello! I'm here to support your mental wellness journey. How are you feeling today?",
    ),
    (
        Intent::Crisis,
        "I'm very concerned about what you've shared. If you're having thoughts of self-harm, please reach out for immediate help:\n\n🚨 Emergency: 112\n📞 Mental Health Helpline: 1800-599-0019\n💬 Text HELLO to 741741\n\nYou matter, and there are people who want to help you through this difficult time.",
    ),
    (
        Intent::Anxiety,
        "I understand you're feeling anxious. Anxiety can be overwhelming, but there are ways to help manage it:\n\n• Try the 4-7-8 breathing technique: Breathe in for 4, hold for 7, exhale for 8\n• Ground yourself: Name 5 things you can see, 4 you can hear, 3 you can touch\n• Remember: This feeling will pass\n\nWould you like to practice a breathing exercise together?",
    ),
    (
        Intent::Stress,
        "Stress can feel overwhelming, but you're not alone in this. Here are some gentle techniques:\n\n• Take a few slow, deep breaths\n• Try the 5-minute rule: Focus on just the next 5 minutes\n• Practice self-compassion - be kind to yourself\n• Consider what you can control vs. what you can't\n\nWhat's one small thing that usually helps you feel calmer?",
    ),
    (
        Intent::Sleep,
        "Sleep troubles can really affect how we feel. Here are some gentle sleep hygiene tips:\n\n• Try to keep consistent sleep/wake times\n• Create a calming bedtime routine\n• Limit screens 1 hour before bed\n• Try progressive muscle relaxation\n\nHave you noticed any patterns in what affects your sleep?",
    ),
    (
        Intent::LowMood,
        "I hear that you're going through a difficult time. Your feelings are valid, and it's okay to not be okay sometimes.\n\n• Remember: You are worthy of care and support\n• Try to do one small thing you usually enjoy\n• Connect with someone you trust\n• Be gentle with yourself\n\nWould you like to talk about what's been weighing on your mind?",
    ),
    (
        Intent::Coping,
        "It's wonderful that you're looking for healthy ways to cope. Here are some evidence-based techniques:\n\n• Mindfulness: Try 5-10 minutes of meditation daily\n• Physical activity: Even a short walk can help\n• Creative outlets: Drawing, writing, music\n• Social connection: Reach out to supportive people\n\nWhat type of activities usually feel most natural to you?",
    ),
    (
        Intent::MoodTracking,
        "Tracking your mood is a great way to understand your patterns! I can help you log how you're feeling. Would you like to record your current mood? You can rate it from 0-10 and add any notes about what might be influencing how you feel today.",
    ),
    (
        Intent::Gratitude,
        "Thank you for sharing that positive moment! Gratitude can be really powerful for our wellbeing. Some ways to build on this:\n\n• Keep a daily gratitude journal\n• Share appreciation with others\n• Notice small positive moments\n• Celebrate your progress\n\nWhat's something else you've been grateful for recently?",
    ),
    (
        Intent::Meta,
        "I'm a supportive chatbot designed to provide wellness guidance and a listening ear. I'm not a doctor or therapist, and I can't provide medical advice or diagnosis. I'm here to offer evidence-based coping strategies and emotional support. For professional help, please consult qualified mental health professionals.",
    ),
    (
        Intent::General,
        "I'm here to listen and support you. Sometimes just talking about what's on your mind can help. Feel free to share whatever you're comfortable with - whether it's how you're feeling, something that's bothering you, or even something positive that happened today.",
    ),
];

const TAMIL_TEMPLATES: &[(Intent, &str)] = &[
    (
        Intent::Greeting,
        "வணக்கம்! உங்கள் மன நலப் பயணத்தில் உங்களுக்கு ஆதரவளிக்க நான் இங்கே இருக்கிறேன். இன்று நீங்கள் எப்படி உணர்கிறீர்கள்?",
    ),
    (
        Intent::Crisis,
        "நீங்கள் பகிர்ந்த விஷயத்தைப் பற்றி நான் மிகவும் கவலைப்படுகிறேன். உங்களுக்கு தன்னை காயப்படுத்தும் எண்ணங்கள் இருந்தால், உடனடியாக உதவி கேளுங்கள்:\n\n🚨 அவசரநிலை: 112\n📞 மனநலம் உதவி எண்: 1800-599-0019\n\nநீங்கள் முக்கியமானவர், இந்த கடினமான நேரத்தில் உங்களுக்கு உதவ விரும்பும் மக்கள் உள்ளனர்.",
    ),
    (
        Intent::Anxiety,
        "நீங்கள் கவலையாக உணர்கிறீர்கள் என்பதை நான் புரிந்துகொள்கிறேன். கவலை மிகவும் கடினமாக இருக்கும், ஆனால் அதை சமாளிக்க வழிகள் உள்ளன:\n\n• 4-7-8 மூச்சு நுட்பம்: 4 எண்ணுங்கள், 7 நிறுத்துங்கள், 8 மூச்சை வெளியே விடுங்கள்\n• தரையில் கால்பதிக்கவும்: 5 விஷயங்களைப் பாருங்கள், 4 கேளுங்கள், 3 தொடுங்கள்\n• நினைவில் வைக்கவும்: இந்த உணர்வு கடந்து போகும்\n\nசேர்ந்து மூச்சுப் பயிற்சி செய்ய விரும்புகிறீர்களா?",
    ),
    (
        Intent::Stress,
        "மன அழுத்தம் மிகவும் கடினமாக உணரலாம், ஆனால் இதில் நீங்கள் தனியாக இல்லை. சில மென்மையான நுட்பங்கள்:\n\n• சில மெதுவான, ஆழமான மூச்சுகள் எடுங்கள்\n• 5 நிமிட விதி: அடுத்த 5 நிமிடங்களில் மட்டும் கவனம் செலுத்துங்கள்\n• உங்களுக்கு இரக்கம் காட்டுங்கள்\n• நீங்கள் கட்டுப்படுத்த முடியாதவற்றை விட்டுவிடுங்கள்\n\nசாதாரணமாக உங்களை அமைதிப்படுத்த உதவும் ஒரு சிறிய விஷயம் என்ன?",
    ),
    (
        Intent::Sleep,
        "தூக்கப் பிரச்சனைகள் நம் உணர்வுகளை மிகவும் பாதிக்கும். சில மென்மையான தூக்க சுகாதார குறிப்புகள்:\n\n• நிலையான தூக்க/விழிப்பு நேரம் வைக்கவும்\n• அமைதியான படுக்கை நேர வழக்கம் உருவாக்கவும்\n• படுக்கைக்கு 1 மணி நேரத்திற்கு முன் திரைகளைக் குறைக்கவும்\n• படிப்படியான தசை தளர்வைப் பயிற்சி செய்யுங்கள்\n\nஉங்கள் தூக்கத்தைப் பாதிக்கும் எதையாவது கவனித்திருக்கிறீர்களா?",
    ),
    (
        Intent::LowMood,
        "நீங்கள் கடினமான காலத்தில் இருக்கிறீர்கள் என்பதை நான் கேட்கிறேன். உங்கள் உணர்வுகள் சரியானவை, சில நேரங்களில் நல்லாக இல்லாமல் இருப்பது பரவாயில்லை.\n\n• நினைவில் கொள்ளுங்கள்: நீங்கள் பராமரிப்புக்கு தகுதியானவர்\n• நீங்கள் பொதுவாக அனுபவிக்கும் ஒரு சிறிய விஷயத்தைச் செய்ய முயற்சிக்கவும்\n• நீங்கள் நம்பும் ஒருவருடன் தொடர்பு கொள்ளுங்கள்\n• உங்களுக்கு மென்மையாக இருங்கள்\n\nஉங்கள் மனதை பாரமாக்கும் விஷயத்தைப் பற்றி பேச விரும்புகிறீர்களா?",
    ),
    (
        Intent::Coping,
        "ஆரோக்கியமான வழிகளைத் தேடுவது அருமை. சில சான்று அடிப்படையிலான நுட்பங்கள்:\n\n• நினைவாற்றல்: தினமும் 5-10 நிமிடங்கள் தியானம் செய்யுங்கள்\n• உடல் செயல்பாடு: ஒரு சிறிய நடைகூட உதவும்\n• படைப்பு: வரைதல், எழுதுதல், இசை\n• சமூக தொடர்பு: ஆதரவான மக்களை தொடர்பு கொள்ளுங்கள்\n\nபொதுவாக எந்த வகையான செயல்பாடுகள் உங்களுக்கு இயல்பாக உணர்கின்றன?",
    ),
    (
        Intent::MoodTracking,
        "உங்கள் மனநிலையைக் கண்காணிப்பது உங்கள் முறைகளைப் புரிந்துகொள்ள ஒரு சிறந்த வழி! நீங்கள் எப்படி உணர்கிறீர்கள் என்பதைப் பதிவு செய்ய நான் உதவ முடியும். உங்கள் தற்போதைய மனநிலையைப் பதிவு செய்ய விரும்புகிறீர்களா? நீங்கள் அதை 0-10 என மதிப்பிட்டு, இன்று உங்களை எப்படி உணர வைக்கிறது என்பதைப் பற்றிய குறிப்புகளைச் சேர்க்கலாம்.",
    ),
    (
        Intent::Gratitude,
        "அந்த நேர்மறையான தருணத்தைப் பகிர்ந்ததற்கு நன்றி! நன்றியுணர்வு நம் நல்வாழ்வுக்கு மிகவும் சக்திவாய்ந்தது. இதை வளர்க்கும் சில வழிகள்:\n\n• தினசரி நன்றி பத்திரிகை வைக்கவும்\n• மற்றவர்களுடன் பாராட்டுகளைப் பகிர்ந்து கொள்ளுங்கள்\n• சிறிய நேர்மறையான தருணங்களைக் கவனியுங்கள்\n• உங்கள் முன்னேற்றத்தைக் கொண்டாடுங்கள்\n\nநீங்கள் சமீபத்தில் நன்றியுணர்ந்த வேறு ஏதாவது இருக்கிறதா?",
    ),
    (
        Intent::Meta,
        "நான் நல்வாழ்வு வழிகாட்டுதலையும் கேட்கும் காதையும் வழங்க வடிவமைக்கப்பட்ட ஒரு ஆதரவு சாட்பாட். நான் மருத்துவர் அல்லது சிகிச்சையாளர் அல்ல, மருத்துவ ஆலோசனை அல்லது நோயறிதலை வழங்க முடியாது. சான்று அடிப்படையிலான சமாளிப்பு உத்திகள் மற்றும் உணர்ச்சி ஆதரவை வழங்க நான் இங்கே இருக்கிறேன். தொழில்முறை உதவிக்கு, தகுதியான மனநல நிபுணர்களைக் கலந்தாலோசிக்கவும்.",
    ),
    (
        Intent::General,
        "நான் உங்களைக் கேட்டு ஆதரிக்க இங்கே இருக்கிறேன். சில நேரங்களில் உங்கள் மனதில் உள்ளதைப் பற்றி பேசுவதே உதவியாக இருக்கும். நீங்கள் வசதியாக உணரும் எதையும் பகிரலாம் - நீங்கள் எப்படி உணர்கிறீர்கள், உங்களைத் தொந்தரவு செய்யும் ஏதாவது, அல்லது இன்று நடந்த நேர்மறையான ஏதாவது.",
    ),
];

static BUILTIN_CATALOG: Lazy<ResponseCatalog> = Lazy::new(|| {
    ResponseCatalog::from_entries(builtin_entries())
        .expect("builtin templates cover general and crisis for every language")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("no {intent} template for language {language}")]
    MissingTemplate { language: Language, intent: Intent },
    #[error("{intent} template for language {language} is blank")]
    BlankTemplate { language: Language, intent: Intent },
}

#[derive(Debug, Clone)]
struct TemplateSet {
    general: String,
    replies: HashMap<Intent, String>,
}

impl TemplateSet {
    fn select(&self, intent: Intent) -> &str {
        self.replies.get(&intent).unwrap_or(&self.general)
    }
}

/// Localized reply templates keyed by (language, intent).
///
/// Every language carries a `general` and a `crisis` template; construction
/// fails otherwise, so lookups never come back empty-handed.
#[derive(Debug, Clone)]
pub struct ResponseCatalog {
    english: TemplateSet,
    tamil: TemplateSet,
}

impl ResponseCatalog {
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    pub fn from_entries<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (Language, Intent, S)>,
        S: Into<String>,
    {
        let mut by_language: HashMap<Language, HashMap<Intent, String>> = HashMap::new();
        for (language, intent, text) in entries {
            let text = text.into();
            if text.trim().is_empty() {
                return Err(CatalogError::BlankTemplate { language, intent });
            }
            by_language.entry(language).or_default().insert(intent, text);
        }

        Ok(Self {
            english: template_set(Language::English, by_language.remove(&Language::English))?,
            tamil: template_set(Language::Tamil, by_language.remove(&Language::Tamil))?,
        })
    }

    /// Falls back to the language's `general` template when `intent` has none.
    pub fn select(&self, intent: Intent, language: Language) -> &str {
        self.templates(language).select(intent)
    }

    pub fn has_template(&self, intent: Intent, language: Language) -> bool {
        intent == Intent::General || self.templates(language).replies.contains_key(&intent)
    }

    /// Pairs that resolve through the `general` fallback.
    pub fn fallback_pairs(&self) -> Vec<(Language, Intent)> {
        Language::ALL
            .into_iter()
            .flat_map(|language| {
                Intent::ALL
                    .into_iter()
                    .filter(move |intent| !self.has_template(*intent, language))
                    .map(move |intent| (language, intent))
            })
            .collect()
    }

    fn templates(&self, language: Language) -> &TemplateSet {
        match language {
            Language::English => &self.english,
            Language::Tamil => &self.tamil,
        }
    }
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn select_response(intent: Intent, language: Language) -> &'static str {
    BUILTIN_CATALOG.select(intent, language)
}

fn builtin_entries() -> Vec<(Language, Intent, &'static str)> {
    ENGLISH_TEMPLATES
        .iter()
        .map(|(intent, text)| (Language::English, *intent, *text))
        .chain(
            TAMIL_TEMPLATES
                .iter()
                .map(|(intent, text)| (Language::Tamil, *intent, *text)),
        )
        .collect()
}

fn template_set(
    language: Language,
    replies: Option<HashMap<Intent, String>>,
) -> Result<TemplateSet, CatalogError> {
    let mut replies = replies.unwrap_or_default();

    if !replies.contains_key(&Intent::Crisis) {
        return Err(CatalogError::MissingTemplate {
            language,
            intent: Intent::Crisis,
        });
    }

    let general = replies
        .remove(&Intent::General)
        .ok_or(CatalogError::MissingTemplate {
            language,
            intent: Intent::General,
        })?;

    Ok(TemplateSet { general, replies })
}
