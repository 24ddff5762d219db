use crate::models::{EmergencyNotice, Helpline, Language};

/// Phrases that signal self-harm or suicidal intent in either supported language.
pub const CRISIS_LEXICON: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "harm myself",
    "not worth living",
    "better off dead",
    "end it all",
    "take my own life",
    "hurt myself",
    "self harm",
    "cut myself",
    "overdose",
    "jump off",
    "தற்கொலை",
    "சாக வேண்டும்",
    "உயிர் போக வேண்டும்",
    "இறக்க வேண்டும்",
    "தன்னை கொல்ல",
    "உயிரை மாய்த்து",
    "வாழ்க்கை வேண்டாம்",
];

pub const EMERGENCY_NUMBER: &str = "112";
pub const MENTAL_HEALTH_HELPLINE: &str = "1800-599-0019";
pub const TEXT_LINE: &str = "Text HELLO to 741741";

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    lexicon: &'static [&'static str],
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(CRISIS_LEXICON)
    }
}

impl CrisisDetector {
    pub fn new(lexicon: &'static [&'static str]) -> Self {
        Self { lexicon }
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.lexicon.iter().any(|term| lower.contains(term))
    }
}

/// Alert the caller raises next to a crisis reply.
pub fn emergency_notice(language: Language) -> EmergencyNotice {
    let (title, description) = match language {
        Language::English => (
            "Emergency Support",
            "If you're in immediate danger, please contact emergency services.",
        ),
        Language::Tamil => (
            "அவசர உதவி",
            "நீங்கள் உடனடி ஆபத்தில் இருந்தால், தயவுசெய்து அவசர சேவைகளைத் தொடர்பு கொள்ளுங்கள்.",
        ),
    };

    EmergencyNotice {
        title: title.to_string(),
        description: description.to_string(),
        helplines: helplines(language),
    }
}

pub fn safety_disclaimer(language: Language) -> &'static str {
    match language {
        Language::English => "Important: This app provides educational wellness support, not medical advice. In emergencies, call 112 (India) or contact a qualified mental health professional immediately. Crisis Helpline: 1800-599-0019",
        Language::Tamil => "முக்கியம்: இந்த செயலி கல்வி சார்ந்த நல்வாழ்வு ஆதரவை வழங்குகிறது, மருத்துவ ஆலோசனை அல்ல. அவசரநிலையில் 112 (இந்தியா) ஐ அழைக்கவும் அல்லது தகுதியான மனநல நிபுணரை உடனடியாகத் தொடர்பு கொள்ளவும். நெருக்கடி உதவி எண்: 1800-599-0019",
    }
}

pub fn helplines(language: Language) -> Vec<Helpline> {
    let mut lines = match language {
        Language::English => vec![
            helpline("Emergency", EMERGENCY_NUMBER),
            helpline("Mental Health Helpline", MENTAL_HEALTH_HELPLINE),
        ],
        Language::Tamil => vec![
            helpline("அவசரநிலை", EMERGENCY_NUMBER),
            helpline("மனநலம் உதவி எண்", MENTAL_HEALTH_HELPLINE),
        ],
    };

    // the text line only serves English speakers
    if language == Language::English {
        lines.push(helpline("Crisis Text Line", TEXT_LINE));
    }

    lines
}

fn helpline(label: &str, contact: &str) -> Helpline {
    Helpline {
        label: label.to_string(),
        contact: contact.to_string(),
    }
}
