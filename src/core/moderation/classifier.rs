// Content classification - three independent checks against configured
// vocabularies. All matching is deliberately loose (lower-cased substring
// and digit-run patterns); precision is traded for recall and the group
// admin reviews everything that gets through anyway.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Vocabularies the classifier matches against. Deserializable so a
/// deployment can override the defaults from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Words that label an advertising-license number ("license 1234567890").
    pub license_labels: Vec<String>,
    /// Words that label a title-deed number.
    pub deed_labels: Vec<String>,
    /// Keywords that mark a message as off-topic for the group.
    pub off_topic_keywords: Vec<String>,
    /// City names outside the served region.
    pub excluded_cities: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            license_labels: [
                "رخصة", "رخصه", "ترخيص", "رقم الرخصة", "fal", "license", "licence",
            ]
            .map(String::from)
            .to_vec(),
            deed_labels: ["صك", "رقم الصك", "deed"].map(String::from).to_vec(),
            off_topic_keywords: [
                "سيارة",
                "سيارات",
                "وظيفة",
                "وظائف",
                "توظيف",
                "أثاث مستعمل",
                "جوالات",
                "عطور",
                "حراج سيارات",
                "car for sale",
                "job vacancy",
                "iphone",
                "furniture sale",
            ]
            .map(String::from)
            .to_vec(),
            excluded_cities: [
                "جدة", "جده", "الدمام", "مكة", "مكه", "المدينة المنورة", "الخبر", "الطائف",
                "أبها", "تبوك", "بريدة", "jeddah", "dammam", "makkah", "mecca", "medina",
                "khobar", "taif", "abha", "tabuk",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

pub struct ContentClassifier {
    off_topic_keywords: Vec<String>,
    excluded_cities: Vec<String>,
    labeled_license: Regex,
    labeled_deed: Regex,
    bare_digit_run: Regex,
}

impl ContentClassifier {
    pub fn new(config: ClassifierConfig) -> anyhow::Result<Self> {
        let labeled_license = Regex::new(&format!(
            r"(?:{})\s*[:#\-]?\s*\d{{7,12}}",
            alternation(&config.license_labels)
        ))?;
        let labeled_deed = Regex::new(&format!(
            r"(?:{})\s*[:#\-]?\s*\d{{5,20}}",
            alternation(&config.deed_labels)
        ))?;
        // Fallback heuristic: any bare 9-12 digit run counts as a license
        // number. Known to also match unrelated numeric strings of that
        // length (long phone numbers, IBAN fragments); kept loose on purpose.
        let bare_digit_run = Regex::new(r"\d{9,12}")?;

        Ok(Self {
            off_topic_keywords: lowercased(config.off_topic_keywords),
            excluded_cities: lowercased(config.excluded_cities),
            labeled_license,
            labeled_deed,
            bare_digit_run,
        })
    }

    /// Does the text carry something that looks like an advertising-license
    /// or deed number?
    pub fn has_license_token(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.labeled_license.is_match(&text)
            || self.labeled_deed.is_match(&text)
            || self.bare_digit_run.is_match(&text)
    }

    /// Does the text contain any configured off-topic keyword?
    pub fn is_off_topic(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.off_topic_keywords.iter().any(|kw| text.contains(kw))
    }

    /// Does the text name a city outside the served region?
    pub fn mentions_excluded_city(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.excluded_cities.iter().any(|city| text.contains(city))
    }
}

fn alternation(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| regex::escape(&label.to_lowercase()))
        .collect::<Vec<_>>()
        .join("|")
}

fn lowercased(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}
