use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Reads a patch field that may be cleared: absent stays `None` (through
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A Pali text with its line-aligned companions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: String,
    pub title: String,
    /// Source-language verses, one per line.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub katakana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a text. The store assigns `id` and both timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub katakana: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Partial update for a text. An absent field keeps the stored value; `null`
/// clears an optional field. `title` and `content` can't be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub katakana: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub translation: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<String>>,
}

impl Text {
    pub fn from_draft(id: String, draft: TextDraft, now: DateTime<Utc>) -> Self {
        Text {
            id,
            title: draft.title,
            content: draft.content,
            katakana: draft.katakana,
            translation: draft.translation,
            source: draft.source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `patch` over this record. `id` and `created_at` are untouched.
    pub fn apply(&mut self, patch: TextPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(katakana) = patch.katakana {
            self.katakana = katakana;
        }
        if let Some(translation) = patch.translation {
            self.translation = translation;
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        self.updated_at = now;
    }
}

/// Glosses keyed by language code. `ja` and `en` are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    pub ja: String,
    pub en: String,
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

impl Translations {
    pub fn new(ja: impl Into<String>, en: impl Into<String>) -> Self {
        Translations {
            ja: ja.into(),
            en: en.into(),
            other: BTreeMap::new(),
        }
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        match lang {
            "ja" => Some(&self.ja),
            "en" => Some(&self.en),
            _ => self.other.get(lang).map(String::as_str),
        }
    }

    /// Every gloss, `ja` and `en` first.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [self.ja.as_str(), self.en.as_str()]
            .into_iter()
            .chain(self.other.values().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    pub katakana: String,
    pub translations: Translations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

/// Partial update for a dictionary entry. There is no `word` field; the key
/// of an entry never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub katakana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub examples: Option<Option<Vec<String>>>,
}

impl DictionaryEntry {
    pub fn apply(&mut self, patch: DictionaryPatch) {
        if let Some(katakana) = patch.katakana {
            self.katakana = katakana;
        }
        if let Some(translations) = patch.translations {
            self.translations = translations;
        }
        if let Some(pronunciation) = patch.pronunciation {
            self.pronunciation = pronunciation;
        }
        if let Some(part_of_speech) = patch.part_of_speech {
            self.part_of_speech = part_of_speech;
        }
        if let Some(examples) = patch.examples {
            self.examples = examples;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_uses_camel_case_and_omits_empty_optionals() {
        let now = Utc::now();
        let text = Text::from_draft(
            "text-1".to_string(),
            TextDraft {
                title: "Metta Sutta".to_string(),
                content: "karaniyam attha kusalena".to_string(),
                ..Default::default()
            },
            now,
        );

        let value = serde_json::to_value(&text).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("katakana").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn text_reads_javascript_timestamps() {
        let raw = r#"{
            "id": "text-1700000000000-abc123def",
            "title": "Dhammapada 1",
            "content": "manopubbangama dhamma",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-02T03:04:05.678Z"
        }"#;
        let text: Text = serde_json::from_str(raw).unwrap();
        assert_eq!(text.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(text.updated_at > text.created_at);
    }

    #[test]
    fn text_patch_keeps_absent_fields() {
        let now = Utc::now();
        let mut text = Text::from_draft(
            "text-1".to_string(),
            TextDraft {
                title: "old".to_string(),
                content: "sabbe satta".to_string(),
                katakana: Some("サッベー サッター".to_string()),
                ..Default::default()
            },
            now,
        );

        let patch: TextPatch = serde_json::from_str(r#"{"title":"new"}"#).unwrap();
        text.apply(patch, now);

        assert_eq!(text.title, "new");
        assert_eq!(text.content, "sabbe satta");
        assert_eq!(text.katakana.as_deref(), Some("サッベー サッター"));
    }

    #[test]
    fn null_in_patch_clears_optional_fields() {
        let now = Utc::now();
        let mut text = Text::from_draft(
            "text-1".to_string(),
            TextDraft {
                title: "old".to_string(),
                content: "sabbe satta".to_string(),
                katakana: Some("サッベー サッター".to_string()),
                source: Some("Sn 1.8".to_string()),
                ..Default::default()
            },
            now,
        );

        let patch: TextPatch =
            serde_json::from_str(r#"{"katakana":null,"title":null}"#).unwrap();
        assert_eq!(patch.katakana, Some(None));
        assert_eq!(patch.source, None);
        text.apply(patch, now);

        assert_eq!(text.katakana, None);
        assert_eq!(text.source.as_deref(), Some("Sn 1.8"));
        assert_eq!(text.title, "old");
        assert!(!serde_json::to_string(&text).unwrap().contains("katakana"));
    }

    #[test]
    fn translations_keep_extra_languages() {
        let raw = r#"{"ja":"すべて","en":"all","th":"ทั้งหมด"}"#;
        let translations: Translations = serde_json::from_str(raw).unwrap();
        assert_eq!(translations.get("th"), Some("ทั้งหมด"));
        assert_eq!(translations.values().count(), 3);

        let back = serde_json::to_value(&translations).unwrap();
        assert_eq!(back["th"], "ทั้งหมด");
    }

    #[test]
    fn translations_require_ja_and_en() {
        let missing_en = r#"{"ja":"すべて"}"#;
        assert!(serde_json::from_str::<Translations>(missing_en).is_err());
    }

    #[test]
    fn dictionary_patch_ignores_word() {
        let mut entry = DictionaryEntry {
            word: "sabbe".to_string(),
            katakana: "サッベー".to_string(),
            translations: Translations::new("すべての", "all"),
            pronunciation: None,
            part_of_speech: None,
            examples: None,
        };

        let patch: DictionaryPatch =
            serde_json::from_str(r#"{"word":"other","partOfSpeech":"adj."}"#).unwrap();
        entry.apply(patch);

        assert_eq!(entry.word, "sabbe");
        assert_eq!(entry.part_of_speech.as_deref(), Some("adj."));
    }
}
