//! Reader-facing view of a text: verses lined up with their katakana and
//! translation, each word tagged with the key used to look it up in the
//! dictionary.

use crate::api::DictionaryApi;
use crate::database::StoreResult;
use crate::models::{DictionaryEntry, Text};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const PUNCTUATION: &[char] = &[
    ',', '.', '!', '?', ';', ':', '"', '“', '”', '\'', '‘', '’', '`', '-', '—', '–',
    '(', ')', '[', ']', '{', '}',
];

/// Turns a token as written in a verse into a dictionary key: lowercased,
/// punctuation removed, surrounding whitespace trimmed.
pub fn normalize_word(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub surface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<String>,
    /// Set when this word and the next were written as one hyphenated compound.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub joins_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub katakana: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingView {
    pub text: Text,
    pub verses: Vec<Verse>,
    /// Dictionary entries for the words of the text, keyed by lookup key.
    pub glossary: BTreeMap<String, DictionaryEntry>,
}

fn non_blank_lines(field: Option<&str>) -> Vec<&str> {
    field
        .map(|s| s.lines().filter(|line| !line.trim().is_empty()).collect())
        .unwrap_or_default()
}

/// Whitespace separates words and `-` separates the members of a compound,
/// each of which is looked up on its own.
fn words_of(line: &str) -> Vec<Word> {
    let mut words = Vec::new();
    for token in line.split_whitespace() {
        let parts: Vec<&str> = token.split('-').filter(|part| !part.is_empty()).collect();
        let last = parts.len().saturating_sub(1);
        for (i, part) in parts.into_iter().enumerate() {
            let key = normalize_word(part);
            words.push(Word {
                surface: part.to_string(),
                lookup: (!key.is_empty()).then_some(key),
                joins_next: i < last,
            });
        }
    }
    words
}

/// Splits a text into verses, one per non-blank content line. Katakana and
/// translation lines pair up by position once their blank lines are dropped;
/// lines past the last content line are not shown.
pub fn align_verses(text: &Text) -> Vec<Verse> {
    let katakana = non_blank_lines(text.katakana.as_deref());
    let translation = non_blank_lines(text.translation.as_deref());

    non_blank_lines(Some(text.content.as_str()))
        .into_iter()
        .enumerate()
        .map(|(i, line)| Verse {
            content: line.to_string(),
            katakana: katakana.get(i).map(|s| s.to_string()),
            translation: translation.get(i).map(|s| s.to_string()),
            words: words_of(line),
        })
        .collect()
}

/// Builds the reading view, resolving every distinct lookup key against the
/// dictionary in one pass per shard.
pub fn build_reading_view(text: Text, dictionary: &DictionaryApi) -> StoreResult<ReadingView> {
    let verses = align_verses(&text);
    let keys: BTreeSet<&str> = verses
        .iter()
        .flat_map(|verse| verse.words.iter())
        .filter_map(|word| word.lookup.as_deref())
        .collect();
    let glossary = dictionary.get_many(keys)?;

    Ok(ReadingView {
        text,
        verses,
        glossary,
    })
}
