//! Dictionary entries sharded by first letter.
//!
//! Each entry lives in `dictionary/<key>.json`, where `<key>` is the lowercased
//! first character of its `word`. Routing is a pure function of the word, so
//! a word can only ever be stored in one shard. Operations that know the word
//! touch only that shard; `list` and `search` read every shard.

use crate::database::{
    read_json_array, read_json_array_or_default, write_json_array, DataDir, StoreError,
    StoreResult,
};
use crate::models::{DictionaryEntry, DictionaryPatch};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Returns the shard key for `word`.
///
/// The first character must be alphabetic (Pali letters with diacritics such as
/// `ā` or `ṭ` count); anything else has no shard.
pub fn shard_key(word: &str) -> StoreResult<String> {
    let first = word
        .chars()
        .next()
        .ok_or_else(|| StoreError::Validation("word must not be empty".to_string()))?;
    if !first.is_alphabetic() {
        return Err(StoreError::Validation(format!(
            "word {:?} must start with a letter",
            word
        )));
    }
    Ok(first.to_lowercase().collect())
}

#[derive(Debug, Clone)]
pub struct DictionaryStore {
    dir: PathBuf,
}

impl DictionaryStore {
    pub fn new(data_dir: &DataDir) -> Self {
        DictionaryStore {
            dir: data_dir.dictionary_path(),
        }
    }

    fn shard_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn load_shard(&self, key: &str) -> StoreResult<Vec<DictionaryEntry>> {
        read_json_array_or_default(&self.shard_path(key))
    }

    // Creates the dictionary directory on first write.
    fn save_shard(&self, key: &str, entries: &[DictionaryEntry]) -> StoreResult<()> {
        write_json_array(&self.shard_path(key), entries)
    }

    /// Every entry across all shards, shards visited in file-name order.
    pub fn list(&self) -> StoreResult<Vec<DictionaryEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut shard_files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json")
            })
            .collect();
        shard_files.sort();

        let mut entries = Vec::new();
        for path in shard_files {
            entries.extend(read_json_array::<DictionaryEntry>(&path)?);
        }
        Ok(entries)
    }

    pub fn get_by_word(&self, word: &str) -> StoreResult<Option<DictionaryEntry>> {
        let key = shard_key(word)?;
        Ok(self
            .load_shard(&key)?
            .into_iter()
            .find(|entry| entry.word == word))
    }

    /// Looks up several words, loading each owning shard at most once.
    ///
    /// Words without a valid shard key or without an entry are left out of the
    /// result.
    pub fn get_many<'a, I>(&self, words: I) -> StoreResult<BTreeMap<String, DictionaryEntry>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_shard: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for word in words {
            if let Ok(key) = shard_key(word) {
                by_shard.entry(key).or_default().push(word);
            }
        }

        let mut found = BTreeMap::new();
        for (key, wanted) in by_shard {
            for entry in self.load_shard(&key)? {
                if wanted.contains(&entry.word.as_str()) {
                    found.insert(entry.word.clone(), entry);
                }
            }
        }
        Ok(found)
    }

    /// Inserts `entry`, replacing any entry with the same word.
    pub fn create(&self, entry: DictionaryEntry) -> StoreResult<DictionaryEntry> {
        let key = shard_key(&entry.word)?;
        let mut entries = self.load_shard(&key)?;

        match entries.iter_mut().find(|existing| existing.word == entry.word) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }

        self.save_shard(&key, &entries)?;
        debug!(word = %entry.word, shard = %key, "dictionary entry saved");
        Ok(entry)
    }

    pub fn update(&self, word: &str, patch: DictionaryPatch) -> StoreResult<DictionaryEntry> {
        let key = shard_key(word)?;
        let mut entries = self.load_shard(&key)?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.word == word)
            .ok_or_else(|| StoreError::NotFound(format!("Dictionary entry for word {:?}", word)))?;

        entry.apply(patch);
        let updated = entry.clone();

        self.save_shard(&key, &entries)?;
        debug!(word, shard = %key, "dictionary entry updated");
        Ok(updated)
    }

    pub fn delete(&self, word: &str) -> StoreResult<bool> {
        let key = shard_key(word)?;
        let mut entries = self.load_shard(&key)?;
        let before = entries.len();
        entries.retain(|entry| entry.word != word);
        if entries.len() == before {
            return Ok(false);
        }

        self.save_shard(&key, &entries)?;
        debug!(word, shard = %key, "dictionary entry deleted");
        Ok(true)
    }

    /// Substring search over word, katakana and every translation.
    ///
    /// Word and translations match case-insensitively; katakana matches as typed.
    pub fn search(&self, query: &str) -> StoreResult<Vec<DictionaryEntry>> {
        let lower_query = query.to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|entry| {
                entry.word.to_lowercase().contains(&lower_query)
                    || entry.katakana.contains(query)
                    || entry
                        .translations
                        .values()
                        .any(|gloss| gloss.to_lowercase().contains(&lower_query))
            })
            .collect())
    }
}
