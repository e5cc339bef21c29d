//! Call surface used by the HTTP handlers.
//!
//! Both façades forward straight to their store. They exist so handlers do not
//! depend on how records are laid out on disk.

use crate::database::{DataDir, StoreResult};
use crate::dictionary_store::DictionaryStore;
use crate::models::{DictionaryEntry, DictionaryPatch, Text, TextDraft, TextPatch};
use crate::text_store::TextStore;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TextsApi {
    store: TextStore,
}

impl TextsApi {
    pub fn new(data_dir: &DataDir) -> Self {
        TextsApi {
            store: TextStore::new(data_dir),
        }
    }

    pub fn get_all(&self) -> StoreResult<Vec<Text>> {
        self.store.list()
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Text>> {
        self.store.get_by_id(id)
    }

    pub fn create(&self, draft: TextDraft) -> StoreResult<Text> {
        self.store.create(draft)
    }

    pub fn update(&self, id: &str, patch: TextPatch) -> StoreResult<Text> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        self.store.delete(id)
    }
}

#[derive(Debug, Clone)]
pub struct DictionaryApi {
    store: DictionaryStore,
}

impl DictionaryApi {
    pub fn new(data_dir: &DataDir) -> Self {
        DictionaryApi {
            store: DictionaryStore::new(data_dir),
        }
    }

    pub fn get_all(&self) -> StoreResult<Vec<DictionaryEntry>> {
        self.store.list()
    }

    pub fn get_by_word(&self, word: &str) -> StoreResult<Option<DictionaryEntry>> {
        self.store.get_by_word(word)
    }

    pub fn get_many<'a, I>(&self, words: I) -> StoreResult<BTreeMap<String, DictionaryEntry>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.store.get_many(words)
    }

    pub fn create(&self, entry: DictionaryEntry) -> StoreResult<DictionaryEntry> {
        self.store.create(entry)
    }

    pub fn update(&self, word: &str, patch: DictionaryPatch) -> StoreResult<DictionaryEntry> {
        self.store.update(word, patch)
    }

    pub fn delete(&self, word: &str) -> StoreResult<bool> {
        self.store.delete(word)
    }

    pub fn search(&self, query: &str) -> StoreResult<Vec<DictionaryEntry>> {
        self.store.search(query)
    }
}
