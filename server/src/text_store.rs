use crate::database::{read_or_init_json_array, write_json_array, DataDir, StoreError, StoreResult};
use crate::models::{Text, TextDraft, TextPatch};
use chrono::Utc;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// All texts, kept as one JSON array in `texts.json`.
///
/// Every mutation reads the whole file, edits it and writes it back. Two
/// overlapping writers can lose an update; the store assumes one admin.
#[derive(Debug, Clone)]
pub struct TextStore {
    path: PathBuf,
}

impl TextStore {
    pub fn new(data_dir: &DataDir) -> Self {
        TextStore {
            path: data_dir.texts_path(),
        }
    }

    pub fn list(&self) -> StoreResult<Vec<Text>> {
        read_or_init_json_array(&self.path)
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Text>> {
        Ok(self.list()?.into_iter().find(|text| text.id == id))
    }

    pub fn create(&self, draft: TextDraft) -> StoreResult<Text> {
        let mut texts = self.list()?;
        let now = Utc::now();
        let text = Text::from_draft(new_text_id(now.timestamp_millis()), draft, now);

        texts.push(text.clone());
        write_json_array(&self.path, &texts)?;
        debug!(id = %text.id, "text created");
        Ok(text)
    }

    pub fn update(&self, id: &str, patch: TextPatch) -> StoreResult<Text> {
        let mut texts = self.list()?;
        let text = texts
            .iter_mut()
            .find(|text| text.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Text with id {}", id)))?;

        text.apply(patch, Utc::now());
        let updated = text.clone();

        write_json_array(&self.path, &texts)?;
        debug!(id, "text updated");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut texts = self.list()?;
        let before = texts.len();
        texts.retain(|text| text.id != id);
        if texts.len() == before {
            return Ok(false);
        }

        write_json_array(&self.path, &texts)?;
        debug!(id, "text deleted");
        Ok(true)
    }
}

// text-<millis>-<9 random chars>
fn new_text_id(millis: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("text-{}-{}", millis, &random[..9])
}
