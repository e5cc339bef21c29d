use crate::api::{DictionaryApi, TextsApi};
use crate::database::DataDir;

/// Stores shared by every request. Built once at startup.
///
/// The stores hold only paths, so cloning per request is cheap and no lock is
/// taken around file access.
#[derive(Clone)]
pub struct AppState {
    pub texts: TextsApi,
    pub dictionary: DictionaryApi,
}

impl AppState {
    pub fn new(data_dir: &DataDir) -> Self {
        AppState {
            texts: TextsApi::new(data_dir),
            dictionary: DictionaryApi::new(data_dir),
        }
    }
}
