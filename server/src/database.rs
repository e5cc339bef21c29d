use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const TEXTS_FILE_NAME: &str = "texts.json";
pub const DICTIONARY_DIR_NAME: &str = "dictionary";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Layout of the data directory. Nothing is created until a store needs it.
#[derive(Debug, Clone)]
pub struct DataDir {
    pub root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataDir { root: root.into() }
    }

    pub fn texts_path(&self) -> PathBuf {
        self.root.join(TEXTS_FILE_NAME)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.root.join(DICTIONARY_DIR_NAME)
    }
}

/// Reads a JSON array, writing `[]` to `path` first if the file is missing.
pub fn read_or_init_json_array<T>(path: &Path) -> StoreResult<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    if !path.exists() {
        let empty: Vec<T> = Vec::new();
        write_json_array(path, &empty)?;
        return Ok(empty);
    }
    read_json_array(path)
}

/// Reads a JSON array, treating a missing file as empty without creating it.
pub fn read_json_array_or_default<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_json_array(path)
}

pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Mode for a file written where none existed. The temporary file starts out
/// owner-only.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Permissions the replacement file should carry: those of the file being
/// replaced, or the default for a new data file.
fn replacement_permissions(path: &Path) -> std::io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                Ok(Some(fs::Permissions::from_mode(NEW_FILE_MODE)))
            }
            #[cfg(not(unix))]
            {
                Ok(None)
            }
        }
        Err(e) => Err(e),
    }
}

/// Pretty-prints `items` to `path`, replacing the whole file.
///
/// The array is written to a temporary file next to the target and renamed
/// over it, so readers only ever see the old or the new array. The target's
/// permissions carry over to the new file.
pub fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(items)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    if let Some(perms) = replacement_permissions(path)? {
        tmp.as_file().set_permissions(perms)?;
    }
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_or_init_creates_missing_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("items.json");

        let items: Vec<String> = read_or_init_json_array(&path).unwrap();
        assert!(items.is_empty());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn read_default_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let items: Vec<String> = read_json_array_or_default(&path).unwrap();
        assert!(items.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn write_is_pretty_printed_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");

        write_json_array(&path, &["a".to_string(), "b".to_string()]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "[\n  \"a\",\n  \"b\"\n]");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{not json").unwrap();

        let result: StoreResult<Vec<String>> = read_json_array(&path);
        assert!(matches!(result, Err(StoreError::Parse(_))));
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

        write_json_array(&path, &["a".to_string()]).unwrap();
        assert_eq!(mode(&path), NEW_FILE_MODE);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_json_array(&path, &["b".to_string()]).unwrap();
        assert_eq!(mode(&path), 0o640);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[\n  \"b\"\n]");
    }
}
