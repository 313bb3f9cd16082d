// Directory-backed document store
// Each collection is a `<collection>.jsonl` file under `<root>/<database>`

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{DocumentStore, StoreError};

const COLLECTION_EXT: &str = "jsonl";

/// JSON-lines document store
pub struct JsonLinesStore {
    name: String,
    dir: PathBuf,
    // Serializes appends so concurrent lines never interleave
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Open a store rooted at `url` (plain path or `file://` URL).
    ///
    /// Nothing touches the filesystem here; a bad location surfaces on first use.
    pub fn open(url: &str, name: &str) -> Self {
        let root = url.strip_prefix("file://").unwrap_or(url);
        Self {
            name: name.to_string(),
            dir: Path::new(root).join(name),
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }
        Ok(self.dir.join(format!("{collection}.{COLLECTION_EXT}")))
    }

    /// Read back every document of a collection
    #[cfg(test)]
    pub fn documents(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let path = self.collection_path(collection)?;
        let content = fs::read_to_string(&path)
            .map_err(|e| StoreError::io(format!("read {}", path.display()), e))?;
        content
            .lines()
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

impl DocumentStore for JsonLinesStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, collection: &str, document: &serde_json::Value) -> Result<(), StoreError> {
        let path = self.collection_path(collection)?;
        let mut line = serde_json::to_string(document)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::io(format!("create {}", self.dir.display()), e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("open {}", path.display()), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(format!("write {}", path.display()), e))
    }

    fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| StoreError::io(format!("list {}", self.dir.display()), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::io(format!("list {}", self.dir.display()), e))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(COLLECTION_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_open_strips_file_scheme() {
        let store = JsonLinesStore::open("file:///var/lib/energy", "prod");
        assert_eq!(store.dir(), Path::new("/var/lib/energy/prod"));
        assert_eq!(store.name(), "prod");
    }

    #[test]
    fn test_insert_then_list() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::open(tmp.path().to_str().unwrap(), "energy");

        store.insert_one("contact", &json!({"name": "Jo"})).unwrap();
        store.insert_one("contact", &json!({"name": "Al"})).unwrap();
        store.insert_one("audit", &json!({"event": "boot"})).unwrap();

        assert_eq!(store.list_collection_names().unwrap(), vec!["audit", "contact"]);
        let docs = store.documents("contact").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["name"], "Al");
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::open(tmp.path().to_str().unwrap(), "energy");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("notes.txt"), "hi").unwrap();
        assert!(store.list_collection_names().unwrap().is_empty());
    }

    #[test]
    fn test_list_fails_when_database_dir_missing() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::open(tmp.path().to_str().unwrap(), "never-created");
        assert!(matches!(
            store.list_collection_names(),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_rejects_path_like_collection() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::open(tmp.path().to_str().unwrap(), "energy");
        let err = store.insert_one("../escape", &json!({})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCollection(_)));
    }

    #[test]
    fn test_insert_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let store = JsonLinesStore::open(blocker.to_str().unwrap(), "energy");
        assert!(store.insert_one("contact", &json!({})).is_err());
    }
}
