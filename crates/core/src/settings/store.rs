//! Load/save of the settings document with atomic replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, info};

use super::migrate::migrate;
use super::{default_document, SettingsError};

/// File name of the settings document inside the application root
pub const SETTINGS_FILE: &str = "settings.json";

/// Prefix of the temporary files written during a save. Leftovers from an
/// interrupted save are removed at startup.
pub const SAVE_TEMP_PREFIX: &str = ".settings.json.";

/// Reads, migrates and atomically rewrites `settings.json`.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Store for the settings document inside `app_root`.
    pub fn new(app_root: &Path) -> Self {
        Self::at_path(app_root.join(SETTINGS_FILE))
    }

    /// Store for a settings document at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, creating it from defaults when absent and
    /// persisting the result of any schema migration.
    pub fn load(&self) -> Result<(PathBuf, Value), SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let document = default_document();
                self.save(&document)?;
                info!(path = %self.path.display(), "created default settings document");
                return Ok((self.path.clone(), document));
            }
            Err(e) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let document: Value =
            serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
                path: self.path.clone(),
                source: e,
            })?;
        let Value::Object(mut map) = document else {
            return Err(SettingsError::NotAnObject);
        };

        let Value::Object(defaults) = default_document() else {
            return Err(SettingsError::NotAnObject);
        };
        let outcome = migrate(&mut map, &defaults);
        let document = Value::Object(map);

        if outcome.changed {
            self.save(&document)?;
            info!(
                from = outcome.from_version,
                to = outcome.to_version,
                "migrated settings document"
            );
        }

        Ok((self.path.clone(), document))
    }

    /// Replace the document on disk. The new content is written to a temp
    /// file in the same directory and renamed over the old one, so readers
    /// see either the previous or the new document, never a mix.
    pub fn save(&self, document: &Value) -> Result<(), SettingsError> {
        if !document.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        let json = serde_json::to_string_pretty(document)?;

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |source: std::io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(SAVE_TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(path = %self.path.display(), bytes = json.len(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CURRENT_SCHEMA_VERSION, DEFAULT_SERVER_PORT};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_document() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());

        let (path, document) = store.load().unwrap();

        assert_eq!(path, temp.path().join(SETTINGS_FILE));
        assert!(path.exists());
        assert_eq!(document["schema_version"], CURRENT_SCHEMA_VERSION);
        assert_eq!(document["advanced"]["server_port"], DEFAULT_SERVER_PORT);

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, document);
    }

    #[test]
    fn test_load_backfills_and_persists_old_document() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());
        fs::write(
            store.path(),
            r#"{"ticket_number": 3, "my_extra": [1, 2], "advanced": {"server_port": "17777"}}"#,
        )
        .unwrap();

        let (_, document) = store.load().unwrap();
        assert_eq!(document["ticket_number"], 3);
        assert_eq!(document["my_extra"], json!([1, 2]));
        assert_eq!(document["advanced"]["server_port"], 17777);
        assert_eq!(document["kktix"]["auto_fill_ticket_number"], true);

        // Saving the loaded result is a fixed point
        store.save(&document).unwrap();
        let (_, reloaded) = store.load().unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());
        fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert!(matches!(store.load(), Err(SettingsError::NotAnObject)));
    }

    #[test]
    fn test_save_rejects_non_object() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());
        assert!(matches!(
            store.save(&json!("text")),
            Err(SettingsError::NotAnObject)
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(&temp.path().join("does-not-exist"));
        let result = store.save(&json!({}));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path());
        store.save(&json!({ "a": 1 })).unwrap();
        store.save(&json!({ "a": 2 })).unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![SETTINGS_FILE.to_string()]);
    }

    #[test]
    fn test_concurrent_saves_never_mix_documents() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(SettingsStore::new(temp.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for round in 0..10 {
                        let doc = json!({ "writer": i, "round": round, "copy": i });
                        store.save(&doc).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let on_disk: Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk["writer"], on_disk["copy"]);
        assert_eq!(on_disk["round"], 9);
    }
}
