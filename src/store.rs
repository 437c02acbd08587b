//! Persisted dataset identifiers
//!
//! Maps a data-model section name to the ULID its dataset was published
//! under, so later runs reuse the same dataset URI.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;
use ulid::Ulid;

use crate::error::CatalogueError;
use crate::id::parse_id;
use crate::writer::replace_file;

#[derive(Debug, Clone)]
pub struct IdentifierStore {
    path: PathBuf,
    ids: Table,
}

impl IdentifierStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let ids = match fs::read_to_string(path) {
            Ok(raw) => raw
                .parse::<Table>()
                .map_err(|e| CatalogueError::ConfigParse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Table::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored identifier of a data model, if any
    pub fn get(&self, name: &str) -> Result<Option<Ulid>, CatalogueError> {
        match self.ids.get(name) {
            Some(Value::String(raw)) => parse_id(raw).map(Some),
            Some(other) => Err(CatalogueError::MalformedIdentifier(other.to_string())),
            None => Ok(None),
        }
    }

    pub fn save(&mut self, name: &str, id: Ulid) -> Result<(), CatalogueError> {
        debug!(datamodel = %name, %id, "Saving dataset identifier");
        self.ids.insert(name.to_string(), Value::String(id.to_string()));
        self.persist()
    }

    /// Fails with `NoIdForDataModel` when nothing is stored for `name`
    pub fn remove(&mut self, name: &str) -> Result<(), CatalogueError> {
        if self.ids.remove(name).is_none() {
            return Err(CatalogueError::NoIdForDataModel(name.to_string()));
        }
        debug!(datamodel = %name, "Removed dataset identifier");
        self.persist()
    }

    /// Data models with a stored identifier, in insertion order
    pub fn list_all(&self) -> Vec<String> {
        self.ids.keys().cloned().collect()
    }

    pub fn clear(&mut self) -> Result<(), CatalogueError> {
        self.ids.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), CatalogueError> {
        let text = toml::to_string(&self.ids).map_err(|e| CatalogueError::Writing {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        replace_file(&self.path, text.as_bytes()).map_err(|e| CatalogueError::Writing {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_get_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("integrated.toml");
        let id = Ulid::new();

        let mut store = IdentifierStore::load(&path).unwrap();
        assert!(store.get("parking").unwrap().is_none());
        store.save("parking", id).unwrap();
        store.save("weather", Ulid::new()).unwrap();

        let reloaded = IdentifierStore::load(&path).unwrap();
        assert_eq!(reloaded.get("parking").unwrap(), Some(id));
        assert_eq!(reloaded.list_all(), vec!["parking", "weather"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("integrated.toml");
        let mut store = IdentifierStore::load(&path).unwrap();
        store.save("parking", Ulid::new()).unwrap();
        store.save("weather", Ulid::new()).unwrap();

        store.remove("parking").unwrap();
        assert!(matches!(
            store.remove("parking"),
            Err(CatalogueError::NoIdForDataModel(name)) if name == "parking"
        ));

        store.clear().unwrap();
        assert!(IdentifierStore::load(&path).unwrap().list_all().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_readable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("integrated.toml");
        let mut store = IdentifierStore::load(&path).unwrap();
        store.save("parking", Ulid::new()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o644);
    }

    #[test]
    fn test_malformed_identifier() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("integrated.toml");
        fs::write(&path, "parking = \"not-a-ulid\"\n").unwrap();

        let store = IdentifierStore::load(&path).unwrap();
        assert!(matches!(
            store.get("parking"),
            Err(CatalogueError::MalformedIdentifier(_))
        ));
    }
}
