//! Serializing and persisting the catalogue document

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::CatalogueError;
use crate::xml::Document;

/// Pretty-printed RDF/XML text of a document
pub fn serialize(doc: &Document) -> Result<String, CatalogueError> {
    doc.to_pretty_string()
}

/// Write a document to `path`.
///
/// The text goes to a temporary file next to `path` that is then renamed
/// over it, so readers see either the old or the new catalogue.
pub fn write(doc: &Document, path: &Path) -> Result<(), CatalogueError> {
    let writing_error = |reason: String| CatalogueError::Writing {
        path: path.display().to_string(),
        reason,
    };

    let text = serialize(doc).map_err(|e| writing_error(e.to_string()))?;
    replace_file(path, text.as_bytes()).map_err(|e| writing_error(e.to_string()))?;

    info!(path = %path.display(), bytes = text.len(), "RDF catalogue written");
    Ok(())
}

/// Replace `path` with `bytes` through a temporary file in the same
/// directory.
///
/// The new file keeps the permissions of the one it replaces; a new file
/// gets `0644` on Unix.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.flush()?;
    if let Some(permissions) = target_permissions(path)? {
        file.as_file().set_permissions(permissions)?;
    }
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn target_permissions(path: &Path) -> io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Delete a persisted document; a missing file is not an error
pub fn remove(path: &Path) -> Result<(), CatalogueError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "RDF catalogue removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No RDF catalogue to remove");
            Ok(())
        }
        Err(e) => Err(CatalogueError::Writing {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{load, TemplateSource};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api").join("catalogue.rdf");
        let doc = TemplateSource::Embedded.load().unwrap();

        write(&doc, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<rdf:RDF"));
        assert_eq!(load(&path).unwrap(), doc);

        // overwrite in place
        write(&doc, &path).unwrap();
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let doc = TemplateSource::Embedded.load().unwrap();
        let err = write(&doc, &blocker.join("catalogue.rdf")).unwrap_err();
        assert!(matches!(err, CatalogueError::Writing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let doc = TemplateSource::Embedded.load().unwrap();
        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;

        let fresh = dir.path().join("fresh.rdf");
        write(&doc, &fresh).unwrap();
        assert_eq!(mode(&fresh), 0o644);

        let existing = dir.path().join("existing.rdf");
        fs::write(&existing, "x").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
        write(&doc, &existing).unwrap();
        assert_eq!(mode(&existing), 0o640);
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalogue.rdf");
        remove(&path).unwrap();

        fs::write(&path, "x").unwrap();
        remove(&path).unwrap();
        assert!(!path.exists());
    }
}
