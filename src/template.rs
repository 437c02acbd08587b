//! Loading catalogue and template documents

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CatalogueError;
use crate::namespace::NamespaceResolver;
use crate::xml::Document;

/// DCAT-AP 1.1 template holding one prototype of each entity
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/template.xml");

/// Read and parse a document from disk
pub fn load(path: &Path) -> Result<Document, CatalogueError> {
    debug!(path = %path.display(), "Loading XML tree");

    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogueError::DocumentNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogueError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })?;

    Document::parse(&raw, &path.display().to_string())
}

/// Namespace declarations of a raw document's root element
pub fn extract_namespaces(raw: &str) -> Result<NamespaceResolver, CatalogueError> {
    NamespaceResolver::extract(raw).map_err(|reason| CatalogueError::Parse {
        path: "<memory>".to_string(),
        reason,
    })
}

/// Where prototypes are cloned from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl TemplateSource {
    /// A fresh, independent copy of the template
    pub fn load(&self) -> Result<Document, CatalogueError> {
        match self {
            TemplateSource::Embedded => Document::parse(DEFAULT_TEMPLATE, "embedded template"),
            TemplateSource::File(path) => load(path),
        }
    }
}

impl From<Option<PathBuf>> for TemplateSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(TemplateSource::File).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Tags;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_template_has_one_prototype_each() {
        let doc = TemplateSource::Embedded.load().unwrap();
        let tags = Tags::resolve(&doc.namespaces).unwrap();

        assert_eq!(doc.root.count(&tags.catalog), 1);
        assert_eq!(doc.root.count(&tags.dataset), 1);
        assert_eq!(doc.root.count(&tags.distribution), 1);
        assert_eq!(doc.root.count(&tags.organization), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.rdf")).unwrap_err();
        assert!(matches!(err, CatalogueError::DocumentNotFound { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.rdf");
        fs::write(&path, "<rdf:RDF xmlns:rdf=\"urn:x\"><unclosed></rdf:RDF>").unwrap();
        assert!(matches!(load(&path), Err(CatalogueError::Parse { .. })));
    }

    #[test]
    fn test_extract_namespaces_from_template() {
        let ns = extract_namespaces(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(ns.uri("locn"), Some("http://www.w3.org/ns/locn#"));
        assert_eq!(ns.uri("vcard"), Some("http://www.w3.org/2006/vcard/ns#"));
    }
}
