//! Namespace prefix handling
//!
//! Element and attribute names are kept in expanded `{uri}local` form inside
//! the tree. A [`NamespaceResolver`] maps the `prefix:local` names used in
//! code and in documents to that form and back again when writing.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::CatalogueError;

/// Namespace implicitly bound to the `xml` prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub namespace: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(String::from),
            local: local.to_string(),
        }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Prefix → URI declarations of one document, in declaration order.
///
/// The empty prefix holds the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceResolver {
    declarations: Vec<(String, String)>,
}

impl NamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `xmlns` declarations of the root start tag without parsing
    /// the rest of the document
    pub fn extract(raw: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(raw);
        let mut resolver = Self::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    resolver.collect_declarations(e)?;
                    return Ok(resolver);
                }
                Ok(Event::Eof) => return Err("document has no root element".to_string()),
                Err(e) => {
                    return Err(format!(
                        "error at position {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                }
                _ => {}
            }
        }
    }

    /// Register every `xmlns` / `xmlns:prefix` attribute of a start tag.
    ///
    /// Declarations apply to the whole document, so binding an already
    /// declared prefix to another URI is an error.
    pub fn collect_declarations(&mut self, e: &BytesStart<'_>) -> Result<(), String> {
        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let prefix = if key == "xmlns" {
                ""
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                prefix
            } else {
                continue;
            };
            let uri = attr.unescape_value().map_err(|e| e.to_string())?;
            if let Some(bound) = self.uri(prefix).filter(|bound| *bound != uri) {
                return Err(format!(
                    "namespace prefix \"{}\" rebound from {} to {}",
                    prefix, bound, uri
                ));
            }
            self.declare(prefix, &uri);
        }
        Ok(())
    }

    /// Bind a prefix, replacing any previous binding of the same prefix
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        match self.declarations.iter_mut().find(|(p, _)| p == prefix) {
            Some(existing) => existing.1 = uri.to_string(),
            None => self
                .declarations
                .push((prefix.to_string(), uri.to_string())),
        }
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.declarations
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        if uri == XML_NS {
            return Some("xml");
        }
        self.declarations
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Resolve an element name; unprefixed names take the default namespace
    pub fn resolve(&self, qname: &str) -> Result<ExpandedName, CatalogueError> {
        match qname.split_once(':') {
            Some((prefix, local)) => {
                let uri = self
                    .uri(prefix)
                    .ok_or_else(|| CatalogueError::UnknownPrefix(prefix.to_string()))?;
                Ok(ExpandedName::new(Some(uri), local))
            }
            None => Ok(ExpandedName::new(self.uri(""), qname)),
        }
    }

    /// Resolve an attribute name; unprefixed attributes have no namespace
    pub fn resolve_attribute(&self, qname: &str) -> Result<ExpandedName, CatalogueError> {
        if qname.contains(':') {
            self.resolve(qname)
        } else {
            Ok(ExpandedName::new(None, qname))
        }
    }

    /// Turn an expanded name back into `prefix:local`
    pub fn qualify(&self, name: &ExpandedName) -> Result<String, CatalogueError> {
        match &name.namespace {
            None => Ok(name.local.clone()),
            Some(uri) => match self.prefix_for(uri) {
                Some("") => Ok(name.local.clone()),
                Some(prefix) => Ok(format!("{}:{}", prefix, name.local)),
                None => Err(CatalogueError::UnknownPrefix(uri.clone())),
            },
        }
    }

    /// Add the namespaces of `other` that this resolver does not know yet.
    ///
    /// A clashing prefix bound to a different URI is renamed with a numeric
    /// suffix.
    pub fn absorb(&mut self, other: &NamespaceResolver) {
        for (prefix, uri) in &other.declarations {
            if self.prefix_for(uri).is_some() {
                continue;
            }
            let mut candidate = prefix.clone();
            let mut suffix = 1;
            while self.uri(&candidate).is_some() {
                candidate = format!("{}{}", prefix, suffix);
                suffix += 1;
            }
            self.declarations.push((candidate, uri.clone()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
