//! Owned XML element tree
//!
//! RDF/XML as produced by this crate never uses mixed content, so each element
//! carries at most one text value and an ordered list of child elements.
//! Whitespace-only text between elements is dropped while parsing.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::CatalogueError;
use crate::namespace::{ExpandedName, NamespaceResolver};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: ExpandedName,
    pub attributes: Vec<(ExpandedName, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: ExpandedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &ExpandedName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &ExpandedName, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.attributes.push((name.clone(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &ExpandedName) -> Option<String> {
        let pos = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(pos).1)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First direct child with the given name
    pub fn find(&self, name: &ExpandedName) -> Option<&Element> {
        self.children.iter().find(|c| c.name == *name)
    }

    pub fn find_mut(&mut self, name: &ExpandedName) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name == *name)
    }

    /// All direct children with the given name
    pub fn find_all<'a>(&'a self, name: &ExpandedName) -> impl Iterator<Item = &'a Element> + 'a {
        let name = name.clone();
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn count(&self, name: &ExpandedName) -> usize {
        self.find_all(name).count()
    }

    /// Index of the first direct child named `name` whose `attr` equals `value`
    pub fn position_with_attribute(
        &self,
        name: &ExpandedName,
        attr: &ExpandedName,
        value: &str,
    ) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.name == *name && c.attribute(attr) == Some(value))
    }

    pub fn find_with_attribute(
        &self,
        name: &ExpandedName,
        attr: &ExpandedName,
        value: &str,
    ) -> Option<&Element> {
        self.position_with_attribute(name, attr, value)
            .map(|pos| &self.children[pos])
    }

    /// First element named `name` anywhere below this one (depth first)
    pub fn find_descendant_mut(&mut self, name: &ExpandedName) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            if child.name == *name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every element named `name` below this one, in document order.
    /// Matches are not searched for nested matches.
    pub fn descendants_named_mut<'a>(
        &'a mut self,
        name: &ExpandedName,
        out: &mut Vec<&'a mut Element>,
    ) {
        for child in self.children.iter_mut() {
            if child.name == *name {
                out.push(child);
            } else {
                child.descendants_named_mut(name, out);
            }
        }
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Detach the first direct child with the given name
    pub fn remove_first(&mut self, name: &ExpandedName) -> Option<Element> {
        let pos = self.children.iter().position(|c| c.name == *name)?;
        Some(self.children.remove(pos))
    }

    /// Detach the first direct child named `name` whose `attr` equals `value`
    pub fn remove_with_attribute(
        &mut self,
        name: &ExpandedName,
        attr: &ExpandedName,
        value: &str,
    ) -> Option<Element> {
        let pos = self.position_with_attribute(name, attr, value)?;
        Some(self.children.remove(pos))
    }
}

/// A parsed document: its root element plus the namespaces it declares
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
    pub namespaces: NamespaceResolver,
}

impl Document {
    /// Parse raw XML text.
    ///
    /// `origin` only names the source in error messages.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, CatalogueError> {
        let parse_error = |reason: String| CatalogueError::Parse {
            path: origin.to_string(),
            reason,
        };

        let mut namespaces = NamespaceResolver::extract(raw).map_err(parse_error)?;
        let root = parse_tree(raw, &mut namespaces).map_err(parse_error)?;

        Ok(Self { root, namespaces })
    }

    /// Pretty-print with tab indentation and an XML declaration
    pub fn to_pretty_string(&self) -> Result<String, CatalogueError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_error)?;
        write_element(&mut writer, &self.root, &self.namespaces, true)?;

        let mut out = String::from_utf8(writer.into_inner()).map_err(write_error)?;
        out.push('\n');
        Ok(out)
    }
}

fn write_error(e: impl std::fmt::Display) -> CatalogueError {
    CatalogueError::Writing {
        path: "<memory>".to_string(),
        reason: e.to_string(),
    }
}

fn parse_tree(raw: &str, namespaces: &mut NamespaceResolver) -> Result<Element, String> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(start_element(e, namespaces)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e, namespaces)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unbalanced closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text);
            }
            Ok(Event::CData(ref c)) => {
                let text = String::from_utf8_lossy(c).to_string();
                push_text(&mut stack, &text);
            }
            Ok(Event::Eof) => break,
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

    if !stack.is_empty() {
        return Err("unexpected end of document: unclosed element".to_string());
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn start_element(
    e: &BytesStart<'_>,
    namespaces: &mut NamespaceResolver,
) -> Result<Element, String> {
    // declarations on this tag are in scope for its own name
    namespaces.collect_declarations(e)?;

    let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut element = Element::new(namespaces.resolve(&qname).map_err(|e| e.to_string())?);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let name = namespaces
            .resolve_attribute(&key)
            .map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((name, value.into_owned()));
    }

    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err("document has more than one root element".to_string()),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current
            .text
            .get_or_insert_with(String::new)
            .push_str(text);
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    namespaces: &NamespaceResolver,
    is_root: bool,
) -> Result<(), CatalogueError> {
    let name = namespaces.qualify(&element.name)?;
    let mut start = BytesStart::new(name.as_str());

    if is_root {
        for (prefix, uri) in namespaces.iter() {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            start.push_attribute((key.as_str(), uri));
        }
    }
    for (attr, value) in &element.attributes {
        let key = namespaces.qualify(attr)?;
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text().filter(|t| !t.is_empty());
    if text.is_none() && element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(write_error)?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(write_error)?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in &element.children {
        write_element(writer, child, namespaces, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dct="http://purl.org/dc/terms/">
    <rdf:Description rdf:about="http://example.org/a">
        <dct:title>  Air &amp; water  </dct:title>
        <dct:publisher rdf:resource="http://example.org/p"/>
    </rdf:Description>
    <rdf:Description rdf:about="http://example.org/b"/>
</rdf:RDF>
"#;

    fn name(doc: &Document, qname: &str) -> ExpandedName {
        doc.namespaces.resolve_attribute(qname).unwrap()
    }

    #[test]
    fn test_parse_builds_expanded_tree() {
        let doc = Document::parse(DOC, "test").unwrap();
        let description = name(&doc, "rdf:Description");
        let about = name(&doc, "rdf:about");

        assert_eq!(doc.root.count(&description), 2);
        let first = doc.root.find(&description).unwrap();
        assert_eq!(first.attribute(&about), Some("http://example.org/a"));

        let title = first.find(&name(&doc, "dct:title")).unwrap();
        assert_eq!(title.text(), Some("Air & water"));
        assert_eq!(first.children.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = Document::parse("<a><b></a>", "broken.xml").unwrap_err();
        assert!(matches!(err, CatalogueError::Parse { ref path, .. } if path == "broken.xml"));

        let err = Document::parse("<x:a/>", "nsless.xml").unwrap_err();
        assert!(matches!(err, CatalogueError::Parse { .. }));
    }

    #[test]
    fn test_nested_declarations() {
        let nested = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description xmlns:dct="http://purl.org/dc/terms/">
        <dct:title>A</dct:title>
    </rdf:Description>
    <rdf:Description xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>
</rdf:RDF>"#;
        let doc = Document::parse(nested, "nested").unwrap();
        assert_eq!(doc.namespaces.uri("dct"), Some("http://purl.org/dc/terms/"));
        let reread = Document::parse(&doc.to_pretty_string().unwrap(), "nested").unwrap();
        assert_eq!(reread, doc);

        let rebound = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dct="http://purl.org/dc/terms/">
    <rdf:Description xmlns:dct="urn:other">
        <dct:title>A</dct:title>
    </rdf:Description>
    <dct:title>B</dct:title>
</rdf:RDF>"#;
        assert!(matches!(
            Document::parse(rebound, "rebound"),
            Err(CatalogueError::Parse { reason, .. }) if reason.contains("rebound")
        ));
    }

    #[test]
    fn test_remove_with_attribute() {
        let mut doc = Document::parse(DOC, "test").unwrap();
        let description = name(&doc, "rdf:Description");
        let about = name(&doc, "rdf:about");

        let removed = doc
            .root
            .remove_with_attribute(&description, &about, "http://example.org/b")
            .unwrap();
        assert_eq!(removed.attribute(&about), Some("http://example.org/b"));
        assert_eq!(doc.root.count(&description), 1);
        assert!(doc
            .root
            .remove_with_attribute(&description, &about, "http://example.org/b")
            .is_none());
    }

    #[test]
    fn test_pretty_output_reparses_identically() {
        let doc = Document::parse(DOC, "test").unwrap();
        let out = doc.to_pretty_string().unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(out.contains("xmlns:dct=\"http://purl.org/dc/terms/\""));
        assert!(out.contains("\t\t<dct:title>Air &amp; water</dct:title>"));
        assert!(out.contains("<rdf:Description rdf:about=\"http://example.org/b\"/>"));

        let again = Document::parse(&out, "again").unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_descendants_named_mut() {
        let raw = r#"<r xmlns="urn:t"><a><g/></a><b><c><g/></c></b></r>"#;
        let mut doc = Document::parse(raw, "test").unwrap();
        let g = doc.namespaces.resolve("g").unwrap();

        let mut found = Vec::new();
        doc.root.descendants_named_mut(&g, &mut found);
        assert_eq!(found.len(), 2);
        for (i, node) in found.into_iter().enumerate() {
            node.text = Some(i.to_string());
        }
        assert_eq!(
            doc.root.find_descendant_mut(&g).unwrap().text(),
            Some("0")
        );
    }
}
