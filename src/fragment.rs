//! Node fragment primitives
//!
//! Entities are serialized by copying a prototype node out of the template and
//! filling it in. These helpers are the only code that mutates fragments.

use crate::error::CatalogueError;
use crate::namespace::ExpandedName;
use crate::xml::Element;

/// How [`set_value`] writes a value
#[derive(Debug, Clone, Copy, Default)]
pub struct SetValue<'a> {
    /// Write into this attribute instead of the node text
    pub attribute: Option<&'a ExpandedName>,
    /// Append a copy of the node instead of editing it
    pub duplicate: bool,
    /// Delete the node when the value is empty
    pub remove_if_empty: bool,
}

impl<'a> SetValue<'a> {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn resource(attribute: &'a ExpandedName) -> Self {
        Self {
            attribute: Some(attribute),
            ..Self::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.remove_if_empty = true;
        self
    }

    pub fn duplicated(mut self) -> Self {
        self.duplicate = true;
        self
    }
}

/// Deep copy of the first child named `tag`
pub fn clone_node(parent: &Element, tag: &ExpandedName) -> Result<Element, CatalogueError> {
    parent
        .find(tag)
        .cloned()
        .ok_or_else(|| CatalogueError::MissingNode(tag.to_string()))
}

pub fn set_text(node: &mut Element, value: &str) {
    node.text = Some(value.to_string());
}

pub fn set_attribute(node: &mut Element, attribute: &ExpandedName, value: &str) {
    node.set_attribute(attribute, value);
}

/// Remove the first child named `tag`; returns whether one existed
pub fn remove_node(parent: &mut Element, tag: &ExpandedName) -> bool {
    parent.remove_first(tag).is_some()
}

/// Set a single field of `parent`
pub fn set_value(
    parent: &mut Element,
    tag: &ExpandedName,
    value: &str,
    opts: SetValue<'_>,
) -> Result<(), CatalogueError> {
    if opts.remove_if_empty && value.is_empty() {
        remove_node(parent, tag);
        return Ok(());
    }

    if opts.duplicate {
        let mut node = clone_node(parent, tag)?;
        write(&mut node, value, opts.attribute);
        parent.append(node);
        return Ok(());
    }

    let node = parent
        .find_mut(tag)
        .ok_or_else(|| CatalogueError::MissingNode(tag.to_string()))?;
    write(node, value, opts.attribute);
    Ok(())
}

/// One `tag` child per value, then drop the prototype child
pub fn set_multiple(
    parent: &mut Element,
    tag: &ExpandedName,
    values: &[String],
    attribute: Option<&ExpandedName>,
) -> Result<(), CatalogueError> {
    let opts = SetValue {
        attribute,
        duplicate: true,
        remove_if_empty: false,
    };
    for value in values {
        set_value(parent, tag, value, opts)?;
    }
    remove_node(parent, tag);
    Ok(())
}

fn write(node: &mut Element, value: &str, attribute: Option<&ExpandedName>) {
    match attribute {
        Some(attr) => set_attribute(node, attr, value),
        None => set_text(node, value),
    }
}
