//! Create, update and remove operations on the catalogue document
//!
//! The catalogue is always rebuilt in memory and written as a whole.
//!
//! # States
//!
//! A persisted catalogue holds one `dcat:Catalog` and at least one
//! `dcat:Dataset`. Creating a catalogue without datasets fails, and removing
//! the last dataset is refused with [`CatalogueError::LastDataset`] so the
//! caller can delete the file instead.
//!
//! # Ownership
//!
//! Distributions belong to exactly one dataset and go away with it.
//! Organizations are shared: one node per publisher URI, removed only when
//! neither the catalogue nor any remaining dataset points at it.
//!
//! Update and remove work on a copy of the caller's document and only swap
//! it in once every step has succeeded.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::CatalogueError;
use crate::fragment::{clone_node, set_value, SetValue};
use crate::id::format_timestamp;
use crate::mapper::{map_catalogue, map_dataset, map_publisher, map_resource};
use crate::model::{Catalogue, Dataset};
use crate::vocab::Tags;
use crate::xml::{Document, Element};

/// Source of "now" for issued/modified timestamps
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Build a complete catalogue document from a fresh template
pub fn create(
    template: Document,
    catalogue: &Catalogue,
    clock: &dyn Clock,
) -> Result<Document, CatalogueError> {
    if catalogue.datasets.is_empty() {
        return Err(CatalogueError::EmptyCatalogue);
    }
    info!(datasets = catalogue.datasets.len(), "Creating RDF catalogue");

    let tags = Tags::resolve(&template.namespaces)?;
    let now = format_timestamp(clock.now());
    let mut doc = template;

    let node = map_catalogue(&doc.root, &tags, catalogue, &now)?;
    doc.root.append(node);

    for dataset in &catalogue.datasets {
        let node = map_dataset(&doc.root, &tags, dataset, false, &now)?;
        doc.root.append(node);
    }

    for resource in catalogue.datasets.iter().flat_map(|d| &d.resources) {
        let node = map_resource(&doc.root, &tags, resource)?;
        doc.root.append(node);
    }

    let publishers = catalogue.unique_publishers();
    debug!(count = publishers.len(), "Serializing publishers");
    for publisher in publishers {
        let node = map_publisher(&doc.root, &tags, publisher)?;
        doc.root.append(node);
    }

    remove_prototypes(&mut doc.root, &tags);

    info!("RDF catalogue created");
    Ok(doc)
}

/// Merge one dataset into an existing catalogue.
///
/// A dataset already referenced by the catalogue is replaced: its previous
/// node, distributions and unshared publisher are removed first and the
/// catalogue reference is kept. A new dataset gets a new reference.
pub fn update(
    local: &mut Document,
    template: Document,
    dataset: &Dataset,
    clock: &dyn Clock,
) -> Result<(), CatalogueError> {
    info!(dataset = %dataset.name, "Updating RDF catalogue");

    let tags = Tags::resolve(&template.namespaces)?;
    let now = format_timestamp(clock.now());
    let mut work = local.clone();
    work.namespaces.absorb(&template.namespaces);

    let referenced = catalog(&work.root, &tags)?
        .find_with_attribute(&tags.catalog_dataset, &tags.resource, &dataset.uri)
        .is_some();

    // a node may exist without its catalogue reference; replace it either way
    if detach_dataset(&mut work.root, &tags, &dataset.uri) {
        debug!(dataset = %dataset.name, referenced, "Replacing existing dataset node");
    }

    let mut fragments = vec![map_dataset(&template.root, &tags, dataset, true, &now)?];
    for resource in &dataset.resources {
        fragments.push(map_resource(&template.root, &tags, resource)?);
    }

    let publisher = &dataset.publisher;
    if publisher_references(&work.root, &tags, &publisher.uri) == 0
        && organization_position(&work.root, &tags, &publisher.uri).is_none()
    {
        debug!(uri = %publisher.uri, "Publisher not present, adding it");
        fragments.push(map_publisher(&template.root, &tags, publisher)?);
    }

    touch_catalogue(&mut work.root, &template.root, &tags, &now)?;

    for fragment in fragments {
        work.root.append(fragment);
    }

    if !referenced {
        info!(dataset = %dataset.name, "Adding new dataset reference to catalogue");
        add_catalogue_reference(catalog_mut(&mut work.root, &tags)?, &tags, &dataset.uri)?;
    }

    *local = work;
    info!(dataset = %dataset.name, "RDF catalogue updated");
    Ok(())
}

/// Remove one dataset together with its distributions and, when no longer
/// referenced, its publisher.
///
/// Fails with `DatasetNotFound` when `uri` names no dataset and with
/// `LastDataset` when it names the only one; `local` is untouched in both
/// cases.
pub fn remove(
    local: &mut Document,
    template: &Document,
    name: &str,
    uri: &str,
    clock: &dyn Clock,
) -> Result<(), CatalogueError> {
    info!(dataset = %name, "Removing dataset from RDF catalogue");

    let tags = Tags::resolve(&template.namespaces)?;

    if local
        .root
        .position_with_attribute(&tags.dataset, &tags.about, uri)
        .is_none()
    {
        return Err(CatalogueError::DatasetNotFound(name.to_string()));
    }
    if local.root.count(&tags.dataset) == 1 {
        return Err(CatalogueError::LastDataset);
    }

    let mut work = local.clone();
    detach_dataset(&mut work.root, &tags, uri);
    catalog_mut(&mut work.root, &tags)?.remove_with_attribute(
        &tags.catalog_dataset,
        &tags.resource,
        uri,
    );
    touch_catalogue(&mut work.root, &template.root, &tags, &format_timestamp(clock.now()))?;

    *local = work;
    info!(dataset = %name, "Dataset removed from RDF catalogue");
    Ok(())
}

/// URIs of the datasets in a document, in document order
pub fn dataset_uris(doc: &Document, tags: &Tags) -> Vec<String> {
    doc.root
        .find_all(&tags.dataset)
        .filter_map(|d| d.attribute(&tags.about))
        .map(String::from)
        .collect()
}

/// Number of `dct:publisher` links to `uri` from the catalogue and datasets
pub fn publisher_references(root: &Element, tags: &Tags, uri: &str) -> usize {
    root.children
        .iter()
        .filter(|c| c.name == tags.dataset || c.name == tags.catalog)
        .filter(|c| {
            c.find_all(&tags.publisher)
                .any(|p| p.attribute(&tags.resource) == Some(uri))
        })
        .count()
}

fn organization_position(root: &Element, tags: &Tags, uri: &str) -> Option<usize> {
    root.position_with_attribute(&tags.organization, &tags.about, uri)
}

fn catalog<'a>(root: &'a Element, tags: &Tags) -> Result<&'a Element, CatalogueError> {
    root.find(&tags.catalog)
        .ok_or_else(|| CatalogueError::MissingNode(tags.catalog.to_string()))
}

fn catalog_mut<'a>(root: &'a mut Element, tags: &Tags) -> Result<&'a mut Element, CatalogueError> {
    root.find_mut(&tags.catalog)
        .ok_or_else(|| CatalogueError::MissingNode(tags.catalog.to_string()))
}

/// Drop a dataset node, its distributions and its publisher if unshared.
/// Returns false when no dataset has this URI.
fn detach_dataset(root: &mut Element, tags: &Tags, uri: &str) -> bool {
    let Some(dataset) = root.remove_with_attribute(&tags.dataset, &tags.about, uri) else {
        return false;
    };

    let distributions: Vec<&str> = dataset
        .find_all(&tags.dataset_distribution)
        .filter_map(|d| d.attribute(&tags.resource))
        .collect();
    for distribution in &distributions {
        root.remove_with_attribute(&tags.distribution, &tags.about, distribution);
    }
    debug!(uri, count = distributions.len(), "Removed distributions");

    if let Some(publisher) = dataset
        .find(&tags.publisher)
        .and_then(|p| p.attribute(&tags.resource))
    {
        if publisher_references(root, tags, publisher) == 0 {
            debug!(uri = %publisher, "Removing unreferenced publisher");
            root.remove_with_attribute(&tags.organization, &tags.about, publisher);
        }
    }

    true
}

/// Set the catalogue's `dct:modified`, adding the node if needed
fn touch_catalogue(
    root: &mut Element,
    template_root: &Element,
    tags: &Tags,
    now: &str,
) -> Result<(), CatalogueError> {
    let catalogue = catalog_mut(root, tags)?;
    match catalogue.find_mut(&tags.modified) {
        Some(modified) => modified.text = Some(now.to_string()),
        None => {
            let mut modified = catalog(template_root, tags)
                .and_then(|c| clone_node(c, &tags.modified))
                .unwrap_or_else(|_| Element::new(tags.modified.clone()));
            modified.text = Some(now.to_string());
            catalogue.append(modified);
        }
    }
    debug!(date = %now, "Catalogue modification date set");
    Ok(())
}

fn add_catalogue_reference(
    catalogue: &mut Element,
    tags: &Tags,
    uri: &str,
) -> Result<(), CatalogueError> {
    if catalogue.find(&tags.catalog_dataset).is_some() {
        return set_value(
            catalogue,
            &tags.catalog_dataset,
            uri,
            SetValue::resource(&tags.resource).duplicated(),
        );
    }
    let mut reference = Element::new(tags.catalog_dataset.clone());
    reference.set_attribute(&tags.resource, uri);
    catalogue.append(reference);
    Ok(())
}

fn remove_prototypes(root: &mut Element, tags: &Tags) {
    for tag in [&tags.catalog, &tags.dataset, &tags.distribution, &tags.organization] {
        root.remove_first(tag);
    }
}
