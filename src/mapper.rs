//! Record → RDF/XML fragment mappers
//!
//! Each mapper copies the matching prototype out of `root` (a template
//! document root) and returns the filled fragment. Optional fields that are
//! not configured have their node removed rather than left empty.

use tracing::debug;

use crate::error::CatalogueError;
use crate::fragment::{clone_node, remove_node, set_attribute, set_multiple, set_value, SetValue};
use crate::id::issued_at;
use crate::model::{Catalogue, Dataset, Publisher, Resource};
use crate::vocab::Tags;
use crate::xml::Element;

/// Catalogue fragment; `issued` is reset to `now` and `modified` dropped
pub fn map_catalogue(
    root: &Element,
    tags: &Tags,
    catalogue: &Catalogue,
    now: &str,
) -> Result<Element, CatalogueError> {
    debug!(uri = %catalogue.uri, datasets = catalogue.datasets.len(), "Serializing catalogue");

    let mut node = clone_node(root, &tags.catalog)?;
    let resource = SetValue::resource(&tags.resource);

    set_attribute(&mut node, &tags.about, &catalogue.uri);
    set_value(&mut node, &tags.title, &catalogue.title, SetValue::text())?;
    set_value(&mut node, &tags.description, &catalogue.description, SetValue::text())?;
    set_value(&mut node, &tags.homepage, &catalogue.homepage, resource.optional())?;
    set_value(&mut node, &tags.issued, now, SetValue::text())?;
    remove_node(&mut node, &tags.modified);
    set_value(&mut node, &tags.publisher, &catalogue.publisher.uri, resource)?;
    set_multiple(
        &mut node,
        &tags.catalog_dataset,
        &catalogue.dataset_uris(),
        Some(&tags.resource),
    )?;

    Ok(node)
}

/// Dataset fragment; `modified` is only stamped when `updated`
pub fn map_dataset(
    root: &Element,
    tags: &Tags,
    dataset: &Dataset,
    updated: bool,
    now: &str,
) -> Result<Element, CatalogueError> {
    debug!(dataset = %dataset.name, uri = %dataset.uri, updated, "Serializing dataset");

    let mut node = clone_node(root, &tags.dataset)?;
    let resource = SetValue::resource(&tags.resource);

    set_attribute(&mut node, &tags.about, &dataset.uri);
    set_value(&mut node, &tags.title, &dataset.title, SetValue::text())?;
    set_value(&mut node, &tags.description, &dataset.description, SetValue::text())?;
    set_multiple(&mut node, &tags.keyword, &dataset.keywords, None)?;
    set_value(&mut node, &tags.publisher, &dataset.publisher.uri, resource)?;
    set_multiple(&mut node, &tags.theme, &dataset.themes, Some(&tags.resource))?;

    if dataset.contact_email.is_empty() {
        remove_node(&mut node, &tags.contact_point);
    } else {
        let name = node
            .find_descendant_mut(&tags.contact_point_name)
            .ok_or_else(|| CatalogueError::MissingNode(tags.contact_point_name.to_string()))?;
        name.text = Some(dataset.publisher.name.clone());

        let email = node
            .find_descendant_mut(&tags.contact_point_email)
            .ok_or_else(|| CatalogueError::MissingNode(tags.contact_point_email.to_string()))?;
        set_attribute(email, &tags.resource, &format!("mailto:{}", dataset.contact_email));
    }

    set_value(&mut node, &tags.periodicity, &dataset.periodicity, resource.optional())?;
    let id = dataset.id.to_string();
    set_value(&mut node, &tags.identifier, &id, SetValue::text())?;
    set_value(&mut node, &tags.issued, &issued_at(&id)?, SetValue::text())?;
    if updated {
        set_value(&mut node, &tags.modified, now, SetValue::text())?;
    } else {
        remove_node(&mut node, &tags.modified);
    }
    set_value(&mut node, &tags.access_rights, &dataset.access_rights, resource.optional())?;
    set_value(&mut node, &tags.landing_page, &dataset.landing_page, resource.optional())?;

    match &dataset.spatial {
        Some(geometry) => {
            let mut nodes = Vec::new();
            node.descendants_named_mut(&tags.spatial_geometry, &mut nodes);
            for (target, text) in nodes.into_iter().zip(geometry.texts()) {
                target.text = Some(text.to_string());
            }
        }
        None => {
            remove_node(&mut node, &tags.spatial);
        }
    }

    set_multiple(
        &mut node,
        &tags.dataset_distribution,
        &dataset.resource_uris(),
        Some(&tags.resource),
    )?;

    Ok(node)
}

pub fn map_resource(
    root: &Element,
    tags: &Tags,
    resource: &Resource,
) -> Result<Element, CatalogueError> {
    debug!(uri = %resource.uri, title = %resource.title, "Serializing distribution");

    let mut node = clone_node(root, &tags.distribution)?;
    let link = SetValue::resource(&tags.resource);

    set_attribute(&mut node, &tags.about, &resource.uri);
    set_value(&mut node, &tags.access_url, &resource.url, link)?;
    set_value(&mut node, &tags.description, &resource.description, SetValue::text())?;
    set_value(&mut node, &tags.title, &resource.title, SetValue::text())?;
    set_value(&mut node, &tags.download_url, &resource.url, link)?;
    set_value(&mut node, &tags.license, &resource.license, link.optional())?;

    Ok(node)
}

pub fn map_publisher(
    root: &Element,
    tags: &Tags,
    publisher: &Publisher,
) -> Result<Element, CatalogueError> {
    debug!(uri = %publisher.uri, name = %publisher.name, "Serializing publisher");

    let mut node = clone_node(root, &tags.organization)?;
    let link = SetValue::resource(&tags.resource).optional();

    set_attribute(&mut node, &tags.about, &publisher.uri);
    set_value(&mut node, &tags.organization_name, &publisher.name, SetValue::text())?;
    set_value(
        &mut node,
        &tags.rdf_type,
        publisher.kind.as_deref().unwrap_or_default(),
        link,
    )?;
    set_value(
        &mut node,
        &tags.homepage,
        publisher.homepage.as_deref().unwrap_or_default(),
        link,
    )?;

    Ok(node)
}
